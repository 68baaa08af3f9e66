use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::extract::{RecruitmentRecord, TeamRecord};
use crate::metrics::PassMetric;

const SCHEMA_JSON: &str = include_str!("../schema.json");

#[derive(Deserialize)]
struct Schema {
    tables: HashMap<String, Vec<String>>,
    indexes: Vec<(String, String, String)>,
}

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    Ok(conn)
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    let schema: Schema = serde_json::from_str(SCHEMA_JSON)?;
    for (name, cols) in &schema.tables {
        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", name, cols.join(", "));
        conn.execute(&sql, [])?;
    }
    for (idx, table, cols) in &schema.indexes {
        let sql = format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", idx, table, cols);
        conn.execute(&sql, [])?;
    }
    Ok(())
}

/// Records are regenerated on every export, so old rows are dropped first.
pub fn clear_records(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM team_articles", [])?;
    conn.execute("DELETE FROM teams", [])?;
    conn.execute("DELETE FROM recruitments", [])?;
    Ok(())
}

pub fn insert_recruitment(conn: &Connection, r: &RecruitmentRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO recruitments (id, team, location, task, description, urgency, contact, duration, people_needed, people_applied, url, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            r.id as i64,
            r.team,
            r.location,
            r.task,
            r.description,
            r.urgency.as_str(),
            r.contact,
            r.duration,
            r.people_needed,
            r.people_applied,
            r.url,
            r.date,
        ],
    )?;
    Ok(())
}

pub fn insert_team(conn: &Connection, t: &TeamRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO teams (id, team_name, college, slogan, location, lat, lon, established_year, total_volunteers, service_hours, served_students, honors)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            t.id as i64,
            t.team_name,
            t.college.name(),
            t.slogan,
            t.location,
            t.coordinates.0,
            t.coordinates.1,
            t.established_year,
            t.total_volunteers,
            t.service_hours,
            t.served_students,
            serde_json::to_string(&t.honors)?,
        ],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO team_articles (team_id, position, article_id, title, url) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (pos, article) in t.articles.iter().enumerate() {
        stmt.execute(params![
            t.id as i64,
            pos as i64,
            article.id as i64,
            article.title,
            article.url
        ])?;
    }
    Ok(())
}

pub fn insert_pass_metric(conn: &Connection, run_id: &str, metric: &PassMetric) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO pass_metrics (run_id, pass_name, row_count, char_count, record_count) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            run_id,
            metric.pass_name,
            metric.rows as i64,
            metric.chars as i64,
            metric.records as i64
        ],
    )?;
    Ok(())
}

pub fn count(conn: &Connection, table: &str) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
    Ok(n)
}
