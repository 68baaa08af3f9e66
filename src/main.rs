mod db;
mod error;
mod extract;
mod forms;
mod loader;
mod metrics;
mod rules;
mod settings;
mod tables;
mod text;
mod views;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use extract::{extract_recruitment, extract_teams, is_team_related, Extraction, Urgency};
use forms::{Application, ApplicationForm, Comment, CommentForm};
use metrics::{new_run_id, PassTracker};
use settings::Settings;
use text::WorkRow;
use views::{OverviewFilter, RankBy, RecruitmentFilter};

#[derive(Parser)]
#[command(name = "volunteer_records", about = "Volunteer-teaching recruitment and team records")]
struct Cli {
    /// Article export to read (overrides configuration)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Configuration file (default: volunteer_records.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recruitment posts
    Recruit {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        task: Option<String>,
        /// urgent or normal
        #[arg(long, value_parser = parse_urgency)]
        urgency: Option<Urgency>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Team profiles and ranking
    Teams {
        /// honors, volunteers, hours or students
        #[arg(long, default_value = "honors", value_parser = parse_rank_by)]
        rank_by: RankBy,
        #[arg(long)]
        json: bool,
    },
    /// Teams per service location
    Locations,
    /// Landing-page figures
    Overview {
        /// Number of latest stories to list
        #[arg(short = 'n', long, default_value = "3")]
        latest: usize,
        /// Only stories dated in this year
        #[arg(long)]
        year: Option<i32>,
        /// 西南地区, 西北地区, 华北地区 or 其他
        #[arg(long)]
        region: Option<String>,
    },
    /// Validate an application form (JSON) and echo it back
    Apply {
        form: PathBuf,
        /// Recruitment post id
        #[arg(long)]
        recruitment: usize,
    },
    /// Validate a team comment (JSON) and echo it back
    Comment {
        form: PathBuf,
        /// Team id
        #[arg(long)]
        team: usize,
    },
    /// Write extracted records to SQLite
    Export {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn parse_urgency(val: &str) -> Result<Urgency, String> {
    Urgency::parse(val).ok_or_else(|| format!("expected urgent or normal, got {:?}", val))
}

fn parse_rank_by(val: &str) -> Result<RankBy, String> {
    RankBy::parse(val).ok_or_else(|| format!("expected honors, volunteers, hours or students, got {:?}", val))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(settings: &Settings) -> Result<Vec<WorkRow>> {
    let raw = loader::load_rows(&settings.data_path, &settings.encodings, settings.delimiter_byte()?)
        .context("Failed to load article export")?;
    Ok(text::to_work_rows(&raw))
}

fn team_rows(rows: &[WorkRow]) -> Vec<WorkRow> {
    rows.iter()
        .filter(|r| is_team_related(&r.title))
        .cloned()
        .collect()
}

fn print_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        settings.data_path = data;
    }
    info!(data = ?settings.data_path, "Starting volunteer record extraction");
    run(cli.command, &settings, &mut io::stdout().lock())
}

/// Runs one subcommand, writing its report to `out`. An empty extraction is
/// reported as a message, not an error.
fn run<W: Write>(command: Commands, settings: &Settings, out: &mut W) -> Result<()> {
    let opts = settings.extract_options();

    match command {
        Commands::Recruit {
            location,
            task,
            urgency,
            json,
        } => {
            let rows = load(settings)?;
            let extraction = extract_recruitment(&rows, &opts);
            let filter = RecruitmentFilter {
                location,
                task,
                urgency,
            };
            if json {
                let shown = Extraction::from_records(filter.apply(extraction.records()));
                return print_json(out, &shown);
            }
            let records = match extraction {
                Extraction::Found(r) => r,
                Extraction::NothingFound => {
                    writeln!(out, "No recruitment posts found.")?;
                    return Ok(());
                }
            };

            let stats = views::recruitment_stats(&records);
            writeln!(
                out,
                "Positions: {} | Applications: {} | Teams: {} | Urgent: {}\n",
                stats.total_positions,
                stats.total_applications,
                stats.teams_recruiting,
                stats.deadline_approaching
            )?;
            for r in filter.apply(&records) {
                writeln!(out, "#{} {} [{}]", r.id, r.team, r.urgency.as_str())?;
                writeln!(out, "  location: {} | task: {} | duration: {}", r.location, r.task, r.duration)?;
                writeln!(
                    out,
                    "  needed: {} | applied: {} | contact: {}",
                    r.people_needed, r.people_applied, r.contact
                )?;
                writeln!(out, "  {}", r.description)?;
            }
        }
        Commands::Teams { rank_by, json } => {
            let rows = team_rows(&load(settings)?);
            let extraction = extract_teams(&rows, &opts);
            if json {
                return print_json(out, &extraction);
            }
            let teams = match extraction {
                Extraction::Found(t) => t,
                Extraction::NothingFound => {
                    writeln!(out, "No teams found.")?;
                    return Ok(());
                }
            };
            for row in views::team_ranking(&teams, rank_by) {
                writeln!(
                    out,
                    "#{} {} | honors: {} | volunteers: {} | hours: {} | students: {}",
                    row.rank,
                    row.team_name,
                    row.honors_count,
                    row.total_volunteers,
                    row.service_hours,
                    row.served_students
                )?;
            }
        }
        Commands::Locations => {
            let rows = team_rows(&load(settings)?);
            let teams = extract_teams(&rows, &opts).into_records();
            if teams.is_empty() {
                writeln!(out, "No teams found.")?;
                return Ok(());
            }
            for (location, n) in views::location_distribution(&teams) {
                writeln!(out, "{}: {}", location, n)?;
            }
        }
        Commands::Overview {
            latest,
            year,
            region,
        } => {
            let rows = OverviewFilter { year, region }.apply(&load(settings)?);
            let teams = extract_teams(&team_rows(&rows), &opts).into_records();
            print_json(out, &views::overview(&rows, &teams, latest))?;
        }
        Commands::Apply { form, recruitment } => {
            let raw = fs::read_to_string(&form).with_context(|| format!("Failed to read {:?}", form))?;
            let form: ApplicationForm = serde_json::from_str(&raw).context("Invalid application form")?;
            let rows = load(settings)?;
            let records = extract_recruitment(&rows, &opts).into_records();
            let Some(target) = records.iter().find(|r| r.id == recruitment) else {
                bail!("no recruitment post with id {}", recruitment);
            };
            let app = Application::accept(form, target, chrono::Local::now().naive_local())?;
            writeln!(out, "报名成功！我们会在3个工作日内与您联系。")?;
            print_json(out, &app)?;
        }
        Commands::Comment { form, team } => {
            let raw = fs::read_to_string(&form).with_context(|| format!("Failed to read {:?}", form))?;
            let form: CommentForm = serde_json::from_str(&raw).context("Invalid comment form")?;
            let rows = team_rows(&load(settings)?);
            let teams = extract_teams(&rows, &opts).into_records();
            let Some(target) = teams.iter().find(|t| t.id == team) else {
                bail!("no team with id {}", team);
            };
            let comment = Comment::accept(form, target, chrono::Local::now().naive_local())?;
            writeln!(out, "{}", comment.message)?;
            print_json(out, &comment)?;
        }
        Commands::Export { db } => {
            let db_path = db.unwrap_or_else(|| settings.db_path.clone());
            let rows = load(settings)?;
            let conn = db::connect(&db_path)?;
            writeln!(out, "Database: {:?}\n", db_path)?;
            db::create_tables(&conn)?;

            let mut tracker = PassTracker::new(new_run_id());
            conn.execute("BEGIN TRANSACTION", [])?;
            db::clear_records(&conn)?;

            let recruitments = extract_recruitment(&rows, &opts).into_records();
            for r in &recruitments {
                db::insert_recruitment(&conn, r)?;
            }
            tracker.record("recruitment", &rows, recruitments.len());

            let team_input = team_rows(&rows);
            let teams = extract_teams(&team_input, &opts).into_records();
            for t in &teams {
                db::insert_team(&conn, t)?;
            }
            tracker.record("teams", &team_input, teams.len());
            conn.execute("COMMIT", [])?;

            tracker.persist(&conn)?;
            writeln!(
                out,
                "Exported {} recruitment posts and {} teams (run {})",
                recruitments.len(),
                teams.len(),
                tracker.run_id()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    fn settings_for(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> Settings {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        Settings {
            data_path: path,
            db_path: dir.path().join("out.sqlite"),
            ..Settings::default()
        }
    }

    fn run_to_string(command: Commands, settings: &Settings) -> Result<String> {
        let mut out = Vec::new();
        run(command, settings, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    const STORIES_ONLY: &str = "title,content,url,date,account\n山里的图书馆建设记,孩子们,https://a/1,2024-11-08,北师大\n";

    #[test]
    fn nothing_found_is_a_message_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&dir, "stories.csv", STORIES_ONLY.as_bytes());

        let recruit = Commands::Recruit {
            location: None,
            task: None,
            urgency: None,
            json: false,
        };
        assert_eq!(run_to_string(recruit, &settings).unwrap(), "No recruitment posts found.\n");

        let teams = Commands::Teams {
            rank_by: RankBy::Honors,
            json: false,
        };
        assert_eq!(run_to_string(teams, &settings).unwrap(), "No teams found.\n");
    }

    #[test]
    fn json_output_carries_extraction_status() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&dir, "stories.csv", STORIES_ONLY.as_bytes());
        let teams = Commands::Teams {
            rank_by: RankBy::Honors,
            json: true,
        };
        let out = run_to_string(teams, &settings).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["status"], "nothing_found");
    }

    #[test]
    fn undecodable_input_stops_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let (gbk, _, _) = encoding_rs::GBK.encode("title\n地理学院支教队招募\n");
        let mut settings = settings_for(&dir, "gbk.csv", &gbk);
        settings.encodings = vec!["utf-8".to_string()];

        let mut out = Vec::new();
        let recruit = Commands::Recruit {
            location: None,
            task: None,
            urgency: None,
            json: false,
        };
        let err = run(recruit, &settings, &mut out).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::Undecodable { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn fixture_export_and_overview_filter() {
        let dir = tempfile::tempdir().unwrap();
        let csv = fs::read("tests/fixtures/articles.csv").unwrap();
        let settings = settings_for(&dir, "articles.csv", &csv);

        let out = run_to_string(Commands::Export { db: None }, &settings).unwrap();
        assert!(out.contains("Exported 6 recruitment posts and 4 teams"));

        let overview = Commands::Overview {
            latest: 3,
            year: Some(1999),
            region: None,
        };
        let json: serde_json::Value = serde_json::from_str(&run_to_string(overview, &settings).unwrap()).unwrap();
        assert_eq!(json["story_count"], 0);
    }
}
