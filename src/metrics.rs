use anyhow::Result;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::db;
use crate::text::{total_chars, WorkRow};

pub struct PassTracker {
    run_id: String,
    metrics: Vec<PassMetric>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassMetric {
    pub pass_name: String,
    pub rows: usize,
    pub chars: usize,
    pub records: usize,
}

impl PassTracker {
    pub fn new(run_id: String) -> Self {
        PassTracker {
            run_id,
            metrics: Vec::new(),
        }
    }

    pub fn record(&mut self, pass_name: &str, rows: &[WorkRow], records: usize) {
        let chars = total_chars(rows);
        info!(pass = pass_name, rows = rows.len(), chars, records, "pass finished");
        self.metrics.push(PassMetric {
            pass_name: pass_name.to_string(),
            rows: rows.len(),
            chars,
            records,
        });
    }

    pub fn persist(&self, conn: &Connection) -> Result<()> {
        for metric in &self.metrics {
            db::insert_pass_metric(conn, &self.run_id, metric)?;
        }
        Ok(())
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Microsecond timestamp plus a per-process sequence number.
pub fn new_run_id() -> String {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("run-{}-{}", chrono::Local::now().format("%Y%m%dT%H%M%S%.6f"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{to_work_rows, RawRow};

    #[test]
    fn back_to_back_runs_get_distinct_ids() {
        let a = new_run_id();
        let b = new_run_id();
        assert_ne!(a, b);
        assert!(a.starts_with("run-"));
    }

    #[test]
    fn metrics_from_two_runs_are_both_kept() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("m.sqlite")).unwrap();
        db::create_tables(&conn).unwrap();
        let rows = to_work_rows(&[RawRow {
            title: "支教招募".into(),
            ..Default::default()
        }]);
        for _ in 0..2 {
            let mut tracker = PassTracker::new(new_run_id());
            tracker.record("recruitment", &rows, 1);
            tracker.persist(&conn).unwrap();
        }
        assert_eq!(db::count(&conn, "pass_metrics").unwrap(), 2);
    }
}
