//! Record extraction: raw article rows in, recruitment posts or team profiles out.
//!
//! Both modes are pure functions of the input rows and the reference tables in
//! [`crate::tables`]. Individual rows never fail; missing data falls back to
//! sentinel values. The only "empty" outcome is [`Extraction::NothingFound`].

pub mod recruitment;
pub mod teams;

use serde::Serialize;

use crate::settings::MetricSettings;

pub use recruitment::{extract_recruitment, RecruitmentRecord, Urgency};
pub use teams::{extract_teams, is_team_related, Article, CollegeRef, TeamRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "records", rename_all = "snake_case")]
pub enum Extraction<T> {
    Found(Vec<T>),
    NothingFound,
}

impl<T> Extraction<T> {
    pub fn from_records(records: Vec<T>) -> Self {
        if records.is_empty() {
            Extraction::NothingFound
        } else {
            Extraction::Found(records)
        }
    }

    pub fn records(&self) -> &[T] {
        match self {
            Extraction::Found(r) => r,
            Extraction::NothingFound => &[],
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Extraction::Found(r) => r,
            Extraction::NothingFound => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::NothingFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub description_budget: usize,
    pub people_needed: u32,
    pub processing_year: i32,
    pub metrics: MetricSettings,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            description_budget: 100,
            people_needed: 3,
            processing_year: 2024,
            metrics: MetricSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_rows;
    use crate::tables::{DEFAULT_TEAM, OTHER_COORDINATES, SEE_DETAILS, UNDETERMINED};
    use crate::text::{to_work_rows, WorkRow};

    fn fixture() -> Vec<WorkRow> {
        let csv = std::fs::read_to_string("tests/fixtures/articles.csv").unwrap();
        to_work_rows(&parse_rows(&csv, b',').unwrap())
    }

    #[test]
    fn fixture_recruitment() {
        let rows = fixture();
        assert_eq!(rows.len(), 7);
        let recs = extract_recruitment(&rows, &ExtractOptions::default()).into_records();

        let ids: Vec<usize> = recs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5, 6, 7]);

        let first = &recs[0];
        assert_eq!(first.team, "地理学院支教队");
        assert_eq!(first.location, "甘肃");
        assert_eq!(first.urgency, Urgency::Urgent);
        assert_eq!(first.contact, "13800138000");
        assert_eq!(first.duration, "一学期");

        assert_eq!(recs[1].contact, "psy_teach@bnu.edu.cn");
        assert_eq!(recs[2].contact, "王老师 13700137000");
        assert_eq!(recs[3].location, UNDETERMINED);
        assert_eq!(recs[4].team, "第21届研究生支教团");
        assert_eq!(recs[4].location, "西藏");

        let last = &recs[5];
        assert_eq!(last.team, DEFAULT_TEAM);
        assert_eq!(last.location, "新疆喀什");
        assert_eq!(last.contact, SEE_DETAILS);
        assert_eq!(last.duration, UNDETERMINED);
        assert_eq!(last.urgency, Urgency::Urgent);
    }

    #[test]
    fn fixture_teams() {
        let rows: Vec<WorkRow> = fixture()
            .into_iter()
            .filter(|r| is_team_related(&r.title))
            .collect();
        let teams = extract_teams(&rows, &ExtractOptions::default()).into_records();
        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "北师大地理学院支教队",
                "北师大心理学院支教队",
                "北师大数学学院支教队",
                "第21届研究生支教团",
            ]
        );
        let geo = &teams[0];
        let article_ids: Vec<usize> = geo.articles.iter().map(|a| a.id).collect();
        assert_eq!(article_ids, vec![1, 5]);
        assert_eq!(geo.total_volunteers, 60);
        assert_eq!(teams[3].college, CollegeRef::Other);
        assert_eq!(teams[3].coordinates, OTHER_COORDINATES);
    }

    #[test]
    fn extraction_serializes_with_status_tag() {
        let empty: Extraction<Article> = Extraction::from_records(Vec::new());
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["status"], "nothing_found");
        assert!(empty.records().is_empty());
    }
}
