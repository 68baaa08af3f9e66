use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::{ExtractOptions, Extraction};
use crate::settings::MetricSettings;
use crate::tables::{
    self, CollegeProfile, HONORS_EMERGING, HONORS_ESTABLISHED, INSTITUTION, OTHER_COLLEGE,
    OTHER_COORDINATES, OTHER_SLOGAN, SQUAD_SUFFIX, TEAM_MARKERS, UNDETERMINED,
};
use crate::text::WorkRow;

#[derive(Debug, Clone, PartialEq)]
pub enum CollegeRef {
    Known(&'static CollegeProfile),
    Other,
}

impl CollegeRef {
    pub fn name(&self) -> &'static str {
        match self {
            CollegeRef::Known(p) => p.name,
            CollegeRef::Other => OTHER_COLLEGE,
        }
    }
}

impl Serialize for CollegeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRecord {
    pub id: usize,
    pub team_name: String,
    pub college: CollegeRef,
    pub slogan: String,
    pub location: String,
    pub coordinates: (f64, f64),
    pub established_year: i32,
    pub total_volunteers: u32,
    pub service_hours: u32,
    pub served_students: u32,
    pub honors: Vec<String>,
    pub articles: Vec<Article>,
}

/// Synthetic counters derived only from the article count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMetrics {
    pub total_volunteers: u32,
    pub service_hours: u32,
    pub served_students: u32,
}

impl TeamMetrics {
    pub fn from_article_count(count: usize, m: &MetricSettings) -> Self {
        let n = u32::try_from(count).unwrap_or(u32::MAX);
        TeamMetrics {
            total_volunteers: m.volunteer_base.saturating_add(n.saturating_mul(m.volunteer_mult)),
            service_hours: m.hours_base.saturating_add(n.saturating_mul(m.hours_mult)),
            served_students: m.students_base.saturating_add(n.saturating_mul(m.students_mult)),
        }
    }
}

pub fn honors_for(count: usize, m: &MetricSettings) -> Vec<String> {
    let template = if count >= m.honors_threshold {
        HONORS_ESTABLISHED
    } else {
        HONORS_EMERGING
    };
    template.iter().map(|h| h.to_string()).collect()
}

pub fn is_team_related(title: &str) -> bool {
    TEAM_MARKERS.iter().any(|m| title.contains(m))
}

/// Rewrites names that mention a known college to `北师大<college>支教队`.
pub fn normalize_team_name(raw: &str) -> (String, CollegeRef) {
    match tables::find_college(raw) {
        Some(profile) => (
            format!("{}{}{}", INSTITUTION, profile.name, SQUAD_SUFFIX),
            CollegeRef::Known(profile),
        ),
        None => (raw.to_string(), CollegeRef::Other),
    }
}

struct Group {
    team_name: String,
    college: CollegeRef,
    articles: Vec<Article>,
}

pub fn extract_teams(rows: &[WorkRow], opts: &ExtractOptions) -> Extraction<TeamRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in rows {
        let Some(raw_name) = tables::find_team_name(&row.title) else {
            continue;
        };
        let (team_name, college) = normalize_team_name(&raw_name);
        let slot = *index.entry(team_name.clone()).or_insert_with(|| {
            groups.push(Group {
                team_name,
                college,
                articles: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].articles.push(Article {
            title: row.title.clone(),
            url: row.url.clone(),
            id: row.ordinal + 1,
        });
    }

    let records: Vec<TeamRecord> = groups
        .into_iter()
        .enumerate()
        .map(|(i, g)| enrich(i + 1, g, opts))
        .collect();
    debug!(rows = rows.len(), teams = records.len(), "team extraction");
    Extraction::from_records(records)
}

fn enrich(id: usize, group: Group, opts: &ExtractOptions) -> TeamRecord {
    let count = group.articles.len();
    let metrics = TeamMetrics::from_article_count(count, &opts.metrics);
    let (slogan, location, coordinates, established_year) = match &group.college {
        CollegeRef::Known(p) => (p.slogan, p.location, p.coordinates, p.established_year),
        CollegeRef::Other => (OTHER_SLOGAN, UNDETERMINED, OTHER_COORDINATES, opts.processing_year),
    };
    TeamRecord {
        id,
        team_name: group.team_name,
        college: group.college,
        slogan: slogan.to_string(),
        location: location.to_string(),
        coordinates,
        established_year,
        total_volunteers: metrics.total_volunteers,
        service_hours: metrics.service_hours,
        served_students: metrics.served_students,
        honors: honors_for(count, &opts.metrics),
        articles: group.articles,
    }
}
