//! Projections the dashboard pages render from extracted records.

use std::cmp::Reverse;
use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::extract::{RecruitmentRecord, TeamRecord, Urgency};
use crate::tables;
use crate::text::WorkRow;

/// `None` on any field means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecruitmentFilter {
    pub location: Option<String>,
    pub task: Option<String>,
    pub urgency: Option<Urgency>,
}

impl RecruitmentFilter {
    pub fn matches(&self, r: &RecruitmentRecord) -> bool {
        self.location.as_deref().map_or(true, |l| r.location == l)
            && self.task.as_deref().map_or(true, |t| r.task == t)
            && self.urgency.map_or(true, |u| r.urgency == u)
    }

    pub fn apply<'a>(&self, records: &'a [RecruitmentRecord]) -> Vec<&'a RecruitmentRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub tasks: Vec<String>,
}

pub fn filter_options(records: &[RecruitmentRecord]) -> FilterOptions {
    FilterOptions {
        locations: records.iter().map(|r| r.location.clone()).unique().sorted().collect(),
        tasks: records.iter().map(|r| r.task.clone()).unique().sorted().collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecruitmentStats {
    pub total_positions: u32,
    pub total_applications: u32,
    pub teams_recruiting: usize,
    pub deadline_approaching: usize,
}

pub fn recruitment_stats(records: &[RecruitmentRecord]) -> RecruitmentStats {
    RecruitmentStats {
        total_positions: records.iter().map(|r| r.people_needed).sum(),
        total_applications: records.iter().map(|r| r.people_applied).sum(),
        teams_recruiting: records.iter().map(|r| r.team.as_str()).unique().count(),
        deadline_approaching: records
            .iter()
            .filter(|r| r.urgency == Urgency::Urgent)
            .count(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    #[default]
    Honors,
    Volunteers,
    Hours,
    Students,
}

impl RankBy {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "honors" => Some(RankBy::Honors),
            "volunteers" => Some(RankBy::Volunteers),
            "hours" => Some(RankBy::Hours),
            "students" => Some(RankBy::Students),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub team_name: String,
    pub honors_count: usize,
    pub total_volunteers: u32,
    pub service_hours: u32,
    pub served_students: u32,
}

/// Descending by the chosen key; ties keep extraction order.
pub fn team_ranking(teams: &[TeamRecord], by: RankBy) -> Vec<RankingRow> {
    let key = |t: &TeamRecord| -> u64 {
        match by {
            RankBy::Honors => t.honors.len() as u64,
            RankBy::Volunteers => u64::from(t.total_volunteers),
            RankBy::Hours => u64::from(t.service_hours),
            RankBy::Students => u64::from(t.served_students),
        }
    };
    teams
        .iter()
        .sorted_by_key(|t| Reverse(key(*t)))
        .enumerate()
        .map(|(i, t)| RankingRow {
            rank: i + 1,
            team_name: t.team_name.clone(),
            honors_count: t.honors.len(),
            total_volunteers: t.total_volunteers,
            service_hours: t.service_hours,
            served_students: t.served_students,
        })
        .collect()
}

/// Teams per location, most common first, then by name.
pub fn location_distribution(teams: &[TeamRecord]) -> Vec<(String, usize)> {
    teams
        .iter()
        .map(|t| t.location.clone())
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Landing-page sidebar selectors. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewFilter {
    pub year: Option<i32>,
    pub region: Option<String>,
}

impl OverviewFilter {
    pub fn matches(&self, row: &WorkRow) -> bool {
        self.year.map_or(true, |y| story_year(row) == Some(y))
            && self.region.as_deref().map_or(true, |r| story_region(row) == r)
    }

    pub fn apply(&self, rows: &[WorkRow]) -> Vec<WorkRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn story_year(row: &WorkRow) -> Option<i32> {
    row.date.get(..4)?.parse().ok()
}

/// First province named in the title, else in the content.
fn story_province(row: &WorkRow) -> Option<&str> {
    let provinces = tables::provinces();
    provinces
        .first_match(&row.title)
        .or_else(|| provinces.first_match(&row.content))
        .map(|m| m.text)
}

fn story_region(row: &WorkRow) -> &'static str {
    story_province(row).map_or(tables::OTHER_REGION, tables::region_of)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceCount {
    pub province: String,
    pub stories: usize,
    pub teams: usize,
}

/// Stories and teams per province for the map, most stories first, then by name.
pub fn province_map(rows: &[WorkRow], teams: &[TeamRecord]) -> Vec<ProvinceCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for province in rows.iter().filter_map(story_province) {
        counts.entry(province).or_default().0 += 1;
    }
    for team in teams {
        if let Some(m) = tables::provinces().first_match(&team.location) {
            counts.entry(m.text).or_default().1 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(province, (stories, team_count))| ProvinceCount {
            province: province.to_string(),
            stories,
            teams: team_count,
        })
        .sorted_by(|a, b| b.stories.cmp(&a.stories).then_with(|| a.province.cmp(&b.province)))
        .collect()
}

/// Occurrences of each story keyword across titles and contents. Keywords
/// that never occur are dropped; ties keep keyword-table order.
pub fn keyword_frequencies(rows: &[WorkRow], limit: usize) -> Vec<(String, usize)> {
    tables::STORY_KEYWORDS
        .iter()
        .map(|&k| {
            let n: usize = rows
                .iter()
                .map(|r| r.title.matches(k).count() + r.content.matches(k).count())
                .sum();
            (k.to_string(), n)
        })
        .filter(|(_, n)| *n > 0)
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(limit)
        .collect()
}

pub const TOP_KEYWORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySummary {
    pub title: String,
    pub account: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub story_count: usize,
    pub team_count: usize,
    pub provinces_covered: Vec<String>,
    /// Sum of the synthetic per-team volunteer counters.
    pub total_volunteers: u64,
    pub province_map: Vec<ProvinceCount>,
    pub top_keywords: Vec<(String, usize)>,
    pub latest: Vec<StorySummary>,
}

/// Landing-page figures. Dates compare as strings, so ISO dates sort correctly.
pub fn overview(rows: &[WorkRow], teams: &[TeamRecord], latest: usize) -> Overview {
    let provinces = tables::provinces();
    let provinces_covered = rows
        .iter()
        .flat_map(|r| {
            let mut found = provinces.all_matches(&r.title);
            found.extend(provinces.all_matches(&r.content));
            found
        })
        .map(str::to_string)
        .unique()
        .sorted()
        .collect();

    let latest = rows
        .iter()
        .sorted_by(|a, b| b.date.cmp(&a.date).then_with(|| a.ordinal.cmp(&b.ordinal)))
        .take(latest)
        .map(|r| StorySummary {
            title: r.title.clone(),
            account: r.account.clone(),
            date: r.date.clone(),
            url: r.url.clone(),
        })
        .collect();

    Overview {
        story_count: rows.len(),
        team_count: teams.len(),
        provinces_covered,
        total_volunteers: teams.iter().map(|t| u64::from(t.total_volunteers)).sum(),
        province_map: province_map(rows, teams),
        top_keywords: keyword_frequencies(rows, TOP_KEYWORDS),
        latest,
    }
}
