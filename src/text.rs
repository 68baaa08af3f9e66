use serde::Deserialize;

use crate::tables::ELLIPSIS;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One unprocessed row of the article export. Missing columns deserialize empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub title: String,
    pub content: String,
    pub url: String,
    pub date: String,
    pub account: String,
    pub contact: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
}

/// A row after whitespace cleanup, tagged with its position in the input.
#[derive(Debug, Clone)]
pub struct WorkRow {
    pub ordinal: usize,
    pub title: String,
    pub content: String,
    pub url: String,
    pub date: String,
    pub account: String,
    pub contact: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
}

impl WorkRow {
    pub fn from_raw(ordinal: usize, raw: &RawRow) -> Self {
        WorkRow {
            ordinal,
            title: raw.title.trim().to_string(),
            content: clean_content(&raw.content),
            url: raw.url.trim().to_string(),
            date: raw.date.trim().to_string(),
            account: raw.account.trim().to_string(),
            contact: non_empty(raw.contact.as_deref()),
            duration: non_empty(raw.duration.as_deref()),
            location: non_empty(raw.location.as_deref()),
        }
    }

    pub fn char_len(&self) -> usize {
        self.title.chars().count() + self.content.chars().count()
    }
}

#[cfg(feature = "rayon")]
pub fn to_work_rows(rows: &[RawRow]) -> Vec<WorkRow> {
    rows.par_iter()
        .enumerate()
        .map(|(i, r)| WorkRow::from_raw(i, r))
        .collect()
}

#[cfg(not(feature = "rayon"))]
pub fn to_work_rows(rows: &[RawRow]) -> Vec<WorkRow> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| WorkRow::from_raw(i, r))
        .collect()
}

pub fn total_chars(rows: &[WorkRow]) -> usize {
    rows.iter().map(WorkRow::char_len).sum()
}

/// Keeps at most `budget` characters, appending an ellipsis when anything was cut.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

fn clean_content(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty(val: Option<&str>) -> Option<String> {
    val.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
