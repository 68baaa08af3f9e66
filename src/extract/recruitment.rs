use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::{ExtractOptions, Extraction};
use crate::tables::{self, DEFAULT_TEAM, RECRUIT_KEYWORDS, SEE_DETAILS, UNDETERMINED, URGENCY_KEYWORDS};
use crate::text::{truncate_chars, WorkRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    Normal,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Normal => "normal",
        }
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "urgent" => Some(Urgency::Urgent),
            "normal" => Some(Urgency::Normal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecruitmentRecord {
    pub id: usize,
    pub team: String,
    pub location: String,
    pub task: String,
    pub description: String,
    pub urgency: Urgency,
    pub contact: String,
    pub duration: String,
    pub people_needed: u32,
    /// Synthetic: `ordinal % 10 + 1`, not a real applicant count.
    pub people_applied: u32,
    pub url: String,
    pub date: String,
}

pub fn extract_recruitment(rows: &[WorkRow], opts: &ExtractOptions) -> Extraction<RecruitmentRecord> {
    let records: Vec<RecruitmentRecord> = rows
        .iter()
        .filter(|row| qualifies(&row.title))
        .map(|row| build_record(row, opts))
        .collect();
    debug!(rows = rows.len(), records = records.len(), "recruitment extraction");
    Extraction::from_records(records)
}

pub fn qualifies(title: &str) -> bool {
    RECRUIT_KEYWORDS.iter().any(|k| title.contains(k))
}

fn build_record(row: &WorkRow, opts: &ExtractOptions) -> RecruitmentRecord {
    RecruitmentRecord {
        id: row.ordinal + 1,
        team: extract_team(row),
        location: extract_location(row),
        task: row.title.clone(),
        description: truncate_chars(&row.content, opts.description_budget),
        urgency: classify_urgency(&row.title),
        contact: extract_contact(row),
        duration: row
            .duration
            .clone()
            .unwrap_or_else(|| UNDETERMINED.to_string()),
        people_needed: opts.people_needed,
        people_applied: (row.ordinal % 10 + 1) as u32,
        url: row.url.clone(),
        date: row.date.clone(),
    }
}

pub fn classify_urgency(title: &str) -> Urgency {
    if URGENCY_KEYWORDS.iter().any(|k| title.contains(k)) {
        Urgency::Urgent
    } else {
        Urgency::Normal
    }
}

fn extract_location(row: &WorkRow) -> String {
    if let Some(loc) = &row.location {
        return loc.clone();
    }
    locate(&format!("{}{}", row.title, row.content))
}

/// First gazetteer hit in `text`, or the undetermined sentinel.
pub fn locate(text: &str) -> String {
    match tables::gazetteer().first_match(text) {
        Some(m) => {
            debug!(rule = m.rule, location = m.text, "gazetteer match");
            m.text.to_string()
        }
        None => UNDETERMINED.to_string(),
    }
}

fn extract_team(row: &WorkRow) -> String {
    if let Some(name) = tables::find_team_name(&row.title) {
        return name;
    }
    if !row.account.is_empty() {
        return row.account.clone();
    }
    DEFAULT_TEAM.to_string()
}

fn extract_contact(row: &WorkRow) -> String {
    if let Some(c) = &row.contact {
        return c.clone();
    }
    find_contact(&row.content).unwrap_or_else(|| SEE_DETAILS.to_string())
}

/// Mobile number first, then email.
pub fn find_contact(text: &str) -> Option<String> {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    let phone_re = PHONE_RE.get_or_init(|| Regex::new(r"(?:^|\D)(1[3-9]\d{9})(?:\D|$)").unwrap());

    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let email_re = EMAIL_RE
        .get_or_init(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

    if let Some(caps) = phone_re.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    email_re.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{to_work_rows, RawRow};

    fn row(title: &str, content: &str) -> RawRow {
        RawRow {
            title: title.into(),
            content: content.into(),
            url: format!("https://mp.example/{}", title.len()),
            date: "2024-11-15".into(),
            account: "北师大研究生支教团".into(),
            ..Default::default()
        }
    }

    fn extract(rows: Vec<RawRow>) -> Extraction<RecruitmentRecord> {
        extract_recruitment(&to_work_rows(&rows), &ExtractOptions::default())
    }

    #[test]
    fn only_qualifying_titles_produce_records() {
        let out = extract(vec![
            row("地理学院支教队招募", ""),
            row("山里的图书馆建设记", ""),
            row("心理学院志愿者报名开启", ""),
        ]);
        let titles: Vec<&str> = out.records().iter().map(|r| r.task.as_str()).collect();
        assert_eq!(titles, vec!["地理学院支教队招募", "心理学院志愿者报名开启"]);
        // ids and synthetic counters follow the ordinal over all input rows
        assert_eq!(out.records()[1].id, 3);
        assert_eq!(out.records()[1].people_applied, 3);
    }

    #[test]
    fn province_rule_precedes_city_rule() {
        let out = extract(vec![row("兰州支教招募", "服务地点：甘肃兰州")]);
        assert_eq!(out.records()[0].location, "甘肃");
    }

    #[test]
    fn regional_city_and_undetermined() {
        let out = extract(vec![row("毕节支教招募", "高中数学"), row("支教招募", "无地点")]);
        assert_eq!(out.records()[0].location, "毕节");
        assert_eq!(out.records()[1].location, UNDETERMINED);
    }

    #[test]
    fn explicit_location_wins() {
        let mut r = row("甘肃支教招募", "");
        r.location = Some("云南昆明".into());
        assert_eq!(extract(vec![r]).records()[0].location, "云南昆明");
    }

    #[test]
    fn urgency_keywords() {
        assert_eq!(classify_urgency("紧急招募数学老师"), Urgency::Urgent);
        assert_eq!(classify_urgency("报名截止提醒"), Urgency::Urgent);
        assert_eq!(classify_urgency("支教招募"), Urgency::Normal);
        assert_eq!(classify_urgency(""), Urgency::Normal);
    }

    #[test]
    fn team_name_rules_then_account_then_default() {
        let out = extract(vec![
            row("地理学院支教队招募", ""),
            row("教育学部支教团报名", ""),
            row("志愿者招募", ""),
        ]);
        let teams: Vec<&str> = out.records().iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["地理学院支教队", "教育学部支教团", "北师大研究生支教团"]);

        let mut anon = row("志愿者招募", "");
        anon.account = String::new();
        assert_eq!(extract(vec![anon]).records()[0].team, DEFAULT_TEAM);
    }

    #[test]
    fn team_name_excludes_leading_title_words() {
        let out = extract(vec![
            row("紧急招募地理学院支教队数学老师", ""),
            row("招募地理学院支教队英语老师", ""),
        ]);
        let teams: Vec<&str> = out.records().iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["地理学院支教队", "地理学院支教队"]);
    }

    #[test]
    fn phone_beats_email() {
        let text = "联系邮箱 apply@bnu.edu.cn，电话 13800138000";
        assert_eq!(find_contact(text).as_deref(), Some("13800138000"));
        assert_eq!(find_contact("邮箱 apply@bnu.edu.cn").as_deref(), Some("apply@bnu.edu.cn"));
        // too long to be a mobile number
        assert_eq!(find_contact("编号 138001380001"), None);
        assert_eq!(find_contact("咨询热线 010-58800000"), None);
    }

    #[test]
    fn contact_sentinel_and_explicit_field() {
        let out = extract(vec![row("支教招募", "详情见海报")]);
        assert_eq!(out.records()[0].contact, SEE_DETAILS);

        let mut r = row("支教招募", "电话 13800138000");
        r.contact = Some("张老师".into());
        assert_eq!(extract(vec![r]).records()[0].contact, "张老师");
    }

    #[test]
    fn description_is_truncated() {
        let long = "支".repeat(150);
        let out = extract(vec![row("支教招募", &long)]);
        let desc = &out.records()[0].description;
        assert_eq!(desc.chars().count(), 103);
        assert!(desc.ends_with("..."));
    }

    #[test]
    fn empty_input_is_nothing_found() {
        assert_eq!(extract(vec![]), Extraction::NothingFound);
        assert!(extract(vec![row("普通文章", "")]).is_empty());
    }

    #[test]
    fn rerun_is_identical() {
        let rows = vec![row("紧急招募：甘肃支教", "联系 13912345678"), row("志愿报名", "")];
        assert_eq!(extract(rows.clone()), extract(rows));
    }
}
