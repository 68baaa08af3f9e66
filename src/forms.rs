//! Application and comment forms. Accepted submissions are echoed back, never stored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::extract::{RecruitmentRecord, TeamRecord};

pub const COLLEGE_PLACEHOLDER: &str = "请选择学院";
pub const GRADE_PLACEHOLDER: &str = "请选择年级";
pub const COMMENTER_ROLES: &[&str] = &["在校学生", "毕业校友", "社会人士", "其他"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub name: String,
    pub student_id: String,
    pub college: String,
    pub phone: String,
    pub email: String,
    pub grade: String,
    pub preferred_subjects: Vec<String>,
    pub preferred_duration: String,
    pub experience: String,
    pub skills: String,
    pub motivation: String,
    pub health_status: String,
    pub has_certificate: bool,
    pub emergency_contact: String,
    #[serde(skip_serializing)]
    pub agree_terms: bool,
}

impl ApplicationForm {
    /// Every mandatory field must be filled before the terms are checked.
    pub fn validate(&self) -> Result<(), FormError> {
        let blank = |v: &str| v.trim().is_empty();
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.student_id) {
            missing.push("student_id");
        }
        if blank(&self.college) || self.college == COLLEGE_PLACEHOLDER {
            missing.push("college");
        }
        if blank(&self.phone) {
            missing.push("phone");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if blank(&self.grade) || self.grade == GRADE_PLACEHOLDER {
            missing.push("grade");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        if !self.agree_terms {
            return Err(FormError::TermsNotAccepted);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub recruitment_id: usize,
    pub team: String,
    #[serde(flatten)]
    pub form: ApplicationForm,
    pub apply_time: String,
}

impl Application {
    pub fn accept(
        form: ApplicationForm,
        recruitment: &RecruitmentRecord,
        now: NaiveDateTime,
    ) -> Result<Self, FormError> {
        form.validate()?;
        Ok(Application {
            recruitment_id: recruitment.id,
            team: recruitment.team.clone(),
            form,
            apply_time: now.format(TIME_FORMAT).to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub name: String,
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub team_id: usize,
    pub team_name: String,
    pub commenter_name: String,
    pub commenter_role: String,
    pub comment_text: String,
    pub timestamp: String,
    pub message: String,
}

impl Comment {
    pub fn accept(form: CommentForm, team: &TeamRecord, now: NaiveDateTime) -> Result<Self, FormError> {
        let mut missing = Vec::new();
        if form.name.trim().is_empty() {
            missing.push("name");
        }
        if form.text.trim().is_empty() {
            missing.push("text");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        let role = if COMMENTER_ROLES.contains(&form.role.as_str()) {
            form.role
        } else {
            "其他".to_string()
        };
        Ok(Comment {
            team_id: team.id,
            team_name: team.team_name.clone(),
            message: format!("感谢 {} 的留言！您的支持是我们前进的动力！", form.name.trim()),
            commenter_name: form.name,
            commenter_role: role,
            comment_text: form.text,
            timestamp: now.format(TIME_FORMAT).to_string(),
        })
    }
}
