use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{job_identifier, JobListing};

/// Maximum length of the raw agent output kept on a record.
pub const RAW_RESULT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Success,
    Failed,
    Skipped,
    DryRun,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    /// Maps the agent's free-text `Status:` field.
    pub fn from_agent(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("success") | Some("applied") | Some("submitted") => Self::Success,
            Some("failed") | Some("failure") | Some("error") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::DryRun => "dry_run",
            Self::Unknown => "unknown",
        }
    }
}

/// One application attempt. Append-only: created once, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "unknown_portal")]
    pub portal: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(default = "unknown_status")]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter_used: bool,
    #[serde(default)]
    pub resume_uploaded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<String>,
    #[serde(default = "now_local")]
    pub applied_at: NaiveDateTime,
}

fn unknown_portal() -> String {
    "unknown".to_string()
}

fn unknown_status() -> ApplicationStatus {
    ApplicationStatus::Unknown
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

impl ApplicationRecord {
    pub fn new(portal: &str, status: ApplicationStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            portal: portal.to_string(),
            company: String::new(),
            title: String::new(),
            url: String::new(),
            score: None,
            status,
            cover_letter_used: false,
            resume_uploaded: false,
            tech_stack: Vec::new(),
            salary_range: None,
            notes: None,
            reason: None,
            error: None,
            raw_result: None,
            applied_at: now_local(),
        }
    }

    pub fn from_listing(listing: &JobListing, status: ApplicationStatus) -> Self {
        Self {
            company: listing.company.clone(),
            title: listing.title.clone(),
            url: listing.url.clone(),
            score: listing.score,
            tech_stack: listing.tech_stack.clone(),
            salary_range: listing.salary_range.clone(),
            ..Self::new(&listing.portal, status)
        }
    }

    /// A failed attempt where the agent never produced a usable result.
    pub fn failure(portal: &str, url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            error: Some(error.into()),
            ..Self::new(portal, ApplicationStatus::Failed)
        }
    }

    pub fn skipped(portal: &str, reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::new(portal, ApplicationStatus::Skipped)
        }
    }

    pub fn with_raw_result(mut self, raw: &str) -> Self {
        if !raw.is_empty() {
            self.raw_result = Some(raw.chars().take(RAW_RESULT_LIMIT).collect());
        }
        self
    }

    pub fn identifier(&self) -> String {
        job_identifier(&self.company, &self.title, &self.portal)
    }

    pub fn display_company(&self) -> &str {
        if self.company.is_empty() {
            "Unknown"
        } else {
            &self.company
        }
    }
}
