//! Parses the `Key: value` result blocks the browser agent is asked to return.
//!
//! ```text
//! ---JOB_FOUND---            or ---JOB_APPLIED---
//! Company: Acme
//! Score: 42/100
//! ---END---
//! ```
//!
//! Lines outside a block are ignored. An unterminated block at the end of the
//! output is kept, since agents often stop before writing `---END---`.

use crate::models::{ApplicationRecord, ApplicationStatus, JobListing};

pub const FOUND_MARKER: &str = "---JOB_FOUND---";
pub const APPLIED_MARKER: &str = "---JOB_APPLIED---";
pub const END_MARKER: &str = "---END---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Found,
    Applied,
}

/// One parsed block. Every field is optional because agents omit things.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReport {
    pub kind: BlockKind,
    pub portal: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<i32>,
    pub status: Option<String>,
    pub cover_letter_used: bool,
    pub resume_uploaded: bool,
    pub tech_stack: Vec<String>,
    pub salary_range: Option<String>,
    pub remote: Option<String>,
    pub experience: Option<String>,
    pub notes: Option<String>,
    /// Block text as received, for portal-specific extraction.
    pub raw_block: String,
}

impl AgentReport {
    fn empty(kind: BlockKind) -> Self {
        Self {
            kind,
            portal: None,
            company: None,
            title: None,
            url: None,
            score: None,
            status: None,
            cover_letter_used: false,
            resume_uploaded: false,
            tech_stack: Vec::new(),
            salary_range: None,
            remote: None,
            experience: None,
            notes: None,
            raw_block: String::new(),
        }
    }

    /// True when the block carried nothing identifying a job.
    pub fn is_blank(&self) -> bool {
        self.company.is_none() && self.title.is_none() && self.url.is_none()
    }

    /// The portal is always the one the task ran on, whatever the agent wrote.
    pub fn to_listing(&self, portal: &str) -> JobListing {
        let mut listing = JobListing::new(
            portal,
            self.company.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default(),
        );
        listing.url = self.url.clone().unwrap_or_default();
        listing.score = self.score;
        listing.tech_stack = self.tech_stack.clone();
        listing.salary_range = self.salary_range.clone();
        listing.remote = self.remote.clone();
        listing.experience = self.experience.clone();
        listing
    }

    pub fn to_record(&self, portal: &str) -> ApplicationRecord {
        let status = ApplicationStatus::from_agent(self.status.as_deref());
        let mut record = ApplicationRecord::from_listing(&self.to_listing(portal), status);
        record.cover_letter_used = self.cover_letter_used;
        record.resume_uploaded = self.resume_uploaded;
        record.notes = self.notes.clone();
        record
    }
}

/// All blocks in `raw`, in order. Blocks with no identifying fields are dropped.
pub fn parse_reports(raw: &str) -> Vec<AgentReport> {
    let mut reports = Vec::new();
    let mut current: Option<(BlockKind, Vec<&str>)> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        let starts = if trimmed.starts_with(FOUND_MARKER) {
            Some(BlockKind::Found)
        } else if trimmed.starts_with(APPLIED_MARKER) {
            Some(BlockKind::Applied)
        } else {
            None
        };

        if let Some(kind) = starts {
            if let Some((prev_kind, lines)) = current.take() {
                push_report(&mut reports, prev_kind, &lines);
            }
            current = Some((kind, Vec::new()));
        } else if trimmed.starts_with(END_MARKER) {
            if let Some((kind, lines)) = current.take() {
                push_report(&mut reports, kind, &lines);
            }
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(trimmed);
        }
    }

    if let Some((kind, lines)) = current {
        push_report(&mut reports, kind, &lines);
    }
    reports
}

fn push_report(reports: &mut Vec<AgentReport>, kind: BlockKind, lines: &[&str]) {
    let report = parse_fields(kind, &lines.join("\n"));
    if !report.is_blank() {
        reports.push(report);
    }
}

/// Reads every recognised `Key: value` line in `text`. Later lines win.
pub fn parse_fields(kind: BlockKind, text: &str) -> AgentReport {
    let mut report = AgentReport::empty(kind);
    report.raw_block = text.to_string();

    for line in text.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Portal" => report.portal = non_empty(value),
            "Company" => report.company = non_empty(value),
            "Title" => report.title = non_empty(value),
            "URL" => report.url = non_empty(value),
            "Score" => report.score = parse_score(value),
            "Status" => report.status = non_empty(value),
            "CoverLetterUsed" => report.cover_letter_used = parse_bool(value),
            "ResumeUploaded" => report.resume_uploaded = parse_bool(value),
            "TechStack" => report.tech_stack = parse_list(value),
            "SalaryRange" => report.salary_range = non_empty(value),
            "Remote" => report.remote = non_empty(value),
            "Experience" => report.experience = non_empty(value),
            "Notes" => report.notes = non_empty(value),
            _ => {}
        }
    }
    report
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim_matches(|c| c == '[' || c == ']').trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// `42`, `42/100` and `42 / 100` all read as 42; `N/A` and junk read as none.
fn parse_score(value: &str) -> Option<i32> {
    value.split('/').next()?.trim().parse().ok()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "yes")
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
