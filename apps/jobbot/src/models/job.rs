use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A job listing reported by the browser agent. Transient until journaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub portal: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Local score once analysed; otherwise whatever the agent reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_apply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yc_batch: Option<String>,
    #[serde(default = "now_local")]
    pub observed_at: NaiveDateTime,
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

impl JobListing {
    pub fn new(portal: &str, company: &str, title: &str) -> Self {
        Self {
            portal: portal.to_string(),
            company: company.to_string(),
            title: title.to_string(),
            url: String::new(),
            description: String::new(),
            score: None,
            tech_stack: Vec::new(),
            salary_range: None,
            remote: None,
            experience: None,
            easy_apply: None,
            yc_batch: None,
            observed_at: now_local(),
        }
    }

    /// Dedup key shared by every tracking file: `Company - Title (portal)`.
    pub fn identifier(&self) -> String {
        job_identifier(&self.company, &self.title, &self.portal)
    }

    /// Text to score against. Search results rarely carry a full description,
    /// so it is rebuilt from the structured fields the agent did report.
    pub fn analysis_text(&self) -> String {
        if !self.description.trim().is_empty() {
            return self.description.clone();
        }
        let mut parts: Vec<&str> = self.tech_stack.iter().map(String::as_str).collect();
        if let Some(experience) = self.experience.as_deref() {
            parts.push(experience);
        }
        if let Some(remote) = self.remote.as_deref() {
            parts.push(remote);
        }
        if parts.is_empty() {
            self.title.clone()
        } else {
            parts.join(" ")
        }
    }

    pub fn has_salary_range(&self) -> bool {
        match self.salary_range.as_deref() {
            Some(s) => {
                let s = s.trim().to_lowercase();
                !s.is_empty() && s != "not specified" && s != "n/a"
            }
            None => false,
        }
    }
}

pub fn job_identifier(company: &str, title: &str, portal: &str) -> String {
    format!("{company} - {title} ({portal})")
}
