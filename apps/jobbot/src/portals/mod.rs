//! Job portals: one adapter per site, all behind the `Portal` trait.
//!
//! Adapters only build task text for the browser agent and interpret what it
//! reports back. They never touch the tracker; callers pass a `TaskContext`
//! snapshot (applied list, quota status, filters) in.

pub mod linkedin;
pub mod prompts;
pub mod result_parser;
pub mod workatastartup;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{Config, PortalCredentials};
use crate::errors::AppError;
use crate::models::JobListing;
use crate::profile::CandidateProfile;
use crate::rate_limit::{RateLimitRule, RateLimitStatus};
use crate::scoring::ScoringConfig;

pub use linkedin::LinkedIn;
pub use result_parser::{AgentReport, BlockKind};
pub use workatastartup::WorkAtAStartup;

// ────────────────────────────────────────────────────────────────────────────
// Portal identity
// ────────────────────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PortalKind {
    #[value(name = "linkedin")]
    LinkedIn,
    #[value(name = "workatastartup", alias = "waas")]
    WorkAtAStartup,
}

impl PortalKind {
    pub const ALL: [PortalKind; 2] = [PortalKind::LinkedIn, PortalKind::WorkAtAStartup];

    /// Key used in tracking files and rate-limit counters.
    pub fn key(&self) -> &'static str {
        match self {
            PortalKind::LinkedIn => "linkedin",
            PortalKind::WorkAtAStartup => "workatastartup",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PortalKind::LinkedIn => "LinkedIn",
            PortalKind::WorkAtAStartup => "Work at a Startup",
        }
    }

    /// Portal hosting `url`, judged by its host: the portal's domain or a
    /// subdomain of it. Paths and query strings are ignored.
    pub fn from_url(url: &Url) -> Option<PortalKind> {
        let host = url.host_str()?.to_lowercase();
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));
        if on("workatastartup.com") {
            Some(PortalKind::WorkAtAStartup)
        } else if on("linkedin.com") {
            Some(PortalKind::LinkedIn)
        } else {
            None
        }
    }
}

impl fmt::Display for PortalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PortalKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(PortalKind::LinkedIn),
            "workatastartup" | "waas" => Ok(PortalKind::WorkAtAStartup),
            other => Err(AppError::UnknownPortal(other.to_string())),
        }
    }
}

/// Maximum age of listings to consider. Only LinkedIn filters by URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Freshness {
    #[value(name = "1h")]
    PastHour,
    #[default]
    #[value(name = "24h")]
    PastDay,
    #[value(name = "7d")]
    PastWeek,
    #[value(name = "30d")]
    PastMonth,
}

impl Freshness {
    pub fn label(&self) -> &'static str {
        match self {
            Freshness::PastHour => "1h",
            Freshness::PastDay => "24h",
            Freshness::PastWeek => "7d",
            Freshness::PastMonth => "30d",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Freshness::PastHour => "Last 1 hour",
            Freshness::PastDay => "Last 24 hours",
            Freshness::PastWeek => "Last 7 days",
            Freshness::PastMonth => "Last 30 days",
        }
    }

    /// LinkedIn `f_TPR` value.
    pub fn tpr_param(&self) -> &'static str {
        match self {
            Freshness::PastHour => "r3600",
            Freshness::PastDay => "r86400",
            Freshness::PastWeek => "r604800",
            Freshness::PastMonth => "r2592000",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Task context
// ────────────────────────────────────────────────────────────────────────────

/// Everything outside the adapter that goes into a task prompt.
#[derive(Debug, Clone)]
pub struct TaskContext<'a> {
    pub profile: &'a CandidateProfile,
    pub scoring: &'a ScoringConfig,
    /// Most recent application identifiers, oldest first.
    pub applied: &'a [String],
    pub rate_limit: RateLimitStatus,
    pub require_salary_range: bool,
    pub freshness: Freshness,
    pub resume_path: Option<&'a str>,
    /// Command the agent can run for scoring and cover letters.
    pub helper_command: Option<&'a str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A job site the bot can search and apply on.
///
/// Carried in `AppState` as `Arc<dyn Portal>` through the `Portals` registry.
pub trait Portal: Send + Sync {
    fn kind(&self) -> PortalKind;

    fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    fn key(&self) -> &'static str {
        self.kind().key()
    }

    fn base_url(&self) -> &'static str;

    fn login_url(&self) -> &'static str;

    fn credentials(&self) -> &PortalCredentials;

    fn rate_limit_rule(&self) -> RateLimitRule;

    fn search_url(&self, freshness: Freshness) -> String;

    fn search_task(&self, ctx: &TaskContext<'_>) -> String;

    fn apply_task(&self, job_number: u32, total_jobs: u32, ctx: &TaskContext<'_>) -> String;

    /// Portal-specific fields taken from one raw result block.
    fn enrich(&self, _listing: &mut JobListing, _block: &str) {}

    /// Listings reported in `---JOB_FOUND---` blocks.
    fn parse_listings(&self, raw: &str) -> Vec<JobListing> {
        result_parser::parse_reports(raw)
            .into_iter()
            .filter(|report| report.kind == BlockKind::Found)
            .map(|report| {
                let mut listing = report.to_listing(self.key());
                self.enrich(&mut listing, &report.raw_block);
                listing
            })
            .collect()
    }

    /// The application result: the first `---JOB_APPLIED---` block, or the
    /// whole output read as fields when the agent skipped the markers.
    fn parse_application(&self, raw: &str) -> AgentReport {
        let reports = result_parser::parse_reports(raw);
        reports
            .into_iter()
            .find(|report| report.kind == BlockKind::Applied)
            .unwrap_or_else(|| result_parser::parse_fields(BlockKind::Applied, raw))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Portals {
    linkedin: Arc<dyn Portal>,
    workatastartup: Arc<dyn Portal>,
}

impl Portals {
    pub fn from_config(config: &Config) -> Self {
        Self {
            linkedin: Arc::new(LinkedIn::new(config.linkedin.clone())),
            workatastartup: Arc::new(WorkAtAStartup::new(config.workatastartup.clone())),
        }
    }

    pub fn get(&self, kind: PortalKind) -> Arc<dyn Portal> {
        match kind {
            PortalKind::LinkedIn => self.linkedin.clone(),
            PortalKind::WorkAtAStartup => self.workatastartup.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::rate_limit::WindowKind;

    pub fn status(remaining: u32, ceiling: u32, window: WindowKind) -> RateLimitStatus {
        RateLimitStatus {
            window,
            used: ceiling - remaining,
            ceiling,
            remaining,
            can_apply: remaining > 0,
            reset_info: "Resets in 3 day(s)".to_string(),
        }
    }

    pub fn context<'a>(
        profile: &'a CandidateProfile,
        scoring: &'a ScoringConfig,
        applied: &'a [String],
        rate_limit: RateLimitStatus,
    ) -> TaskContext<'a> {
        TaskContext {
            profile,
            scoring,
            applied,
            rate_limit,
            require_salary_range: false,
            freshness: Freshness::default(),
            resume_path: Some("/home/me/resume.pdf"),
            helper_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal_of(url: &str) -> Option<PortalKind> {
        PortalKind::from_url(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_portal_from_url() {
        assert_eq!(
            portal_of("https://www.linkedin.com/jobs/view/123"),
            Some(PortalKind::LinkedIn)
        );
        assert_eq!(
            portal_of("https://WWW.WorkAtAStartup.com/jobs/42"),
            Some(PortalKind::WorkAtAStartup)
        );
        assert_eq!(
            portal_of("https://linkedin.com/jobs/view/7"),
            Some(PortalKind::LinkedIn)
        );
        assert_eq!(portal_of("https://example.com/jobs/1"), None);
    }

    #[test]
    fn test_portal_from_url_ignores_path_and_query() {
        assert_eq!(portal_of("https://evil.example/?next=linkedin.com"), None);
        let nested = "https://jobs.example.com/workatastartup.com/1";
        assert_eq!(portal_of(nested), None);
        assert_eq!(portal_of("https://notlinkedin.com/jobs/1"), None);
    }

    #[test]
    fn test_portal_from_str() {
        let waas: PortalKind = "waas".parse().unwrap();
        assert_eq!(waas, PortalKind::WorkAtAStartup);
        let linkedin: PortalKind = "LinkedIn".parse().unwrap();
        assert_eq!(linkedin, PortalKind::LinkedIn);
        assert!(matches!(
            "indeed".parse::<PortalKind>(),
            Err(AppError::UnknownPortal(p)) if p == "indeed"
        ));
    }

    #[test]
    fn test_freshness_defaults_to_day() {
        assert_eq!(Freshness::default(), Freshness::PastDay);
        assert_eq!(Freshness::default().tpr_param(), "r86400");
        assert_eq!(Freshness::PastMonth.tpr_param(), "r2592000");
    }

    #[test]
    fn test_portal_kind_serializes_as_key() {
        assert_eq!(
            serde_json::to_string(&PortalKind::WorkAtAStartup).unwrap(),
            r#""workatastartup""#
        );
    }
}
