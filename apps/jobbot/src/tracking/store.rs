use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ApplicationRecord, ApplicationStatus};
use crate::rate_limit::{RateLimitLedger, RateLimitPolicy, RateLimitStatus};
use crate::tracking::{read_json, write_json_atomic, TrackingError};

/// How many recent identifiers go into agent tasks as "already applied".
pub const APPLIED_PROMPT_LIMIT: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    #[serde(default)]
    pub total_applied: u64,
    #[serde(default)]
    pub by_portal: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_status: StatusCounts,
    #[serde(default)]
    pub avg_score: f64,
}

impl ApplicationStats {
    fn count(&mut self, record: &ApplicationRecord) {
        *self.by_portal.entry(record.portal.clone()).or_insert(0) += 1;
        match record.status {
            ApplicationStatus::Success => self.by_status.success += 1,
            ApplicationStatus::Failed => self.by_status.failed += 1,
            _ => {}
        }
    }

    /// Rebuilds per-portal and per-status counts from scratch.
    fn from_records(records: &[ApplicationRecord], total_applied: u64) -> Self {
        let mut stats = Self {
            total_applied,
            ..Self::default()
        };
        for record in records {
            stats.count(record);
        }
        stats.avg_score = average_score(records);
        stats
    }
}

/// Mean of non-zero scores, rounded to one decimal. Zero when nothing is scored.
fn average_score(records: &[ApplicationRecord]) -> f64 {
    let scores: Vec<i32> = records
        .iter()
        .filter_map(|r| r.score)
        .filter(|s| *s != 0)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TrackingFile {
    jobs: Vec<ApplicationRecord>,
    stats: ApplicationStats,
    rate_limits: RateLimitLedger,
}

/// On-disk shape accepted when loading, including the pre-`stats` layout
/// that kept `total_applied` at the root.
#[derive(Debug, Deserialize)]
struct RawTrackingFile {
    #[serde(default)]
    jobs: Vec<ApplicationRecord>,
    #[serde(default)]
    stats: Option<ApplicationStats>,
    #[serde(default)]
    total_applied: Option<u64>,
    #[serde(default)]
    rate_limits: RateLimitLedger,
}

impl From<RawTrackingFile> for TrackingFile {
    fn from(raw: RawTrackingFile) -> Self {
        let stats = match raw.stats {
            Some(stats) => stats,
            None => {
                let total = raw.total_applied.unwrap_or(raw.jobs.len() as u64);
                ApplicationStats::from_records(&raw.jobs, total)
            }
        };
        Self {
            jobs: raw.jobs,
            stats,
            rate_limits: raw.rate_limits,
        }
    }
}

/// The application log: append-only records, aggregate stats, quota counters.
pub struct ApplicationStore {
    path: PathBuf,
    data: TrackingFile,
}

impl ApplicationStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TrackingError> {
        let path = path.into();
        let data = read_json::<RawTrackingFile>(&path)?
            .map(TrackingFile::from)
            .unwrap_or_default();
        debug!(
            "Loaded {} application records from {}",
            data.jobs.len(),
            path.display()
        );
        Ok(Self { path, data })
    }

    #[cfg(test)]
    pub fn records(&self) -> &[ApplicationRecord] {
        &self.data.jobs
    }

    pub fn stats(&self) -> &ApplicationStats {
        &self.data.stats
    }

    #[cfg(test)]
    pub fn rate_limits(&self) -> &RateLimitLedger {
        &self.data.rate_limits
    }

    /// Appends `record`, refreshes stats, counts successes against the portal's
    /// quota, and rewrites the file.
    pub fn append(
        &mut self,
        record: ApplicationRecord,
        policy: &RateLimitPolicy,
        today: NaiveDate,
    ) -> Result<(), TrackingError> {
        if record.status == ApplicationStatus::Success {
            let rule = policy.rule_for(&record.portal);
            if let Err(exhausted) = self.data.rate_limits.record(&record.portal, rule, today) {
                warn!("Application recorded past quota: {exhausted}");
            }
        }

        self.data.stats.count(&record);
        self.data.jobs.push(record);
        self.data.stats.total_applied = self.data.jobs.len() as u64;
        self.data.stats.avg_score = average_score(&self.data.jobs);

        self.save()
    }

    pub fn rate_limit_status(
        &self,
        portal: &str,
        policy: &RateLimitPolicy,
        today: NaiveDate,
    ) -> RateLimitStatus {
        self.data
            .rate_limits
            .status(portal, policy.rule_for(portal), today)
    }

    /// The most recent identifiers, oldest first.
    pub fn recent_identifiers(&self, limit: usize) -> Vec<String> {
        let skip = self.data.jobs.len().saturating_sub(limit);
        self.data.jobs[skip..].iter().map(|r| r.identifier()).collect()
    }

    pub fn is_already_applied(&self, company: &str, title: &str, portal: &str) -> bool {
        let id = crate::models::job::job_identifier(company, title, portal);
        self.data.jobs.iter().any(|r| r.identifier() == id)
    }

    /// Totals, success rate, average score and per-portal remaining quota.
    pub fn stats_summary(&self, policy: &RateLimitPolicy, today: NaiveDate) -> String {
        let stats = self.stats();
        let mut lines = vec![
            format!("Total Applied: {}", stats.total_applied),
            format!(
                "Success Rate: {}/{}",
                stats.by_status.success, stats.total_applied
            ),
            format!("Average Score: {}", stats.avg_score),
            String::new(),
            "By Portal:".to_string(),
        ];
        for (portal, count) in &stats.by_portal {
            let status = self.rate_limit_status(portal, policy, today);
            lines.push(format!(
                "  - {portal}: {count} total, {}/{} remaining ({})",
                status.remaining, status.ceiling, status.reset_info
            ));
        }
        lines.join("\n")
    }

    fn save(&self) -> Result<(), TrackingError> {
        write_json_atomic(&self.path, &self.data)
    }
}
