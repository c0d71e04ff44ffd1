use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::JobListing;
use crate::scoring::{JobAnalysis, RejectionReason};
use crate::tracking::{read_json, write_json_atomic, TrackingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalKind {
    Viewed,
    Selected,
    Rejected,
}

impl JournalKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            JournalKind::Viewed => "viewed_jobs.json",
            JournalKind::Selected => "selected_jobs.json",
            JournalKind::Rejected => "rejected_jobs.json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: JobListing,
    #[serde(default = "now_local")]
    pub recorded_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_bonus: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_negative: Vec<String>,
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_portal: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_reason: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct JournalFile {
    #[serde(default)]
    jobs: Vec<JournalEntry>,
    #[serde(default)]
    stats: JournalStats,
}

/// Deduplicated log of listings seen during searches.
pub struct JobJournal {
    kind: JournalKind,
    path: PathBuf,
    data: JournalFile,
}

impl JobJournal {
    pub fn open(kind: JournalKind, data_dir: &Path) -> Result<Self, TrackingError> {
        let path = data_dir.join(kind.file_name());
        let mut data: JournalFile = read_json(&path)?.unwrap_or_default();
        if data.stats.total == 0 && !data.jobs.is_empty() {
            data.stats.total = data.jobs.len() as u64;
        }
        Ok(Self { kind, path, data })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.jobs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.data.jobs.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.data.jobs
    }

    pub fn stats(&self) -> &JournalStats {
        &self.data.stats
    }

    pub fn contains(&self, listing: &JobListing) -> bool {
        let id = listing.identifier();
        self.data.jobs.iter().any(|e| e.listing.identifier() == id)
    }

    /// Records `listing` unless an entry with the same identifier exists.
    /// Returns whether anything was written. `analysis` is kept for rejected
    /// listings so the reason and matched keywords can be reviewed later.
    pub fn record(
        &mut self,
        listing: &JobListing,
        analysis: Option<&JobAnalysis>,
    ) -> Result<bool, TrackingError> {
        if self.contains(listing) {
            return Ok(false);
        }

        let mut entry = JournalEntry {
            id: Uuid::new_v4(),
            listing: listing.clone(),
            recorded_at: now_local(),
            rejection_reason: None,
            matched_required: Vec::new(),
            matched_bonus: Vec::new(),
            matched_negative: Vec::new(),
        };
        if let (JournalKind::Rejected, Some(analysis)) = (self.kind, analysis) {
            entry.rejection_reason = Some(analysis.rejection_reason);
            entry.matched_required = analysis.matched_required.clone();
            entry.matched_bonus = analysis.matched_bonus.clone();
            entry.matched_negative = analysis.matched_negative.clone();
            *self
                .data
                .stats
                .by_reason
                .entry(analysis.rejection_reason.to_string())
                .or_insert(0) += 1;
        }

        *self
            .data
            .stats
            .by_portal
            .entry(listing.portal.clone())
            .or_insert(0) += 1;
        self.data.jobs.push(entry);
        self.data.stats.total = self.data.jobs.len() as u64;

        write_json_atomic(&self.path, &self.data)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(company: &str) -> JobListing {
        let mut job = JobListing::new("linkedin", company, "Backend Engineer");
        job.score = Some(12);
        job
    }

    fn rejected_analysis() -> JobAnalysis {
        JobAnalysis {
            score: -42,
            threshold: 30,
            matched_required: vec!["backend".to_string()],
            matched_bonus: vec![],
            matched_negative: vec!["manager".to_string()],
            experience_matched: false,
            remote: false,
            is_blacklisted: false,
            rejection_reason: RejectionReason::NegativeKeywords,
        }
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = JobJournal::open(JournalKind::Viewed, dir.path()).unwrap();
        assert!(journal.record(&listing("Acme"), None).unwrap());
        assert!(!journal.record(&listing("Acme"), None).unwrap());
        assert!(journal.record(&listing("Beta"), None).unwrap());
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.stats().by_portal.get("linkedin"), Some(&2));
    }

    #[test]
    fn test_rejected_entries_keep_reason_and_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = JobJournal::open(JournalKind::Rejected, dir.path()).unwrap();
        let analysis = rejected_analysis();
        journal.record(&listing("Acme"), Some(&analysis)).unwrap();

        let reopened = JobJournal::open(JournalKind::Rejected, dir.path()).unwrap();
        let entry = &reopened.entries()[0];
        assert_eq!(
            entry.rejection_reason,
            Some(RejectionReason::NegativeKeywords)
        );
        assert_eq!(entry.matched_negative, vec!["manager".to_string()]);
        assert_eq!(entry.listing.company, "Acme");
        let stats = reopened.stats();
        assert_eq!(stats.by_reason.get("negative_keywords"), Some(&1));
    }

    #[test]
    fn test_selected_entries_ignore_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = JobJournal::open(JournalKind::Selected, dir.path()).unwrap();
        let analysis = rejected_analysis();
        journal.record(&listing("Acme"), Some(&analysis)).unwrap();
        assert!(journal.entries()[0].rejection_reason.is_none());
        assert!(journal.stats().by_reason.is_empty());
        assert!(dir.path().join("selected_jobs.json").exists());
    }
}
