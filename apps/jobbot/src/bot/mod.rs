//! Bot runner: orchestrates search and apply runs across portals.
//!
//! Flow per portal: build task → browser agent → parse result blocks →
//! score + journal (search) or record application (apply).
//!
//! Strictly sequential. The runner owns the tracker; per-job failures become
//! records, only tracking I/O errors abort a run.

pub mod report;

use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::agent::AgentTask;
use crate::errors::AppError;
use crate::models::{ApplicationRecord, ApplicationStatus, JobListing};
use crate::portals::prompts::direct_apply_task;
use crate::portals::{Freshness, Portal, PortalKind, TaskContext};
use crate::rate_limit::RateLimitStatus;
use crate::scoring::JobAnalysis;
use crate::state::AppState;
use crate::tracking::store::APPLIED_PROMPT_LIMIT;
use crate::tracking::Tracker;

/// Pause between portals during a multi-portal search.
const PORTAL_SWITCH_DELAY_SECS: u64 = 5;
/// Characters of the task shown in a dry-run preview.
const DRY_RUN_PREVIEW_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Run options
// ────────────────────────────────────────────────────────────────────────────

/// How many applications each portal gets in a multi-portal run, in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalAllocation(Vec<(PortalKind, u32)>);

impl Default for PortalAllocation {
    fn default() -> Self {
        Self(vec![(PortalKind::LinkedIn, 3), (PortalKind::WorkAtAStartup, 2)])
    }
}

impl PortalAllocation {
    pub fn new(entries: Vec<(PortalKind, u32)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(PortalKind, u32)] {
        &self.0
    }

    pub fn portals(&self) -> Vec<PortalKind> {
        self.0.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    /// Keeps only `selected` portals; an empty selection keeps everything.
    pub fn restricted_to(&self, selected: &[PortalKind]) -> Self {
        if selected.is_empty() {
            return self.clone();
        }
        Self(
            self.0
                .iter()
                .filter(|(kind, _)| selected.contains(kind))
                .copied()
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Empty means every portal in the allocation.
    pub portals: Vec<PortalKind>,
    pub freshness: Freshness,
    pub require_salary_range: bool,
    pub dry_run: bool,
    /// Replaces every selected portal's allocated count.
    pub per_portal_count: Option<u32>,
}

/// A listing after local analysis, and whether it was selected.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredListing {
    pub listing: JobListing,
    pub analysis: JobAnalysis,
    pub selected: bool,
}

impl ScoredListing {
    pub fn score(&self) -> i32 {
        self.listing.score.unwrap_or(self.analysis.score)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

pub struct JobBot {
    state: AppState,
    tracker: Tracker,
}

impl JobBot {
    pub fn new(state: AppState, tracker: Tracker) -> Self {
        Self { state, tracker }
    }

    pub fn open(state: AppState) -> Result<Self, AppError> {
        let tracker = Tracker::open(&state.config.data_dir)?;
        Ok(Self::new(state, tracker))
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn rate_limit_status(&self, kind: PortalKind) -> RateLimitStatus {
        self.tracker.applications.rate_limit_status(
            kind.key(),
            &self.state.rate_limits,
            Self::today(),
        )
    }

    pub fn stats_summary(&self) -> String {
        self.tracker
            .applications
            .stats_summary(&self.state.rate_limits, Self::today())
    }

    /// Totals of the viewed/selected/rejected journals, with rejection reasons.
    pub fn journal_summary(&self) -> String {
        let mut lines = vec!["Job Journals:".to_string()];
        for (label, journal) in [
            ("Viewed", &self.tracker.viewed),
            ("Selected", &self.tracker.selected),
            ("Rejected", &self.tracker.rejected),
        ] {
            lines.push(format!("  - {label}: {}", journal.stats().total));
        }
        for (reason, count) in &self.tracker.rejected.stats().by_reason {
            lines.push(format!("      {reason}: {count}"));
        }
        lines.join("\n")
    }

    fn recent_applied(&self) -> Vec<String> {
        self.tracker
            .applications
            .recent_identifiers(APPLIED_PROMPT_LIMIT)
    }

    fn task_context<'a>(
        &'a self,
        kind: PortalKind,
        applied: &'a [String],
        opts: &RunOptions,
    ) -> TaskContext<'a> {
        let resume_path = self.state.config.resume_path.as_deref();
        TaskContext {
            profile: &self.state.profile,
            scoring: &self.state.scoring,
            applied,
            rate_limit: self.rate_limit_status(kind),
            require_salary_range: opts.require_salary_range,
            freshness: opts.freshness,
            resume_path: resume_path.and_then(|p| p.to_str()),
            helper_command: self.state.helper_command.as_deref(),
        }
    }

    /// Portals and application counts a run with `opts` will use.
    pub fn planned_allocation(&self, opts: &RunOptions) -> PortalAllocation {
        let allocation = self.state.allocation.restricted_to(&opts.portals);
        match opts.per_portal_count {
            Some(count) => {
                let portals = allocation.portals();
                PortalAllocation::new(portals.into_iter().map(|kind| (kind, count)).collect())
            }
            None => allocation,
        }
    }

    // ── Search ───────────────────────────────────────────────────────────────

    /// Searches one portal. Agent failures are logged and yield no listings.
    /// Listings already applied to are journaled as viewed and left out.
    pub async fn search_portal(
        &mut self,
        kind: PortalKind,
        opts: &RunOptions,
    ) -> Result<Vec<ScoredListing>, AppError> {
        let portal = self.state.portals.get(kind);
        let applied = self.recent_applied();
        let task = portal.search_task(&self.task_context(kind, &applied, opts));

        if opts.dry_run {
            println!("\n[DRY RUN] Would search {}", portal.name());
            println!("[DRY RUN] Task preview:\n{}...", preview(&task));
            return Ok(Vec::new());
        }

        info!("[{}] Searching for jobs...", portal.name());
        let raw = match self.state.agent.run(&AgentTask::new(kind, task)).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("[{}] Error during search: {}", portal.name(), e);
                return Ok(Vec::new());
            }
        };

        let mut results = Vec::new();
        for listing in portal.parse_listings(&raw) {
            if self.tracker.applications.is_already_applied(
                &listing.company,
                &listing.title,
                &listing.portal,
            ) {
                debug!(
                    "[{}] Already applied: {}",
                    portal.name(),
                    listing.identifier()
                );
                self.tracker.viewed.record(&listing, None)?;
                continue;
            }
            let scored = self.classify(listing);
            self.journal(&scored)?;
            results.push(scored);
        }

        info!("[{}] Found {} jobs", portal.name(), results.len());
        Ok(results)
    }

    /// Searches every selected portal in allocation order.
    pub async fn search_all(&mut self, opts: &RunOptions) -> Result<Vec<ScoredListing>, AppError> {
        let portals = self.planned_allocation(opts).portals();
        let mut all = Vec::new();

        for (i, kind) in portals.iter().enumerate() {
            all.extend(self.search_portal(*kind, opts).await?);

            if i + 1 < portals.len() && !opts.dry_run {
                info!("Waiting {PORTAL_SWITCH_DELAY_SECS} seconds before next portal...");
                tokio::time::sleep(Duration::from_secs(PORTAL_SWITCH_DELAY_SECS)).await;
            }
        }
        Ok(all)
    }

    /// Scores a listing locally. Search results are sometimes too thin to
    /// match anything; only then does the score the agent reported count.
    fn classify(&self, mut listing: JobListing) -> ScoredListing {
        let analysis = self.state.scorer.analyze(&listing);
        let reported = listing.score.filter(|_| analysis.matched_nothing());
        let score = reported.unwrap_or(analysis.score);
        listing.score = Some(score);
        let selected = analysis.should_apply()
            || (!analysis.is_blacklisted && reported.is_some() && score >= analysis.threshold);
        ScoredListing {
            listing,
            analysis,
            selected,
        }
    }

    fn journal(&mut self, scored: &ScoredListing) -> Result<(), AppError> {
        self.tracker.viewed.record(&scored.listing, None)?;
        if scored.selected {
            self.tracker.selected.record(&scored.listing, None)?;
        } else {
            self.tracker
                .rejected
                .record(&scored.listing, Some(&scored.analysis))?;
        }
        Ok(())
    }

    // ── Apply ────────────────────────────────────────────────────────────────

    /// One application attempt. Quota-skipped and dry-run attempts are returned
    /// but not persisted; everything the agent ran is.
    pub async fn apply_on_portal(
        &mut self,
        kind: PortalKind,
        job_number: u32,
        total_jobs: u32,
        opts: &RunOptions,
    ) -> Result<ApplicationRecord, AppError> {
        let portal = self.state.portals.get(kind);
        let status = self.rate_limit_status(kind);

        if !status.can_apply {
            warn!(
                "[{}] Rate limit reached: {}/{} ({})",
                portal.name(),
                status.used,
                status.ceiling,
                status.reset_info
            );
            return Ok(ApplicationRecord::skipped(kind.key(), "rate_limit_reached"));
        }

        let applied = self.recent_applied();
        let task = portal.apply_task(
            job_number,
            total_jobs,
            &self.task_context(kind, &applied, opts),
        );

        if opts.dry_run {
            println!(
                "\n[DRY RUN] Would apply to job {job_number}/{total_jobs} on {}",
                portal.name()
            );
            println!(
                "[DRY RUN] Rate limit: {}/{} remaining",
                status.remaining, status.ceiling
            );
            return Ok(ApplicationRecord::new(kind.key(), ApplicationStatus::DryRun));
        }

        info!(
            "[{}] Applying to job {}/{} ({}/{} remaining)",
            portal.name(),
            job_number,
            total_jobs,
            status.remaining,
            status.ceiling
        );
        let record = self.run_application(portal.as_ref(), task, None).await;
        self.persist(record)
    }

    /// Applies across the allocation, pausing between attempts by each
    /// portal's delay. Dry runs do not pause.
    pub async fn apply_all(
        &mut self,
        opts: &RunOptions,
    ) -> Result<Vec<ApplicationRecord>, AppError> {
        let allocation = self.planned_allocation(opts);
        let total = allocation.total();
        let mut results = Vec::new();
        let mut attempted = 0;

        for &(kind, count) in allocation.entries() {
            if count == 0 {
                continue;
            }
            info!("Starting {} ({} jobs)", kind.display_name(), count);
            let delay = self.state.rate_limits.rule_for(kind.key()).delay_secs;

            for job_number in 1..=count {
                attempted += 1;
                let record = self.apply_on_portal(kind, job_number, count, opts).await?;
                let ran_agent = !matches!(
                    record.status,
                    ApplicationStatus::Skipped | ApplicationStatus::DryRun
                );
                results.push(record);

                if attempted < total && ran_agent {
                    info!("Waiting {delay} seconds before next application...");
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
            }
        }
        Ok(results)
    }

    /// Applies to one job the user picked by URL. The agent is told not to score it.
    pub async fn apply_to_url(
        &mut self,
        job_url: &str,
        dry_run: bool,
    ) -> Result<ApplicationRecord, AppError> {
        let parsed = Url::parse(job_url.trim())
            .map_err(|e| AppError::Validation(format!("invalid job URL '{job_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "job URL must start with http:// or https://: {job_url}"
            )));
        }
        let job_url = parsed.as_str();
        let kind = PortalKind::from_url(&parsed)
            .ok_or_else(|| AppError::UnknownPortal(job_url.to_string()))?;
        let portal = self.state.portals.get(kind);
        let status = self.rate_limit_status(kind);

        if !status.can_apply {
            warn!(
                "Rate limit reached for {}: {}/{} ({})",
                portal.name(),
                status.used,
                status.ceiling,
                status.reset_info
            );
            let mut record = ApplicationRecord::skipped(kind.key(), "rate_limit_reached");
            record.url = job_url.to_string();
            return Ok(record);
        }

        if dry_run {
            println!("[DRY RUN] Would apply to {job_url} on {}", portal.name());
            println!(
                "[DRY RUN] Rate limit: {}/{} remaining",
                status.remaining, status.ceiling
            );
            let mut record = ApplicationRecord::new(kind.key(), ApplicationStatus::DryRun);
            record.url = job_url.to_string();
            return Ok(record);
        }

        let applied = self.recent_applied();
        let task = direct_apply_task(
            kind,
            job_url,
            portal.credentials(),
            &self.task_context(kind, &applied, &RunOptions::default()),
        );

        info!("Applying to {} on {}", job_url, portal.name());
        let record = self
            .run_application(portal.as_ref(), task, Some(job_url))
            .await;
        self.persist(record)
    }

    async fn run_application(
        &self,
        portal: &dyn Portal,
        task: String,
        job_url: Option<&str>,
    ) -> ApplicationRecord {
        let kind = portal.kind();
        match self.state.agent.run(&AgentTask::new(kind, task)).await {
            Ok(raw) => {
                let mut record = portal.parse_application(&raw).to_record(kind.key());
                if let (true, Some(url)) = (record.url.is_empty(), job_url) {
                    record.url = url.to_string();
                }
                record.with_raw_result(&raw)
            }
            Err(e) => {
                error!("[{}] Error: {}", portal.name(), e);
                ApplicationRecord::failure(kind.key(), job_url.unwrap_or_default(), e.to_string())
            }
        }
    }

    fn persist(&mut self, record: ApplicationRecord) -> Result<ApplicationRecord, AppError> {
        self.tracker.applications.append(
            record.clone(),
            &self.state.rate_limits,
            Self::today(),
        )?;
        info!(
            "[{}] {} - Status: {}",
            record.portal,
            record.display_company(),
            record.status.as_str()
        );
        Ok(record)
    }
}

fn preview(task: &str) -> String {
    task.trim().chars().take(DRY_RUN_PREVIEW_CHARS).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::agent::{AgentError, BrowserAgent};
    use crate::config::{Config, PortalCredentials};
    use crate::cover_letter::CoverLetterGenerator;
    use crate::portals::Portals;
    use crate::profile::CandidateProfile;
    use crate::rate_limit::RateLimitPolicy;
    use crate::scoring::{KeywordScorer, ScoringConfig};

    /// Replays queued results and remembers every task it was given.
    #[derive(Default)]
    pub struct ScriptedAgent {
        replies: Mutex<VecDeque<Result<String, AgentError>>>,
        pub tasks: Mutex<Vec<AgentTask>>,
    }

    impl ScriptedAgent {
        pub fn with_replies(replies: Vec<Result<String, AgentError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                tasks: Mutex::new(Vec::new()),
            })
        }

        pub fn prompts(&self) -> Vec<String> {
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.prompt.clone())
                .collect()
        }
    }

    #[async_trait]
    impl BrowserAgent for ScriptedAgent {
        async fn run(&self, task: &AgentTask) -> Result<String, AgentError> {
            self.tasks.lock().unwrap().push(task.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AgentError::EmptyResult))
        }
    }

    pub fn config(data_dir: &Path) -> Config {
        Config {
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            data_dir: data_dir.to_path_buf(),
            session_dir: data_dir.join("sessions"),
            resume_path: None,
            profile_path: None,
            min_score: None,
            require_salary_range: false,
            browser_agent_cmd: None,
            agent_timeout_secs: 60,
            linkedin: PortalCredentials::default(),
            workatastartup: PortalCredentials::default(),
        }
    }

    pub fn state(
        data_dir: &Path,
        agent: Arc<dyn BrowserAgent>,
        policy: RateLimitPolicy,
    ) -> AppState {
        let config = config(data_dir);
        let profile = Arc::new(CandidateProfile::default());
        let scoring = Arc::new(ScoringConfig::default());
        AppState {
            portals: Portals::from_config(&config),
            config,
            profile: profile.clone(),
            scoring: scoring.clone(),
            scorer: Arc::new(KeywordScorer::new(scoring)),
            rate_limits: policy,
            cover_letters: Arc::new(CoverLetterGenerator::templates_only(profile)),
            agent,
            allocation: PortalAllocation::default(),
            helper_command: None,
        }
    }

    pub fn bot(data_dir: &Path, agent: Arc<dyn BrowserAgent>, policy: RateLimitPolicy) -> JobBot {
        JobBot::open(state(data_dir, agent, policy)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{bot, ScriptedAgent};
    use super::*;
    use crate::agent::AgentError;
    use crate::rate_limit::{RateLimitPolicy, RateLimitRule};
    use crate::scoring::RejectionReason;

    const SEARCH_RESULT: &str = "---JOB_FOUND---
Company: Acme
Title: Senior Backend Engineer
URL: https://www.linkedin.com/jobs/view/1
TechStack: Node.js, TypeScript, AWS, microservices
Remote: remote
Experience: senior
---END---
---JOB_FOUND---
Company: Beta
Title: Engineering Manager
TechStack: people management
---END---";

    const APPLY_RESULT: &str = "Applied.
---JOB_APPLIED---
Company: Acme
Title: Senior Backend Engineer
URL: https://www.linkedin.com/jobs/view/1
Score: 61/100
Status: success
CoverLetterUsed: true
ResumeUploaded: true
---END---";

    fn generous() -> RateLimitPolicy {
        RateLimitPolicy::new()
            .with_rule("linkedin", RateLimitRule::daily(10, 10))
            .with_rule("workatastartup", RateLimitRule::weekly(10, 5))
    }

    #[test]
    fn test_allocation_restriction() {
        let allocation = PortalAllocation::default();
        assert_eq!(allocation.total(), 5);
        let only_waas = allocation.restricted_to(&[PortalKind::WorkAtAStartup]);
        assert_eq!(only_waas.entries(), &[(PortalKind::WorkAtAStartup, 2)]);
        assert_eq!(allocation.restricted_to(&[]), allocation);
    }

    #[tokio::test]
    async fn test_search_journals_selected_and_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![Ok(SEARCH_RESULT.to_string())]);
        let mut bot = bot(dir.path(), agent.clone(), generous());

        let results = bot
            .search_portal(PortalKind::LinkedIn, &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].selected);
        assert!(!results[1].selected);
        assert_eq!(
            results[1].analysis.rejection_reason,
            RejectionReason::NegativeKeywords
        );

        let tracker = bot.tracker();
        assert_eq!(tracker.viewed.len(), 2);
        assert_eq!(tracker.selected.len(), 1);
        assert_eq!(tracker.rejected.len(), 1);
        assert_eq!(tracker.rejected.entries()[0].listing.company, "Beta");
        assert!(agent.prompts()[0].contains("TASK: Search and list matching jobs on LinkedIn"));
    }

    #[tokio::test]
    async fn test_search_leaves_out_applied_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![
            Ok(APPLY_RESULT.to_string()),
            Ok(SEARCH_RESULT.to_string()),
        ]);
        let mut bot = bot(dir.path(), agent, generous());
        bot.apply_on_portal(PortalKind::LinkedIn, 1, 1, &RunOptions::default())
            .await
            .unwrap();

        let results = bot
            .search_portal(PortalKind::LinkedIn, &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].listing.company, "Beta");
        assert_eq!(bot.tracker().viewed.len(), 2);
        assert!(bot.tracker().selected.is_empty());

        let summary = bot.journal_summary();
        assert!(summary.contains("Viewed: 2"));
        assert!(summary.contains("negative_keywords: 1"));
    }

    #[tokio::test]
    async fn test_search_agent_failure_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![Err(AgentError::NotConfigured)]);
        let mut bot = bot(dir.path(), agent, generous());
        let results = bot
            .search_portal(PortalKind::WorkAtAStartup, &RunOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(bot.tracker().viewed.is_empty());
    }

    #[tokio::test]
    async fn test_negative_keywords_are_not_rescued_by_reported_score() {
        let dir = tempfile::tempdir().unwrap();
        let reply = "---JOB_FOUND---
Company: Acme
Title: Senior Backend Engineering Manager
TechStack: node, typescript, aws, graphql
Score: 80
---END---";
        let agent = ScriptedAgent::with_replies(vec![Ok(reply.to_string())]);
        let mut bot = bot(dir.path(), agent, generous());

        let results = bot
            .search_portal(PortalKind::LinkedIn, &RunOptions::default())
            .await
            .unwrap();

        let scored = &results[0];
        assert_eq!(scored.analysis.score, 0);
        assert_eq!(
            scored.analysis.rejection_reason,
            RejectionReason::NegativeKeywords
        );
        assert_eq!(scored.score(), 0);
        assert!(!scored.selected);
        assert!(bot.tracker().selected.is_empty());
        assert_eq!(bot.tracker().rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_listing_uses_reported_score() {
        let dir = tempfile::tempdir().unwrap();
        let reply = "---JOB_FOUND---
Company: Zeta
Title: Founding Engineer
Score: 75
---END---";
        let agent = ScriptedAgent::with_replies(vec![Ok(reply.to_string())]);
        let mut bot = bot(dir.path(), agent, generous());

        let results = bot
            .search_portal(PortalKind::WorkAtAStartup, &RunOptions::default())
            .await
            .unwrap();

        assert!(results[0].analysis.matched_nothing());
        assert_eq!(results[0].score(), 75);
        assert!(results[0].selected);
        assert_eq!(bot.tracker().selected.len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_search_never_calls_agent() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![]);
        let mut bot = bot(dir.path(), agent.clone(), generous());
        let opts = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        assert!(bot.search_all(&opts).await.unwrap().is_empty());
        assert!(agent.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_successful_application_is_persisted_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![Ok(APPLY_RESULT.to_string())]);
        let mut bot = bot(dir.path(), agent, generous());

        let record = bot
            .apply_on_portal(PortalKind::LinkedIn, 1, 1, &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(record.status, ApplicationStatus::Success);
        assert_eq!(record.score, Some(61));
        assert!(record.cover_letter_used);
        let raw = record.raw_result.as_deref().unwrap();
        assert!(raw.starts_with("Applied."));
        assert_eq!(bot.tracker().applications.records().len(), 1);
        assert_eq!(bot.rate_limit_status(PortalKind::LinkedIn).used, 1);
    }

    #[tokio::test]
    async fn test_agent_failure_becomes_failed_record() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![Err(AgentError::Timeout(60))]);
        let mut bot = bot(dir.path(), agent, generous());

        let record = bot
            .apply_on_portal(PortalKind::WorkAtAStartup, 1, 2, &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(record.status, ApplicationStatus::Failed);
        assert_eq!(
            record.error.as_deref(),
            Some("browser agent timed out after 60s")
        );
        assert_eq!(bot.tracker().applications.records().len(), 1);
        assert_eq!(bot.rate_limit_status(PortalKind::WorkAtAStartup).used, 0);
    }

    #[tokio::test]
    async fn test_exhausted_quota_skips_without_agent() {
        let dir = tempfile::tempdir().unwrap();
        let policy = RateLimitPolicy::new().with_rule("linkedin", RateLimitRule::daily(1, 0));
        let agent = ScriptedAgent::with_replies(vec![Ok(APPLY_RESULT.to_string())]);
        let mut bot = bot(dir.path(), agent.clone(), policy);

        bot.apply_on_portal(PortalKind::LinkedIn, 1, 2, &RunOptions::default())
            .await
            .unwrap();
        let second = bot
            .apply_on_portal(PortalKind::LinkedIn, 2, 2, &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(second.status, ApplicationStatus::Skipped);
        assert_eq!(second.reason.as_deref(), Some("rate_limit_reached"));
        assert_eq!(agent.prompts().len(), 1);
        assert_eq!(bot.tracker().applications.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_all_follows_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let replies = (0..5).map(|_| Ok(APPLY_RESULT.to_string())).collect();
        let agent = ScriptedAgent::with_replies(replies);
        let mut bot = bot(dir.path(), agent.clone(), generous());

        let results = bot.apply_all(&RunOptions::default()).await.unwrap();

        assert_eq!(results.len(), 5);
        let tasks = agent.tasks.lock().unwrap();
        let portals: Vec<PortalKind> = tasks.iter().map(|t| t.portal).collect();
        assert_eq!(
            portals,
            vec![
                PortalKind::LinkedIn,
                PortalKind::LinkedIn,
                PortalKind::LinkedIn,
                PortalKind::WorkAtAStartup,
                PortalKind::WorkAtAStartup,
            ]
        );
        assert!(tasks[2].prompt.contains("TASK: Apply to job 3 of 3 on LinkedIn"));
    }

    #[test]
    fn test_count_override_applies_to_selected_portals() {
        let dir = tempfile::tempdir().unwrap();
        let bot = bot(dir.path(), ScriptedAgent::with_replies(vec![]), generous());
        let opts = RunOptions {
            portals: vec![PortalKind::LinkedIn],
            per_portal_count: Some(4),
            ..RunOptions::default()
        };
        assert_eq!(
            bot.planned_allocation(&opts).entries(),
            &[(PortalKind::LinkedIn, 4)]
        );
    }

    #[tokio::test]
    async fn test_dry_run_apply_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ScriptedAgent::with_replies(vec![]);
        let mut bot = bot(dir.path(), agent.clone(), generous());
        let opts = RunOptions {
            portals: vec![PortalKind::WorkAtAStartup],
            dry_run: true,
            ..RunOptions::default()
        };

        let results = bot.apply_all(&opts).await.unwrap();

        assert_eq!(results.len(), 2);
        let statuses: Vec<ApplicationStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![ApplicationStatus::DryRun; 2]);
        assert!(agent.prompts().is_empty());
        assert!(bot.tracker().applications.records().is_empty());
    }

    #[tokio::test]
    async fn test_apply_to_url_uses_direct_task() {
        let dir = tempfile::tempdir().unwrap();
        let reply = "---JOB_APPLIED---
Company: Acme
Title: SRE
Score: N/A
Status: success
---END---";
        let agent = ScriptedAgent::with_replies(vec![Ok(reply.to_string())]);
        let mut bot = bot(dir.path(), agent.clone(), generous());

        let record = bot
            .apply_to_url("https://www.workatastartup.com/jobs/78968", false)
            .await
            .unwrap();

        assert_eq!(record.portal, "workatastartup");
        assert_eq!(record.url, "https://www.workatastartup.com/jobs/78968");
        assert_eq!(record.score, None);
        let prompt = &agent.prompts()[0];
        assert!(prompt.contains("Do NOT score"));
        assert!(prompt.contains("JOB URL: https://www.workatastartup.com/jobs/78968"));
    }

    #[tokio::test]
    async fn test_apply_to_url_rejects_unknown_portal() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = bot(dir.path(), ScriptedAgent::with_replies(vec![]), generous());
        let err = bot
            .apply_to_url("https://jobs.example.com/1", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownPortal(_)));

        let err = bot
            .apply_to_url("https://evil.example/?next=linkedin.com", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownPortal(_)));

        let err = bot.apply_to_url("not a url", false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
