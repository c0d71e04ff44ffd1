use std::sync::OnceLock;

use regex::Regex;

use crate::config::PortalCredentials;
use crate::models::JobListing;
use crate::portals::prompts::{
    apply_result_format, login_instructions, resume_line, salary_only, search_result_format,
    task_preamble, MAX_LISTINGS_PER_SEARCH,
};
use crate::portals::{Freshness, Portal, PortalKind, TaskContext};
use crate::rate_limit::{RateLimitRule, RateLimitStatus, WORKATASTARTUP_RULE};

const BASE_URL: &str = "https://www.workatastartup.com/";
const LOGIN_URL: &str = "https://www.workatastartup.com/users/sign_in";
const ROLE_FILTERS: &str = "Backend Engineer, Software Engineer, Platform Engineer, \
    AI Developer, AI Engineer, LLM Engineer";
/// Warn the agent once this few applications are left in the week.
const LOW_QUOTA_WARNING_AT: u32 = 2;

fn yc_batch_regex() -> &'static Regex {
    static YC_BATCH: OnceLock<Regex> = OnceLock::new();
    YC_BATCH.get_or_init(|| Regex::new(r"\(([WS]\d{2})\)").expect("YC batch pattern is valid"))
}

/// YC cohort like `W23` from text such as `Acme (W23)`.
pub fn extract_yc_batch(text: &str) -> Option<String> {
    yc_batch_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn weekly_limit_warning(status: &RateLimitStatus) -> String {
    if status.remaining > LOW_QUOTA_WARNING_AT {
        return String::new();
    }
    format!(
        "
WEEKLY LIMIT WARNING:
- Used: {}/{} applications
- Remaining: {}
- {}
- Apply carefully - you have limited applications left!",
        status.used, status.ceiling, status.remaining, status.reset_info
    )
}

pub struct WorkAtAStartup {
    credentials: PortalCredentials,
}

impl WorkAtAStartup {
    pub fn new(credentials: PortalCredentials) -> Self {
        Self { credentials }
    }

    fn ui_filter_steps() -> String {
        format!(
            "   - Click on filter options
   - Select \"Remote only\" if available
   - Filter by company stage: Seed, Series A, Series B
   - Filter by roles: {ROLE_FILTERS}"
        )
    }
}

impl Portal for WorkAtAStartup {
    fn kind(&self) -> PortalKind {
        PortalKind::WorkAtAStartup
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn login_url(&self) -> &'static str {
        LOGIN_URL
    }

    fn credentials(&self) -> &PortalCredentials {
        &self.credentials
    }

    fn rate_limit_rule(&self) -> RateLimitRule {
        WORKATASTARTUP_RULE
    }

    /// Filtering happens in the site's UI, so every search starts at the base URL.
    fn search_url(&self, _freshness: Freshness) -> String {
        BASE_URL.to_string()
    }

    fn search_task(&self, ctx: &TaskContext<'_>) -> String {
        let salary_check = if ctx.require_salary_range {
            "\n   - CHECK: Verify salary range is visible before proceeding"
        } else {
            ""
        };
        format!(
            "
TASK: Search and list matching jobs on {name}

{preamble}

STEPS:

1. Navigate to {url}{login}

2. Apply filters using the UI:
{filters}
   - PRIORITIZE roles mentioning: LangChain, agentic workflows, automated workflows with LLMs

3. For each job found (up to {max} jobs):
   - Click to view full details{salary_check}
   - Score the job against the criteria
   - Extract job information
{format}

WORKATASTARTUP-SPECIFIC NOTES:
- All companies are YC-backed startups
- Include the batch next to the company name when shown, e.g. \"Acme (W23)\"
- Check the funding stage (Seed, Series A, B)
- Some jobs show \"Quick Apply\" - prefer these
{warning}

IMPORTANT:
- Only list jobs scoring >= {min_score}
{salary_only}
- List up to {max} matching jobs
- Skip jobs already in the applied list
",
            name = self.name(),
            preamble = task_preamble(ctx, "DO NOT LIST THESE"),
            url = self.base_url(),
            login = login_instructions(&self.credentials, self.login_url()),
            filters = Self::ui_filter_steps(),
            max = MAX_LISTINGS_PER_SEARCH,
            format = search_result_format(self.kind()),
            warning = weekly_limit_warning(&ctx.rate_limit),
            min_score = ctx.scoring.min_score,
            salary_only = salary_only(ctx.require_salary_range, "list"),
        )
    }

    fn apply_task(&self, job_number: u32, total_jobs: u32, ctx: &TaskContext<'_>) -> String {
        let status = &ctx.rate_limit;
        if !status.can_apply {
            return format!(
                "
TASK ABORTED: Weekly application limit reached on {}

You have used all {} applications for this week.
{}

Please try again after the limit resets.
",
                self.name(),
                status.ceiling,
                status.reset_info
            );
        }

        let salary_check = if ctx.require_salary_range {
            "\n   - ONLY apply to jobs with a visible salary range"
        } else {
            ""
        };
        format!(
            "
TASK: Apply to job {job_number} of {total_jobs} on {name}

{preamble}
{warning}

STEPS:

1. Navigate to {url}{login}

2. Apply filters using the UI:
{filters}

3. Find and evaluate a job:
   - Score the job against the criteria
   - Only apply if score >= {min_score}{salary_check}
   - Skip blacklisted companies and already-applied jobs

4. Apply to the selected job:
   - Click on the job to view details
   - Click \"Apply\" or \"Quick Apply\"
   - Generate a cover letter if one is needed
   - {resume}
   - Fill all required fields using the candidate profile
   - Submit the application
{format}

WORKATASTARTUP-SPECIFIC NOTES:
- Weekly limit: {remaining}/{ceiling} applications remaining
- {reset_info}
- Cover letters are often required
- Some companies ask custom questions
- Apply to the best match first

IMPORTANT:
- Score every job before applying
- If an application fails, try the next matching job
{salary_only}
- If you see \"Application limit reached\", report it immediately
",
            name = self.name(),
            preamble = task_preamble(ctx, "DO NOT APPLY TO THESE AGAIN"),
            warning = weekly_limit_warning(status),
            url = self.base_url(),
            login = login_instructions(&self.credentials, self.login_url()),
            filters = Self::ui_filter_steps(),
            min_score = ctx.scoring.min_score,
            resume = resume_line(ctx),
            format = apply_result_format(5, self.kind()),
            remaining = status.remaining,
            ceiling = status.ceiling,
            reset_info = status.reset_info,
            salary_only = salary_only(ctx.require_salary_range, "apply to"),
        )
    }

    fn enrich(&self, listing: &mut JobListing, block: &str) {
        listing.yc_batch = extract_yc_batch(block);
    }
}
