use reqwest::Url;

use crate::config::PortalCredentials;
use crate::models::JobListing;
use crate::portals::prompts::{
    apply_result_format, login_instructions, resume_line, salary_only, search_result_format,
    task_preamble, MAX_LISTINGS_PER_SEARCH,
};
use crate::portals::{Freshness, Portal, PortalKind, TaskContext};
use crate::rate_limit::{RateLimitRule, LINKEDIN_RULE};

const BASE_URL: &str = "https://www.linkedin.com/jobs/search/";
const LOGIN_URL: &str = "https://www.linkedin.com/login";
const SEARCH_KEYWORDS: &str =
    "Backend Engineer Node.js TypeScript Remote AI Developer LangChain Agentic Workflows";
/// `f_WT` work type: remote.
const REMOTE_WORK_TYPE: &str = "2";
/// `f_E` experience levels: mid-senior.
const EXPERIENCE_LEVELS: &str = "3,4";
/// `sortBy`: newest first.
const SORT_BY_DATE: &str = "DD";

pub struct LinkedIn {
    credentials: PortalCredentials,
}

impl LinkedIn {
    pub fn new(credentials: PortalCredentials) -> Self {
        Self { credentials }
    }

    fn notes(&self, ctx: &TaskContext<'_>, applying: bool) -> String {
        let common = "LINKEDIN-SPECIFIC NOTES:
- Prefer \"Easy Apply\" jobs (faster application process)
- Some jobs redirect to company websites; complete the application there";
        if applying {
            format!(
                "{common}
- Watch for multi-step application forms
- Answer screening questions from the SCREENING ANSWERS in the profile
- Skip jobs that require assessment tests
- Daily limit: {}/{} applications remaining ({})",
                ctx.rate_limit.remaining, ctx.rate_limit.ceiling, ctx.rate_limit.reset_info
            )
        } else {
            format!(
                "{common}
- Note any application questions visible
- Skip \"Promoted\" listings if possible
- Skip jobs already in the applied list"
            )
        }
    }
}

impl Portal for LinkedIn {
    fn kind(&self) -> PortalKind {
        PortalKind::LinkedIn
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
        LINKEDIN_RULE
    }

    fn search_url(&self, freshness: Freshness) -> String {
        let params = [
            ("keywords", SEARCH_KEYWORDS),
            ("f_TPR", freshness.tpr_param()),
            ("sortBy", SORT_BY_DATE),
            ("f_WT", REMOTE_WORK_TYPE),
            ("f_E", EXPERIENCE_LEVELS),
        ];
        match Url::parse_with_params(BASE_URL, &params) {
            Ok(url) => url.to_string(),
            Err(_) => BASE_URL.to_string(),
        }
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

2. The URL already includes these filters:
   - Time posted: {freshness}
   - Remote only
   - Mid-Senior level experience
   - Sorted by date (newest first)

3. For each job found (up to {max} jobs):
   - Click to view full details{salary_check}
   - Score the job against the criteria
   - Note if an \"Easy Apply\" button is present (preferred)
   - Extract job information
{format}

{notes}

IMPORTANT:
- Only list jobs scoring >= {min_score}
{salary_only}
- List up to {max} matching jobs
",
            name = self.name(),
            preamble = task_preamble(ctx, "DO NOT LIST THESE"),
            url = self.search_url(ctx.freshness),
            login = login_instructions(&self.credentials, self.login_url()),
            freshness = ctx.freshness.description(),
            max = MAX_LISTINGS_PER_SEARCH,
            format = search_result_format(self.kind()),
            notes = self.notes(ctx, false),
            min_score = ctx.scoring.min_score,
            salary_only = salary_only(ctx.require_salary_range, "list"),
        )
    }

    fn apply_task(&self, job_number: u32, total_jobs: u32, ctx: &TaskContext<'_>) -> String {
        let salary_check = if ctx.require_salary_range {
            "\n   - ONLY apply to jobs with a visible salary range"
        } else {
            ""
        };
        format!(
            "
TASK: Apply to job {job_number} of {total_jobs} on {name}

{preamble}

STEPS:

1. Navigate to {url}{login}

2. The URL already includes filters. Find a matching job:
   - Look for \"Easy Apply\" jobs (preferred)
   - Score the job against the criteria
   - Only apply if score >= {min_score}{salary_check}

3. Apply to the selected job:
   - Click \"Easy Apply\" if available
   - If it is an external application, follow the link and complete it there
   - {resume}
   - Generate a cover letter if one is needed
   - Fill all required fields using the candidate profile
   - Submit the application
{format}

{notes}

IMPORTANT:
- Score every job before applying
- If an application fails, try the next matching job
{salary_only}
",
            name = self.name(),
            preamble = task_preamble(ctx, "DO NOT APPLY TO THESE AGAIN"),
            url = self.search_url(ctx.freshness),
            login = login_instructions(&self.credentials, self.login_url()),
            min_score = ctx.scoring.min_score,
            resume = resume_line(ctx),
            format = apply_result_format(5, self.kind()),
            notes = self.notes(ctx, true),
            salary_only = salary_only(ctx.require_salary_range, "apply to"),
        )
    }

    fn enrich(&self, listing: &mut JobListing, block: &str) {
        listing.easy_apply = Some(block.to_lowercase().contains("easy apply"));
    }
}
