// Prompt fragments shared by every portal adapter.
// Portal-specific task bodies live in the adapter files.

use crate::config::PortalCredentials;
use crate::portals::result_parser::{APPLIED_MARKER, END_MARKER, FOUND_MARKER};
use crate::portals::{PortalKind, TaskContext};

/// Maximum listings the agent is asked to report per search.
pub const MAX_LISTINGS_PER_SEARCH: u32 = 20;

pub fn applied_jobs(applied: &[String]) -> String {
    if applied.is_empty() {
        return "  None yet".to_string();
    }
    applied
        .iter()
        .map(|job| format!("  - {job}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn blacklist(companies: &[String]) -> String {
    if companies.is_empty() {
        "None".to_string()
    } else {
        companies.join(", ")
    }
}

pub fn salary_filter_note(require_salary_range: bool) -> &'static str {
    if !require_salary_range {
        return "";
    }
    "
SALARY RANGE FILTER (REQUIRED):
- ONLY consider jobs that have a visible salary range
- Skip any jobs where salary information is \"Not specified\" or not visible
- This is a mandatory filter - do not list jobs without salary information"
}

/// Returns an empty string when the portal has no stored credentials;
/// the agent then relies on the persisted browser session.
pub fn login_instructions(credentials: &PortalCredentials, login_url: &str) -> String {
    if !credentials.is_set() {
        return String::new();
    }
    format!(
        "
   - If not already signed in, open {login_url}
   - Enter Email/Username: {}
   - Enter Password: {}
   - Submit and wait for the dashboard",
        credentials.username, credentials.password
    )
}

/// Helper commands the agent may call. Without a helper command the agent is
/// asked to apply the scoring criteria itself and write any cover letter from
/// the profile.
pub fn helper_tools(ctx: &TaskContext<'_>) -> String {
    match ctx.helper_command {
        Some(cmd) => format!(
            "
HELPER COMMANDS:
- Score a job: {cmd} score --title \"<title>\" --company \"<company>\" \
--description \"<description>\"
- Write a cover letter: {cmd} cover-letter --title \"<title>\" --company \"<company>\" \
--description \"<description>\"
  The cover letter is printed to stdout; paste it unchanged."
        ),
        None => "
HELPER COMMANDS:
- None available. Score each job yourself using the criteria above.
- If a cover letter is required, write a short one (3 paragraphs) using only the candidate profile."
            .to_string(),
    }
}

pub fn resume_line(ctx: &TaskContext<'_>) -> String {
    match ctx.resume_path {
        Some(path) => format!("Upload resume if prompted (path: {path})"),
        None => "Skip resume upload if optional; otherwise report the job as failed".to_string(),
    }
}

pub fn salary_only(require_salary_range: bool, verb: &str) -> String {
    if require_salary_range {
        format!("- ONLY {verb} jobs that have a visible salary range")
    } else {
        String::new()
    }
}

pub fn search_result_format(portal: PortalKind) -> String {
    format!(
        "
4. Return this EXACT format for each job found:
   {FOUND_MARKER}
   Portal: {}
   Company: [company name]
   Title: [job title]
   URL: [job url]
   Score: [calculated score]
   TechStack: [comma-separated tech mentioned]
   SalaryRange: [if visible, else \"Not specified\"]
   Remote: [yes/no/not specified]
   Experience: [required experience level]
   {END_MARKER}",
        portal.key()
    )
}

pub fn apply_result_format(step: u32, portal: PortalKind) -> String {
    format!(
        "
{step}. Return this EXACT format after applying:
   {APPLIED_MARKER}
   Portal: {}
   Company: [company name]
   Title: [job title]
   URL: [job url]
   Score: [calculated score]
   Status: [success/failed]
   CoverLetterUsed: [true/false]
   ResumeUploaded: [true/false]
   TechStack: [comma-separated tech mentioned]
   SalaryRange: [if visible, else \"Not specified\"]
   Notes: [any relevant notes]
   {END_MARKER}",
        portal.key()
    )
}

/// Common header of search and apply tasks: profile, exclusions, criteria.
pub fn task_preamble(ctx: &TaskContext<'_>, excluded_label: &str) -> String {
    format!(
        "{profile}
ALREADY APPLIED ({excluded_label}):
{applied}

BLACKLISTED COMPANIES (SKIP THESE):
{blacklist}
{salary}

{criteria}
{tools}",
        profile = ctx.profile.render_full(),
        applied = applied_jobs(ctx.applied),
        blacklist = blacklist(&ctx.scoring.blacklisted_companies),
        salary = salary_filter_note(ctx.require_salary_range),
        criteria = ctx.scoring.criteria_text(),
        tools = helper_tools(ctx),
    )
}

/// Task for a URL the user picked by hand: no scoring, apply directly.
pub fn direct_apply_task(
    portal: PortalKind,
    job_url: &str,
    credentials: &PortalCredentials,
    ctx: &TaskContext<'_>,
) -> String {
    let login = if credentials.is_set() {
        format!(
            "
   - If you see a login page, sign in with:
     Email/Username: {}
     Password: {}",
            credentials.username, credentials.password
        )
    } else {
        String::new()
    };
    let cover_letter = match ctx.helper_command {
        Some(cmd) => format!(
            "run `{cmd} cover-letter --title \"<title>\" --company \"<company>\" \
             --description \"<description>\"` and paste its output"
        ),
        None => "write a short one using only the candidate profile".to_string(),
    };

    format!(
        "
TASK: Apply to a specific job posting on {name}

{profile}
JOB URL: {job_url}

CRITICAL: The user picked this job by hand. Do NOT score or evaluate it. \
Proceed directly to applying.

STEPS:

1. Navigate directly to the job URL: {job_url}
   - The browser keeps your session, so you should already be logged in{login}

2. Read the posting to find the job title and company name.

3. Apply to the job:
   - Click the \"Apply\" or \"Quick Apply\" button
   - If a cover letter field is present, {cover_letter}
   - {resume}
   - Fill in all required fields from the candidate profile
   - Review everything, then submit the application

4. After applying, return this EXACT format:
   {APPLIED_MARKER}
   Portal: {key}
   Company: [company name]
   Title: [job title]
   URL: {job_url}
   Score: N/A
   Status: [success/failed]
   CoverLetterUsed: [true/false]
   ResumeUploaded: [true/false]
   TechStack: [comma-separated tech mentioned if visible on page]
   SalaryRange: [if visible, else \"Not specified\"]
   Remote: [yes/no/not specified]
   Experience: [required experience level if visible]
   Notes: [anything relevant about the application]
   {END_MARKER}

IMPORTANT:
- Complete the application process fully
- If the application fails, put the reason in the Notes field
",
        name = portal.display_name(),
        profile = ctx.profile.render_full(),
        resume = resume_line(ctx),
        key = portal.key(),
    )
}
