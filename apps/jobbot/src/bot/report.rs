//! Plain-text run reports printed by the CLI.

use chrono::NaiveDateTime;

use crate::bot::{RunOptions, ScoredListing};
use crate::models::{ApplicationRecord, ApplicationStatus};
use crate::portals::PortalKind;

const RULE_WIDTH: usize = 60;
const TOP_MATCHES: usize = 10;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn section(title: &str) -> String {
    format!("{}\n{}\n{}", rule(), title, rule())
}

fn portal_names(opts: &RunOptions) -> String {
    let portals = if opts.portals.is_empty() {
        PortalKind::ALL.to_vec()
    } else {
        opts.portals.clone()
    };
    portals
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Banner printed before a run. `target` is the number of applications
/// planned, when applying.
pub fn header(
    mode: &str,
    opts: &RunOptions,
    min_score: i32,
    target: Option<u32>,
    now: NaiveDateTime,
) -> String {
    let salary_filter = if opts.require_salary_range {
        "required"
    } else {
        "off"
    };
    let mut lines = vec![
        rule(),
        format!("JOB APPLICATION BOT - {}", mode.to_uppercase()),
        rule(),
        format!("Date: {}", now.format("%Y-%m-%d %H:%M")),
        format!("Portals: {}", portal_names(opts)),
        format!("Min score: {min_score}"),
        format!("Salary filter: {salary_filter}"),
    ];
    if opts.portals.is_empty() || opts.portals.contains(&PortalKind::LinkedIn) {
        lines.push(format!(
            "Freshness: {} ({})",
            opts.freshness.description(),
            opts.freshness.label()
        ));
    }
    if let Some(target) = target {
        lines.push(format!("Target: {target} applications"));
    }
    if opts.dry_run {
        lines.push("Mode: DRY RUN (no applications will be submitted)".to_string());
    }
    lines.push(rule());
    lines.join("\n")
}

pub fn search_summary(
    listings: &[ScoredListing],
    require_salary_range: bool,
    min_score: i32,
) -> String {
    let mut shown: Vec<&ScoredListing> = listings
        .iter()
        .filter(|s| !require_salary_range || s.listing.has_salary_range())
        .collect();
    let filtered_out = listings.len() - shown.len();
    let above = shown.iter().filter(|s| s.score() >= min_score).count();

    let mut lines = vec![section("SEARCH SUMMARY")];
    lines.push(format!("Total jobs found: {}", listings.len()));
    if require_salary_range {
        lines.push(format!("Without salary range (filtered out): {filtered_out}"));
    }
    lines.push(format!("Jobs with score >= {min_score}: {above}"));
    lines.push(format!(
        "Selected for application: {}",
        shown.iter().filter(|s| s.selected).count()
    ));

    if shown.is_empty() {
        lines.push("\nNo matching jobs found.".to_string());
        return lines.join("\n");
    }

    shown.sort_by(|a, b| b.score().cmp(&a.score()));
    lines.push("\nTOP MATCHES (by score):".to_string());
    for (i, scored) in shown.iter().take(TOP_MATCHES).enumerate() {
        let job = &scored.listing;
        lines.push(format!("\n{}. {} - {}", i + 1, job.company, job.title));
        lines.push(format!("   Score: {} | Portal: {}", scored.score(), job.portal));
        if let (true, Some(salary)) = (job.has_salary_range(), &job.salary_range) {
            lines.push(format!("   Salary: {salary}"));
        }
        if !job.url.is_empty() {
            lines.push(format!("   URL: {}", job.url));
        }
    }
    lines.join("\n")
}

pub fn application_summary(records: &[ApplicationRecord], portals: &[PortalKind]) -> String {
    let with_status = |wanted: &[ApplicationStatus]| {
        records
            .iter()
            .filter(|r| wanted.contains(&r.status))
            .count()
    };
    let success = with_status(&[ApplicationStatus::Success]);
    let failed = with_status(&[ApplicationStatus::Failed]);
    let skipped = with_status(&[ApplicationStatus::Skipped, ApplicationStatus::DryRun]);

    let mut lines = vec![section("APPLICATION SUMMARY")];
    lines.push(format!("Successful: {success}"));
    lines.push(format!("Failed: {failed}"));
    lines.push(format!("Skipped: {skipped}"));
    lines.push(String::new());
    lines.push("By Portal:".to_string());
    for portal in portals {
        let key = portal.key();
        let on_portal: Vec<&ApplicationRecord> =
            records.iter().filter(|r| r.portal == key).collect();
        let ok = on_portal
            .iter()
            .filter(|r| r.status == ApplicationStatus::Success)
            .count();
        lines.push(format!(
            "  {}: {}/{} successful",
            portal.display_name(),
            ok,
            on_portal.len()
        ));
    }
    lines.join("\n")
}

/// Outcome of a single apply-by-URL attempt.
pub fn url_result(record: &ApplicationRecord) -> String {
    let mut lines = vec![section("APPLICATION RESULT")];
    lines.push(format!("Status: {}", record.status.as_str()));
    lines.push(format!("Portal: {}", record.portal));
    lines.push(format!("Company: {}", record.display_company()));
    if !record.title.is_empty() {
        lines.push(format!("Title: {}", record.title));
    }
    if !record.url.is_empty() {
        lines.push(format!("URL: {}", record.url));
    }
    if let Some(reason) = &record.reason {
        lines.push(format!("Reason: {reason}"));
    }
    if let Some(error) = &record.error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(notes) = &record.notes {
        lines.push(format!("Notes: {notes}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::JobListing;
    use crate::scoring::{JobAnalysis, RejectionReason};

    fn scored(company: &str, score: i32, salary: Option<&str>, selected: bool) -> ScoredListing {
        let mut listing = JobListing::new("linkedin", company, "Backend Engineer");
        listing.score = Some(score);
        listing.salary_range = salary.map(str::to_string);
        ScoredListing {
            listing,
            analysis: JobAnalysis {
                score,
                threshold: 30,
                matched_required: vec![],
                matched_bonus: vec![],
                matched_negative: vec![],
                experience_matched: false,
                remote: false,
                is_blacklisted: false,
                rejection_reason: if selected {
                    RejectionReason::Passed
                } else {
                    RejectionReason::ScoreTooLow
                },
            },
            selected,
        }
    }

    #[test]
    fn test_header_mentions_freshness_only_for_linkedin() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let opts = RunOptions {
            portals: vec![PortalKind::WorkAtAStartup],
            dry_run: true,
            ..RunOptions::default()
        };
        let text = header("apply", &opts, 30, Some(2), now);
        assert!(text.contains("JOB APPLICATION BOT - APPLY"));
        assert!(text.contains("Date: 2025-03-04 09:30"));
        assert!(text.contains("Target: 2 applications"));
        assert!(text.contains("DRY RUN"));
        assert!(!text.contains("Freshness"));

        let text = header("search", &RunOptions::default(), 30, None, now);
        assert!(text.contains("Freshness: Last 24 hours"));
        assert!(text.contains("Portals: LinkedIn, Work at a Startup"));
    }

    #[test]
    fn test_search_summary_orders_by_score() {
        let listings = vec![
            scored("Low", 10, None, false),
            scored("High", 60, None, true),
            scored("Mid", 35, None, true),
        ];
        let text = search_summary(&listings, false, 30);
        assert!(text.contains("Total jobs found: 3"));
        assert!(text.contains("Jobs with score >= 30: 2"));
        let high = text.find("1. High").unwrap();
        let mid = text.find("2. Mid").unwrap();
        assert!(high < mid);
    }

    #[test]
    fn test_search_summary_salary_filter() {
        let listings = vec![
            scored("Paid", 40, Some("$150k - $180k"), true),
            scored("Secret", 50, Some("Not specified"), true),
        ];
        let text = search_summary(&listings, true, 30);
        assert!(text.contains("Without salary range (filtered out): 1"));
        assert!(text.contains("Salary: $150k - $180k"));
        assert!(!text.contains("Secret"));
    }

    #[test]
    fn test_application_summary_counts() {
        let records = vec![
            ApplicationRecord::new("linkedin", ApplicationStatus::Success),
            ApplicationRecord::failure("linkedin", "", "boom"),
            ApplicationRecord::skipped("workatastartup", "rate_limit_reached"),
            ApplicationRecord::new("workatastartup", ApplicationStatus::DryRun),
        ];
        let text = application_summary(&records, &PortalKind::ALL);
        assert!(text.contains("Successful: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("Skipped: 2"));
        assert!(text.contains("LinkedIn: 1/2 successful"));
        assert!(text.contains("Work at a Startup: 0/2 successful"));
    }

    #[test]
    fn test_url_result_shows_reason() {
        let mut record = ApplicationRecord::skipped("linkedin", "rate_limit_reached");
        record.url = "https://www.linkedin.com/jobs/view/1".to_string();
        let text = url_result(&record);
        assert!(text.contains("Status: skipped"));
        assert!(text.contains("Company: Unknown"));
        assert!(text.contains("Reason: rate_limit_reached"));
    }
}
