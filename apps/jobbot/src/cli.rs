use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::bot::{report, JobBot, RunOptions};
use crate::menu;
use crate::models::JobListing;
use crate::portals::{Freshness, PortalKind};
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "jobbot",
    about = "Search and apply to jobs on LinkedIn and Work at a Startup through a browser agent",
    version
)]
pub struct Cli {
    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Search portals, score listings and journal them without applying
    Search(RunArgs),
    /// Apply to jobs on the selected portals
    Apply {
        #[command(flatten)]
        run: RunArgs,
        /// Applications per selected portal (default: 3 LinkedIn, 2 Work at a Startup)
        #[arg(long)]
        count: Option<u32>,
    },
    /// Show application statistics and remaining quotas
    Stats,
    /// Apply to one job by URL, skipping scoring
    ApplyUrl {
        url: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Score a job description against the configured keywords
    Score(JobArgs),
    /// Write a cover letter for a job to stdout
    CoverLetter(JobArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Portal to use; repeat for several (default: all)
    #[arg(long = "portal", value_enum)]
    pub portals: Vec<PortalKind>,
    /// Maximum listing age (LinkedIn only)
    #[arg(long, value_enum, default_value_t = Freshness::PastDay)]
    pub freshness: Freshness,
    /// Only consider jobs that show a salary range
    #[arg(long)]
    pub require_salary: bool,
    /// Build tasks and check quotas without running the browser agent
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn options(
        &self,
        require_salary_default: bool,
        per_portal_count: Option<u32>,
    ) -> RunOptions {
        RunOptions {
            portals: self.portals.clone(),
            freshness: self.freshness,
            require_salary_range: self.require_salary || require_salary_default,
            dry_run: self.dry_run,
            per_portal_count,
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct JobArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub company: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

pub async fn run(cli: Cli, state: AppState) -> Result<()> {
    let command = match cli.command {
        Some(command) => command,
        None => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            match menu::prompt_command(&mut input, &mut output)? {
                Some(command) => command,
                None => return Ok(()),
            }
        }
    };
    execute(command, state).await
}

pub async fn execute(command: Command, state: AppState) -> Result<()> {
    match command {
        Command::Search(args) => {
            let opts = args.options(state.config.require_salary_range, None);
            let min_score = state.scoring.min_score;
            println!(
                "{}",
                report::header("search", &opts, min_score, None, Local::now().naive_local())
            );
            let mut bot = JobBot::open(state)?;
            let listings = bot.search_all(&opts).await?;
            if !opts.dry_run {
                println!(
                    "{}",
                    report::search_summary(&listings, opts.require_salary_range, min_score)
                );
            }
        }
        Command::Apply { run, count } => {
            let opts = run.options(state.config.require_salary_range, count);
            let min_score = state.scoring.min_score;
            let mut bot = JobBot::open(state)?;
            let planned = bot.planned_allocation(&opts);
            println!(
                "{}",
                report::header(
                    "apply",
                    &opts,
                    min_score,
                    Some(planned.total()),
                    Local::now().naive_local()
                )
            );
            let records = bot.apply_all(&opts).await?;
            let portals = planned.portals();
            println!("{}", report::application_summary(&records, &portals));
            println!("\n{}", bot.stats_summary());
        }
        Command::Stats => {
            let bot = JobBot::open(state)?;
            println!("{}", bot.stats_summary());
            println!("\n{}", bot.journal_summary());
        }
        Command::ApplyUrl { url, dry_run } => {
            let mut bot = JobBot::open(state)?;
            let record = bot.apply_to_url(&url, dry_run).await?;
            println!("{}", report::url_result(&record));
        }
        Command::Score(job) => {
            let mut listing = JobListing::new("manual", &job.company, &job.title);
            listing.description = job.description;
            let analysis = state.scorer.analyze(&listing);
            println!("{}", analysis.report());
        }
        Command::CoverLetter(job) => {
            let letter = state
                .cover_letters
                .generate(&job.title, &job.company, &job.description)
                .await;
            info!("Cover letter method: {}", letter.method);
            println!("{}", letter.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["jobbot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_apply_flags() {
        let cli = Cli::try_parse_from([
            "jobbot",
            "apply",
            "--portal",
            "waas",
            "--freshness",
            "7d",
            "--dry-run",
            "--count",
            "1",
        ])
        .unwrap();
        let Some(Command::Apply { run, count }) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(run.portals, vec![PortalKind::WorkAtAStartup]);
        assert_eq!(run.freshness, Freshness::PastWeek);
        assert!(run.dry_run);
        assert_eq!(count, Some(1));

        let opts = run.options(true, count);
        assert!(opts.require_salary_range);
        assert_eq!(opts.per_portal_count, Some(1));
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["jobbot", "search"]).unwrap();
        let Some(Command::Search(run)) = cli.command else {
            panic!("expected search");
        };
        assert!(run.portals.is_empty());
        assert_eq!(run.freshness, Freshness::PastDay);
        assert!(!run.require_salary);
    }

    #[test]
    fn test_apply_url_and_helpers() {
        let url = "https://www.linkedin.com/jobs/view/1";
        let cli = Cli::try_parse_from(["jobbot", "apply-url", url]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::ApplyUrl {
                url: url.to_string(),
                dry_run: false,
            })
        );

        let cli = Cli::try_parse_from([
            "jobbot",
            "cover-letter",
            "--title",
            "SRE",
            "--company",
            "Acme",
        ])
        .unwrap();
        let Some(Command::CoverLetter(job)) = cli.command else {
            panic!("expected cover-letter");
        };
        assert_eq!(job.company, "Acme");
        assert!(job.description.is_empty());

        assert!(Cli::try_parse_from(["jobbot", "score"]).is_err());
    }
}
