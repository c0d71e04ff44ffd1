use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::agent::{BrowserAgent, CommandAgent, UnconfiguredAgent};
use crate::bot::PortalAllocation;
use crate::config::Config;
use crate::cover_letter::CoverLetterGenerator;
use crate::llm_client::{self, LlmClient, TextGenerator};
use crate::portals::{PortalKind, Portals};
use crate::profile::{CandidateProfile, ProfileFile};
use crate::rate_limit::RateLimitPolicy;
use crate::scoring::{JobScorer, KeywordScorer, ScoringConfig};

/// Shared, read-only application state handed to the bot and CLI commands.
/// The tracking store is not here; the runner owns it.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub profile: Arc<CandidateProfile>,
    pub scoring: Arc<ScoringConfig>,
    /// Pluggable job scorer. Default: KeywordScorer.
    pub scorer: Arc<dyn JobScorer>,
    pub rate_limits: RateLimitPolicy,
    pub cover_letters: Arc<CoverLetterGenerator>,
    pub agent: Arc<dyn BrowserAgent>,
    pub portals: Portals,
    pub allocation: PortalAllocation,
    /// This binary, offered to the browser agent for scoring and cover letters.
    pub helper_command: Option<String>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let ProfileFile {
            candidate,
            mut scoring,
        } = ProfileFile::load(config.profile_path.as_deref())?;
        if let Some(min_score) = config.min_score {
            scoring.min_score = min_score;
        }
        info!(
            "Loaded profile for {} (min score {})",
            candidate.name, scoring.min_score
        );

        let profile = Arc::new(candidate);
        let scoring = Arc::new(scoring);
        let scorer: Arc<dyn JobScorer> = Arc::new(KeywordScorer::new(scoring.clone()));

        let cover_letters = match &config.anthropic_api_key {
            Some(key) => {
                let llm = LlmClient::new(key.clone())?;
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                let writer: Arc<dyn TextGenerator> = Arc::new(llm);
                CoverLetterGenerator::new(Some(writer), profile.clone())
            }
            None => {
                warn!("ANTHROPIC_API_KEY not set; cover letters will use templates");
                CoverLetterGenerator::templates_only(profile.clone())
            }
        };
        let method = if cover_letters.has_ai() {
            "AI with template fallback"
        } else {
            "templates only"
        };
        info!("Cover letters: {method}");
        let cover_letters = Arc::new(cover_letters);

        let agent: Arc<dyn BrowserAgent> = match &config.browser_agent_cmd {
            Some(cmd) => Arc::new(CommandAgent::new(
                cmd.clone(),
                config.session_dir.clone(),
                config.resume_path.clone(),
                Duration::from_secs(config.agent_timeout_secs),
            )),
            None => {
                warn!("BROWSER_AGENT_CMD not set; searches and applications will fail");
                Arc::new(UnconfiguredAgent)
            }
        };

        let portals = Portals::from_config(&config);
        let rate_limits = PortalKind::ALL
            .into_iter()
            .map(|kind| portals.get(kind))
            .fold(RateLimitPolicy::new(), |policy, portal| {
                policy.with_rule(portal.key(), portal.rate_limit_rule())
            });

        let helper_command = std::env::current_exe()
            .ok()
            .map(|p| p.display().to_string());

        Ok(Self {
            config,
            profile,
            scoring,
            scorer,
            rate_limits,
            cover_letters,
            agent,
            portals,
            allocation: PortalAllocation::default(),
            helper_command,
        })
    }
}
