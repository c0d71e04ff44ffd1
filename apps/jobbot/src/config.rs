use std::path::PathBuf;

use anyhow::{Context, Result};

/// Login details handed to the browser agent for one portal.
#[derive(Debug, Clone, Default)]
pub struct PortalCredentials {
    pub username: String,
    pub password: String,
}

impl PortalCredentials {
    pub fn is_set(&self) -> bool {
        !self.username.is_empty()
    }
}

/// Application configuration loaded from environment variables.
/// Everything except the portal credentials has a usable default.
#[derive(Debug, Clone)]
pub struct Config {
    pub rust_log: String,
    /// Absent key means cover letters always come from templates.
    pub anthropic_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub session_dir: PathBuf,
    pub resume_path: Option<PathBuf>,
    pub profile_path: Option<PathBuf>,
    pub min_score: Option<i32>,
    pub require_salary_range: bool,
    pub browser_agent_cmd: Option<String>,
    pub agent_timeout_secs: u64,
    pub linkedin: PortalCredentials,
    pub workatastartup: PortalCredentials,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            data_dir: optional_env("JOBBOT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            session_dir: optional_env("JOBBOT_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("browser_sessions")),
            resume_path: optional_env("JOBBOT_RESUME_PATH").map(PathBuf::from),
            profile_path: optional_env("JOBBOT_PROFILE").map(PathBuf::from),
            min_score: optional_env("JOBBOT_MIN_SCORE")
                .map(|v| v.parse::<i32>())
                .transpose()
                .context("JOBBOT_MIN_SCORE must be an integer")?,
            require_salary_range: optional_env("JOBBOT_REQUIRE_SALARY")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("JOBBOT_REQUIRE_SALARY must be true/false")?
                .unwrap_or(false),
            browser_agent_cmd: optional_env("BROWSER_AGENT_CMD"),
            agent_timeout_secs: optional_env("BROWSER_AGENT_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("BROWSER_AGENT_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(1800),
            linkedin: PortalCredentials {
                username: std::env::var("LINKEDIN_USER").unwrap_or_default(),
                password: std::env::var("LINKEDIN_PASS").unwrap_or_default(),
            },
            workatastartup: PortalCredentials {
                username: std::env::var("WORKATASTARTUP_USER").unwrap_or_default(),
                password: std::env::var("WORKATASTARTUP_PASS").unwrap_or_default(),
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}
