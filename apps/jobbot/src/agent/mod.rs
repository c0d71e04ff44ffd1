//! Browser agent: the external program that drives a real browser.
//!
//! The bot only hands it a task prompt and reads back its final text. How the
//! agent navigates or fills forms is its own business.
//!
//! `CommandAgent` runs `BROWSER_AGENT_CMD` through `sh -c`, writes the task to
//! stdin and treats stdout as the result. Each portal gets its own persistent
//! session directory so logins survive between runs.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::portals::PortalKind;

/// Stderr kept on a failed run.
const STDERR_TAIL_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no browser agent configured (set BROWSER_AGENT_CMD)")]
    NotConfigured,

    #[error("failed to start browser agent: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("browser agent I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser agent exited with {code}: {stderr}")]
    Failed { code: String, stderr: String },

    #[error("browser agent timed out after {0}s")]
    Timeout(u64),

    #[error("browser agent returned no result")]
    EmptyResult,
}

/// One unit of work for the agent.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub portal: PortalKind,
    pub prompt: String,
}

impl AgentTask {
    pub fn new(portal: PortalKind, prompt: impl Into<String>) -> Self {
        Self {
            portal,
            prompt: prompt.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Carried in `AppState` as `Arc<dyn BrowserAgent>`; tests swap in scripted agents.
#[async_trait]
pub trait BrowserAgent: Send + Sync {
    /// Runs the task to completion and returns the agent's final text.
    async fn run(&self, task: &AgentTask) -> Result<String, AgentError>;
}

// ────────────────────────────────────────────────────────────────────────────
// External command backend
// ────────────────────────────────────────────────────────────────────────────

pub struct CommandAgent {
    command: String,
    session_dir: PathBuf,
    resume_path: Option<PathBuf>,
    timeout: Duration,
}

impl CommandAgent {
    pub fn new(
        command: String,
        session_dir: PathBuf,
        resume_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            command,
            session_dir,
            resume_path,
            timeout,
        }
    }

    /// Persistent browser profile directory for `portal`.
    pub fn session_dir_for(&self, portal: PortalKind) -> PathBuf {
        self.session_dir.join(portal.key())
    }
}

#[async_trait]
impl BrowserAgent for CommandAgent {
    async fn run(&self, task: &AgentTask) -> Result<String, AgentError> {
        let session_dir = self.session_dir_for(task.portal);
        tokio::fs::create_dir_all(&session_dir).await?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .env("JOBBOT_PORTAL", task.portal.key())
            .env("JOBBOT_SESSION_DIR", &session_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(resume) = &self.resume_path {
            cmd.env("JOBBOT_RESUME_PATH", resume);
        }

        info!(
            "Starting browser agent for {} (session: {})",
            task.portal.display_name(),
            session_dir.display()
        );
        let mut child = cmd.spawn().map_err(AgentError::Spawn)?;
        let stdin = child.stdin.take();

        // Writing the task counts against the timeout as well as waiting for exit.
        let run = async move {
            if let Some(mut stdin) = stdin {
                // Agents that read the task from elsewhere may close stdin early.
                match stdin.write_all(task.prompt.as_bytes()).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
                drop(stdin);
            }
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Browser agent timed out after {}s", self.timeout.as_secs());
                return Err(AgentError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = {
                let chars: Vec<char> = stderr.trim().chars().collect();
                let start = chars.len().saturating_sub(STDERR_TAIL_CHARS);
                chars[start..].iter().collect()
            };
            return Err(AgentError::Failed {
                code: output
                    .status
                    .code()
                    .map(|c| format!("status {c}"))
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: tail,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Browser agent returned {} bytes", stdout.len());
        if stdout.is_empty() {
            return Err(AgentError::EmptyResult);
        }
        Ok(stdout)
    }
}

/// Stand-in used when `BROWSER_AGENT_CMD` is unset. Every run fails, so
/// applications are recorded as failed instead of silently skipped.
pub struct UnconfiguredAgent;

#[async_trait]
impl BrowserAgent for UnconfiguredAgent {
    async fn run(&self, _task: &AgentTask) -> Result<String, AgentError> {
        Err(AgentError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(command: &str, dir: &std::path::Path) -> CommandAgent {
        CommandAgent::new(
            command.to_string(),
            dir.to_path_buf(),
            Some(PathBuf::from("/tmp/resume.pdf")),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_prompt_goes_to_stdin_and_stdout_comes_back() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent("cat", dir.path());
        let out = agent
            .run(&AgentTask::new(PortalKind::LinkedIn, "hello agent"))
            .await
            .unwrap();
        assert_eq!(out, "hello agent");
        assert!(dir.path().join("linkedin").is_dir());
    }

    #[tokio::test]
    async fn test_environment_is_passed() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent(
            "cat > /dev/null; echo \"$JOBBOT_PORTAL $JOBBOT_RESUME_PATH\"",
            dir.path(),
        );
        let out = agent
            .run(&AgentTask::new(PortalKind::WorkAtAStartup, "task"))
            .await
            .unwrap();
        assert_eq!(out, "workatastartup /tmp/resume.pdf");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent("cat > /dev/null; echo boom >&2; exit 3", dir.path());
        let err = agent
            .run(&AgentTask::new(PortalKind::LinkedIn, "task"))
            .await
            .unwrap_err();
        match err {
            AgentError::Failed { code, stderr } => {
                assert_eq!(code, "status 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent("cat > /dev/null", dir.path());
        let err = agent
            .run(&AgentTask::new(PortalKind::LinkedIn, "task"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyResult));
    }

    #[tokio::test]
    async fn test_child_that_never_reads_stdin_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let agent = CommandAgent::new(
            "sleep 30".to_string(),
            dir.path().to_path_buf(),
            None,
            Duration::from_millis(200),
        );
        let prompt = "x".repeat(1 << 20);
        let err = agent
            .run(&AgentTask::new(PortalKind::LinkedIn, prompt))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_agent_always_fails() {
        let err = UnconfiguredAgent
            .run(&AgentTask::new(PortalKind::LinkedIn, "task"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NotConfigured));
    }
}
