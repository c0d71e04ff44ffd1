use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringConfig;

/// The candidate the bot applies on behalf of.
/// Rendered into every agent task and into cover letters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub github: String,
    pub linkedin: String,
    pub experience_years: u32,
    pub skills: Vec<String>,
    pub highlights: Vec<String>,
    pub target_roles: Vec<String>,
    pub work_authorization: String,
    pub relocation: String,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            name: "Candidate".to_string(),
            headline: "Senior Backend Engineer".to_string(),
            email: String::new(),
            phone: String::new(),
            github: String::new(),
            linkedin: String::new(),
            experience_years: 4,
            skills: [
                "Node.js",
                "TypeScript",
                "GraphQL",
                "Golang",
                "PostgreSQL",
                "MongoDB",
                "Redis",
                "AWS (Lambda, SQS, SNS, EventBridge)",
                "Docker",
                "LangChain",
                "LangGraph",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            highlights: [
                "Owned a public-facing API microservice end to end",
                "Led a zero-downtime migration to a unified SaaS architecture",
                "Architected event-driven systems handling 100M+ monthly requests",
                "Built production agentic workflows on top of LLMs",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            target_roles: [
                "Senior Backend Engineer",
                "Backend Engineer",
                "Platform Engineer",
                "API/Extensibility Engineer",
                "DevOps Engineer",
                "AI Engineer",
                "LLM Engineer",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            work_authorization: "Yes (for remote roles)".to_string(),
            relocation: "Prefers remote".to_string(),
        }
    }
}

impl CandidateProfile {
    /// `email | github` style contact line; empty parts are dropped.
    pub fn contact_line(&self) -> String {
        [&self.email, &self.github, &self.linkedin]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Full profile block used in browser agent tasks.
    pub fn render_full(&self) -> String {
        let mut out = String::from("CANDIDATE PROFILE:\n");
        out.push_str(&format!("- Name: {}\n", self.name));
        out.push_str(&format!("- Title: {}\n", self.headline));
        out.push_str(&format!("- Experience: {}+ years\n", self.experience_years));
        for (label, value) in [
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("GitHub", &self.github),
            ("LinkedIn", &self.linkedin),
        ] {
            if !value.is_empty() {
                out.push_str(&format!("- {label}: {value}\n"));
            }
        }

        out.push_str("\nCORE STACK:\n");
        out.push_str(&format!("- {}\n", self.skills.join(", ")));

        if !self.highlights.is_empty() {
            out.push_str("\nKEY ACHIEVEMENTS:\n");
            for highlight in &self.highlights {
                out.push_str(&format!("- {highlight}\n"));
            }
        }

        if !self.target_roles.is_empty() {
            out.push_str("\nTARGET ROLES:\n");
            for role in &self.target_roles {
                out.push_str(&format!("- {role}\n"));
            }
        }

        out.push_str("\nSCREENING ANSWERS:\n");
        out.push_str(&format!("- Years of experience: {}+\n", self.experience_years));
        out.push_str(&format!("- Work authorization: {}\n", self.work_authorization));
        out.push_str(&format!("- Willing to relocate: {}\n", self.relocation));
        out
    }

    /// Short profile for cover letter prompts.
    pub fn render_compact(&self) -> String {
        let mut out = format!(
            "Candidate: {}, {}\n- {}+ years of experience\n- Core stack: {}\n",
            self.name,
            self.headline,
            self.experience_years,
            self.skills.join(", ")
        );
        for highlight in self.highlights.iter().take(3) {
            out.push_str(&format!("- {highlight}\n"));
        }
        out
    }
}

/// Optional JSON override file (`JOBBOT_PROFILE`). Missing sections keep defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFile {
    pub candidate: CandidateProfile,
    pub scoring: ScoringConfig,
}

impl ProfileFile {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Profile file {} is not valid JSON", path.display()))
    }
}
