//! Cover letters: AI-written when a text generator is configured, template otherwise.
//!
//! Generation never fails. Any generator error (network, quota, empty or
//! malformed output) falls back to the role template matched from the job text.

pub mod prompts;
pub mod templates;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::cover_letter::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, MAX_DESCRIPTION_CHARS,
};
use crate::llm_client::prompts::FACTUAL_INSTRUCTION;
use crate::llm_client::TextGenerator;
use crate::profile::CandidateProfile;

pub use templates::RoleCategory;

/// Letters shorter than this are treated as a failed generation.
const MIN_AI_LETTER_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationMethod {
    Ai,
    Template(RoleCategory),
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMethod::Ai => f.write_str("ai"),
            GenerationMethod::Template(category) => write!(f, "template:{category}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetter {
    pub text: String,
    pub method: GenerationMethod,
}

pub struct CoverLetterGenerator {
    writer: Option<Arc<dyn TextGenerator>>,
    profile: Arc<CandidateProfile>,
}

impl CoverLetterGenerator {
    pub fn new(writer: Option<Arc<dyn TextGenerator>>, profile: Arc<CandidateProfile>) -> Self {
        Self { writer, profile }
    }

    /// Template-only generator, used when no API key is configured.
    pub fn templates_only(profile: Arc<CandidateProfile>) -> Self {
        Self::new(None, profile)
    }

    pub fn has_ai(&self) -> bool {
        self.writer.is_some()
    }

    pub async fn generate(&self, job_title: &str, company: &str, description: &str) -> CoverLetter {
        if let Some(writer) = &self.writer {
            let prompt = self.build_prompt(job_title, company, description);
            match writer.generate(&prompt, COVER_LETTER_SYSTEM).await {
                Ok(text) if text.trim().chars().count() >= MIN_AI_LETTER_CHARS => {
                    info!("Generated AI cover letter for {} at {}", job_title, company);
                    return CoverLetter {
                        text: text.trim().to_string(),
                        method: GenerationMethod::Ai,
                    };
                }
                Ok(text) => {
                    warn!(
                        "AI cover letter too short ({} chars), using template fallback",
                        text.trim().chars().count()
                    );
                }
                Err(e) => {
                    warn!("AI generation failed: {}. Using template fallback.", e);
                }
            }
        }

        self.from_template(job_title, company, description)
    }

    pub fn from_template(&self, job_title: &str, company: &str, description: &str) -> CoverLetter {
        let category = RoleCategory::match_job(job_title, description);
        CoverLetter {
            text: templates::render(category, job_title, company, &self.profile),
            method: GenerationMethod::Template(category),
        }
    }

    fn build_prompt(&self, job_title: &str, company: &str, description: &str) -> String {
        let description: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        let contact = match self.profile.contact_line() {
            c if c.is_empty() => self.profile.name.clone(),
            c => c,
        };
        let prompt = COVER_LETTER_PROMPT_TEMPLATE
            .replace("{job_title}", job_title)
            .replace("{company}", company)
            .replace("{job_description}", &description)
            .replace("{candidate_profile}", &self.profile.render_compact())
            .replace("{candidate_contact}", &contact);
        format!("{prompt}\n\n{FACTUAL_INSTRUCTION}")
    }
}
