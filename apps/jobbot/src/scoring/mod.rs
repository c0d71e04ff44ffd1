//! Job Scoring: pluggable, trait-based relevance scoring for job listings.
//!
//! Default: `KeywordScorer` (additive keyword weights, deterministic, fully testable).
//!
//! `AppState` holds an `Arc<dyn JobScorer>`.

pub mod keyword;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::JobListing;

pub use keyword::KeywordScorer;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// A keyword and the points it contributes when found in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub term: String,
    pub weight: i32,
}

impl WeightedKeyword {
    pub fn new(term: &str, weight: i32) -> Self {
        Self {
            term: term.to_string(),
            weight,
        }
    }
}

/// Keyword lists and weights driving `KeywordScorer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub required: Vec<WeightedKeyword>,
    pub bonus: Vec<WeightedKeyword>,
    pub negative: Vec<String>,
    /// Subtracted once when any negative keyword matches. Sign is ignored.
    pub negative_penalty: i32,
    pub experience_patterns: Vec<String>,
    pub experience_bonus: i32,
    pub remote_bonus: i32,
    pub blacklisted_companies: Vec<String>,
    /// Apply threshold: listings scoring below this are skipped.
    pub min_score: i32,
}

pub const REQUIRED_KEYWORD_SCORE: i32 = 8;
pub const BONUS_KEYWORD_SCORE: i32 = 4;
pub const EXPERIENCE_MATCH_SCORE: i32 = 10;
pub const REMOTE_BONUS_SCORE: i32 = 5;
pub const NEGATIVE_KEYWORD_PENALTY: i32 = 50;
pub const MIN_JOB_SCORE: i32 = 30;

const DEFAULT_REQUIRED: &[&str] = &[
    "backend",
    "node",
    "nodejs",
    "typescript",
    "aws",
    "golang",
    "go",
    "graphql",
    "devops",
    "platform",
    "api",
    "langchain",
    "agentic",
    "llm",
    "llms",
    "ai developer",
    "ai engineer",
    "automated workflows",
    "agent workflows",
    "workflow automation",
];

const DEFAULT_BONUS: &[&str] = &[
    "remote",
    "microservices",
    "saas",
    "startup",
    "series a",
    "series b",
    "mongodb",
    "postgresql",
    "redis",
    "docker",
    "kubernetes",
    "lambda",
    "openai",
    "anthropic",
    "claude",
    "gpt",
    "gemini",
    "langgraph",
    "autonomous agents",
    "multi-agent",
    "rag",
    "vector database",
    "prompt engineering",
    "fine-tuning",
    "model deployment",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "frontend",
    "react developer",
    "vue developer",
    "angular developer",
    "ios",
    "ios developer",
    "android",
    "android developer",
    "qa engineer",
    "quality assurance",
    "test engineer",
    "designer",
    "ui designer",
    "ux designer",
    "graphic designer",
    "intern",
    "internship",
    "manager",
    "engineering manager",
    "product manager",
    "sales",
    "marketing",
    "recruiter",
    "hr",
    "data analyst",
    "business analyst",
];

const DEFAULT_EXPERIENCE_PATTERNS: &[&str] = &[
    "2-4 years",
    "2+ years",
    "3+ years",
    "4+ years",
    "mid-level",
    "mid level",
    "senior",
    "staff",
];

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            required: weighted(DEFAULT_REQUIRED, REQUIRED_KEYWORD_SCORE),
            bonus: weighted(DEFAULT_BONUS, BONUS_KEYWORD_SCORE),
            negative: DEFAULT_NEGATIVE.iter().map(|s| s.to_string()).collect(),
            negative_penalty: NEGATIVE_KEYWORD_PENALTY,
            experience_patterns: DEFAULT_EXPERIENCE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            experience_bonus: EXPERIENCE_MATCH_SCORE,
            remote_bonus: REMOTE_BONUS_SCORE,
            blacklisted_companies: Vec::new(),
            min_score: MIN_JOB_SCORE,
        }
    }
}

impl ScoringConfig {
    /// Keyword lists only: no experience, remote, or blacklist rules.
    #[cfg(test)]
    pub fn keywords_only(
        required: Vec<WeightedKeyword>,
        bonus: Vec<WeightedKeyword>,
        negative: Vec<String>,
        negative_penalty: i32,
    ) -> Self {
        Self {
            required,
            bonus,
            negative,
            negative_penalty,
            experience_patterns: Vec::new(),
            experience_bonus: 0,
            remote_bonus: 0,
            blacklisted_companies: Vec::new(),
            min_score: MIN_JOB_SCORE,
        }
    }

    pub fn is_blacklisted(&self, company: &str) -> bool {
        let company = company.trim().to_lowercase();
        self.blacklisted_companies
            .iter()
            .any(|c| c.trim().to_lowercase() == company)
    }

    /// Human-readable criteria block embedded in agent tasks.
    pub fn criteria_text(&self) -> String {
        let terms = |list: &[WeightedKeyword]| {
            list.iter()
                .map(|k| k.term.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let required_weight = self.required.first().map(|k| k.weight).unwrap_or(0);
        let bonus_weight = self.bonus.first().map(|k| k.weight).unwrap_or(0);

        let mut out = String::from("JOB SCORING CRITERIA:\n");
        out.push_str(&format!(
            "- Required keywords (+{required_weight} each): {}\n",
            terms(&self.required)
        ));
        out.push_str(&format!(
            "- Bonus keywords (+{bonus_weight} each): {}\n",
            terms(&self.bonus)
        ));
        if self.experience_bonus != 0 {
            out.push_str(&format!(
                "- Experience match: +{} for {}\n",
                self.experience_bonus,
                self.experience_patterns.join(", ")
            ));
        }
        if self.remote_bonus != 0 {
            out.push_str(&format!("- Remote: +{} bonus\n", self.remote_bonus));
        }
        out.push_str(&format!(
            "- Negative keywords (-{} penalty): {}\n",
            self.negative_penalty.abs(),
            self.negative.join(", ")
        ));
        out.push_str(&format!("- Minimum score to apply: {}", self.min_score));
        out
    }
}

fn weighted(terms: &[&str], weight: i32) -> Vec<WeightedKeyword> {
    terms
        .iter()
        .map(|t| WeightedKeyword::new(t, weight))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    BlacklistedCompany,
    NegativeKeywords,
    ScoreTooLow,
    Passed,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlacklistedCompany => "blacklisted_company",
            Self::NegativeKeywords => "negative_keywords",
            Self::ScoreTooLow => "score_too_low",
            Self::Passed => "passed",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full analysis of one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub score: i32,
    pub threshold: i32,
    pub matched_required: Vec<String>,
    pub matched_bonus: Vec<String>,
    pub matched_negative: Vec<String>,
    pub experience_matched: bool,
    pub remote: bool,
    pub is_blacklisted: bool,
    pub rejection_reason: RejectionReason,
}

impl JobAnalysis {
    pub fn should_apply(&self) -> bool {
        self.rejection_reason == RejectionReason::Passed
    }

    /// True when no keyword, experience pattern or remote hint matched, so the
    /// score says nothing about the listing.
    pub fn matched_nothing(&self) -> bool {
        self.matched_required.is_empty()
            && self.matched_bonus.is_empty()
            && self.matched_negative.is_empty()
            && !self.experience_matched
            && !self.remote
    }

    pub fn recommendation(&self) -> String {
        let score = self.score;
        match self.rejection_reason {
            RejectionReason::BlacklistedCompany => "SKIP (blacklisted company)".to_string(),
            RejectionReason::NegativeKeywords => {
                format!("SKIP (negative keywords, score: {score})")
            }
            RejectionReason::ScoreTooLow => {
                format!("SKIP (score {score} < min {})", self.threshold)
            }
            RejectionReason::Passed if score < 50 => format!("MAYBE (score: {score})"),
            RejectionReason::Passed if score < 70 => format!("GOOD MATCH (score: {score})"),
            RejectionReason::Passed => format!("EXCELLENT MATCH (score: {score})"),
        }
    }

    /// Multi-line report printed by the `score` command.
    pub fn report(&self) -> String {
        let list = |items: &[String]| {
            if items.is_empty() {
                "None".to_string()
            } else {
                items.join(", ")
            }
        };
        let mut lines = vec![
            format!("Score: {}", self.score),
            format!("Recommendation: {}", self.recommendation()),
            format!(
                "Should Apply: {}",
                if self.should_apply() { "Yes" } else { "No" }
            ),
            String::new(),
            format!(
                "Matched Required Keywords: {}",
                list(&self.matched_required)
            ),
            format!("Matched Bonus Keywords: {}", list(&self.matched_bonus)),
        ];
        if !self.matched_negative.is_empty() {
            lines.push(format!(
                "WARNING - Negative Keywords Found: {}",
                self.matched_negative.join(", ")
            ));
        }
        if self.is_blacklisted {
            lines.push("WARNING: Company is blacklisted!".to_string());
        }
        lines.join("\n")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The job scorer trait. Implement this to swap scoring backends without
/// touching the search/apply pipeline.
///
/// Carried in `AppState` as `Arc<dyn JobScorer>`.
pub trait JobScorer: Send + Sync {
    fn analyze(&self, listing: &JobListing) -> JobAnalysis;
}
