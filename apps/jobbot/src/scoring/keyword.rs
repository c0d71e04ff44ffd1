use std::sync::Arc;

use crate::models::JobListing;
use crate::scoring::{JobAnalysis, JobScorer, RejectionReason, ScoringConfig, WeightedKeyword};

/// Pure-Rust keyword scorer. Fast, deterministic, no LLM call.
///
/// Algorithm, over lowercase `"{title} {text}"` with substring containment:
/// 1. + weight for each matched required keyword
/// 2. + weight for each matched bonus keyword
/// 3. + experience bonus if any experience pattern matches
/// 4. + remote bonus if "remote" appears
/// 5. − penalty once if any negative keyword matches
///
/// No clamping or normalization.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    config: Arc<ScoringConfig>,
}

impl KeywordScorer {
    pub fn new(config: Arc<ScoringConfig>) -> Self {
        Self { config }
    }

    /// `company` is only checked against the blacklist; keywords are matched in
    /// the title and description.
    fn analyze_text(&self, title: &str, company: &str, description: &str) -> JobAnalysis {
        let config = &self.config;
        let text = format!("{title} {description}").to_lowercase();

        let matched_required = matched_terms(&config.required, &text);
        let matched_bonus = matched_terms(&config.bonus, &text);
        let matched_negative: Vec<String> = config
            .negative
            .iter()
            .filter(|kw| contains(&text, kw))
            .cloned()
            .collect();
        let experience_matched = config
            .experience_patterns
            .iter()
            .any(|p| contains(&text, p));
        let remote = text.contains("remote");

        let mut score: i32 = matched_required.iter().map(|k| k.weight).sum::<i32>()
            + matched_bonus.iter().map(|k| k.weight).sum::<i32>();
        if experience_matched {
            score += config.experience_bonus;
        }
        if remote {
            score += config.remote_bonus;
        }
        if !matched_negative.is_empty() {
            score -= config.negative_penalty.abs();
        }

        let is_blacklisted = config.is_blacklisted(company);
        let rejection_reason = if is_blacklisted {
            RejectionReason::BlacklistedCompany
        } else if score < config.min_score && !matched_negative.is_empty() {
            RejectionReason::NegativeKeywords
        } else if score < config.min_score {
            RejectionReason::ScoreTooLow
        } else {
            RejectionReason::Passed
        };

        JobAnalysis {
            score,
            threshold: config.min_score,
            matched_required: matched_required
                .into_iter()
                .map(|k| k.term.clone())
                .collect(),
            matched_bonus: matched_bonus.into_iter().map(|k| k.term.clone()).collect(),
            matched_negative,
            experience_matched,
            remote,
            is_blacklisted,
            rejection_reason,
        }
    }
}

impl JobScorer for KeywordScorer {
    fn analyze(&self, listing: &JobListing) -> JobAnalysis {
        self.analyze_text(&listing.title, &listing.company, &listing.analysis_text())
    }
}

fn matched_terms<'a>(keywords: &'a [WeightedKeyword], text: &str) -> Vec<&'a WeightedKeyword> {
    keywords
        .iter()
        .filter(|k| contains(text, &k.term))
        .collect()
}

/// `text` must already be lowercase.
fn contains(text: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    !term.is_empty() && text.contains(&term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_scorer() -> KeywordScorer {
        let config = ScoringConfig::keywords_only(
            vec![
                WeightedKeyword::new("backend", 8),
                WeightedKeyword::new("node", 8),
            ],
            vec![WeightedKeyword::new("remote", 4)],
            vec!["manager".to_string()],
            -50,
        );
        KeywordScorer::new(Arc::new(config))
    }

    fn listing(title: &str, description: &str) -> JobListing {
        let mut job = JobListing::new("linkedin", "Acme", title);
        job.description = description.to_string();
        job
    }

    #[test]
    fn test_positive_keywords_sum() {
        let scorer = example_scorer();
        let analysis = scorer.analyze(&listing("", "backend node remote"));
        assert_eq!(analysis.score, 20);
    }

    #[test]
    fn test_negative_keyword_subtracts_penalty() {
        let scorer = example_scorer();
        let analysis = scorer.analyze(&listing("", "backend manager"));
        assert_eq!(analysis.score, -42);
        assert_eq!(analysis.matched_negative, vec!["manager".to_string()]);
        assert_eq!(analysis.rejection_reason, RejectionReason::NegativeKeywords);
        assert!(!analysis.should_apply());
    }

    #[test]
    fn test_penalty_applied_once_for_multiple_negative_matches() {
        let config = ScoringConfig::keywords_only(
            vec![WeightedKeyword::new("backend", 8)],
            vec![],
            vec!["manager".to_string(), "sales".to_string()],
            50,
        );
        let scorer = KeywordScorer::new(Arc::new(config));
        let analysis = scorer.analyze(&listing("Backend", "sales manager"));
        assert_eq!(analysis.score, 8 - 50);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let scorer = example_scorer();
        let analysis = scorer.analyze(&listing("BACKEND Engineer", "Node, REMOTE"));
        assert_eq!(analysis.score, 20);
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = KeywordScorer::new(Arc::new(ScoringConfig::default()));
        let job = listing(
            "Senior Backend Engineer",
            "Node.js, TypeScript, AWS Lambda, remote-first startup, 3+ years",
        );
        let first = scorer.analyze(&job);
        for _ in 0..5 {
            let again = scorer.analyze(&job);
            assert_eq!(again.score, first.score);
            assert_eq!(again.matched_required, first.matched_required);
        }
    }

    #[test]
    fn test_default_config_adds_experience_and_remote_bonus() {
        let config = ScoringConfig {
            required: vec![WeightedKeyword::new("backend", 8)],
            bonus: vec![],
            ..ScoringConfig::default()
        };
        let scorer = KeywordScorer::new(Arc::new(config));
        let analysis = scorer.analyze(&listing("Senior Backend Engineer", "fully remote"));
        // 8 (backend) + 10 (senior) + 5 (remote)
        assert_eq!(analysis.score, 23);
        assert!(analysis.experience_matched);
        assert!(analysis.remote);
    }

    #[test]
    fn test_below_threshold_is_skipped() {
        let scorer = example_scorer();
        let analysis = scorer.analyze(&listing("", "backend"));
        assert_eq!(analysis.score, 8);
        assert_eq!(analysis.rejection_reason, RejectionReason::ScoreTooLow);
    }

    #[test]
    fn test_at_threshold_passes() {
        let mut config = ScoringConfig::keywords_only(
            vec![WeightedKeyword::new("backend", 30)],
            vec![],
            vec![],
            50,
        );
        config.min_score = 30;
        let scorer = KeywordScorer::new(Arc::new(config));
        let analysis = scorer.analyze(&listing("Backend", ""));
        assert!(analysis.should_apply());
    }

    #[test]
    fn test_blacklisted_company_is_rejected_regardless_of_score() {
        let config = ScoringConfig {
            blacklisted_companies: vec!["Acme".to_string()],
            ..ScoringConfig::default()
        };
        let scorer = KeywordScorer::new(Arc::new(config));
        let analysis = scorer.analyze(&listing(
            "Senior Backend Engineer",
            "node typescript aws golang graphql remote",
        ));
        assert!(analysis.score >= 30);
        assert!(analysis.is_blacklisted);
        assert_eq!(
            analysis.rejection_reason,
            RejectionReason::BlacklistedCompany
        );
    }

    #[test]
    fn test_negative_listing_bounded_by_positive_minus_penalty() {
        let scorer = example_scorer();
        let analysis = scorer.analyze(&listing("", "backend node remote manager"));
        let positive: i32 = 8 + 8 + 4;
        assert!(analysis.score <= positive - 50);
    }

    #[test]
    fn test_blank_keyword_never_matches() {
        let config = ScoringConfig::keywords_only(
            vec![WeightedKeyword::new("  ", 8)],
            vec![],
            vec![],
            50,
        );
        let scorer = KeywordScorer::new(Arc::new(config));
        let analysis = scorer.analyze(&listing("Anything", "at all"));
        assert_eq!(analysis.score, 0);
        assert!(analysis.matched_nothing());
    }

    #[test]
    fn test_company_name_is_only_checked_against_blacklist() {
        let scorer = example_scorer();
        let mut job = listing("Chef", "Cooking for the team");
        job.company = "Backend Remote Labs".to_string();
        let analysis = scorer.analyze(&job);
        assert_eq!(analysis.score, 0);
        assert!(analysis.matched_nothing());
    }
}
