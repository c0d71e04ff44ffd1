//! Per-portal application quotas over calendar windows.
//!
//! Counters are persisted inside the tracking file; rules come from code.
//! A counter only resets when a *record* lands in a new window, so any number
//! of status checks inside one window never reset it.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Daily,
    /// Weeks start on Monday.
    Weekly,
}

impl WindowKind {
    pub fn window_start(self, today: NaiveDate) -> NaiveDate {
        match self {
            WindowKind::Daily => today,
            WindowKind::Weekly => {
                today - Duration::days(today.weekday().num_days_from_monday() as i64)
            }
        }
    }

    pub fn reset_info(self, today: NaiveDate) -> String {
        match self {
            WindowKind::Daily => "Resets at midnight".to_string(),
            WindowKind::Weekly => {
                let days = 7 - today.weekday().num_days_from_monday();
                format!("Resets in {days} day(s)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub window: WindowKind,
    pub ceiling: u32,
    /// Pause between consecutive applications on the portal.
    pub delay_secs: u64,
}

impl RateLimitRule {
    pub const fn daily(ceiling: u32, delay_secs: u64) -> Self {
        Self {
            window: WindowKind::Daily,
            ceiling,
            delay_secs,
        }
    }

    pub const fn weekly(ceiling: u32, delay_secs: u64) -> Self {
        Self {
            window: WindowKind::Weekly,
            ceiling,
            delay_secs,
        }
    }
}

/// Rule applied to portals without an explicit entry.
pub const FALLBACK_RULE: RateLimitRule = RateLimitRule::daily(25, 10);
pub const LINKEDIN_RULE: RateLimitRule = RateLimitRule::daily(1, 10);
pub const WORKATASTARTUP_RULE: RateLimitRule = RateLimitRule::weekly(1, 5);

/// Rules per portal key.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    rules: BTreeMap<String, RateLimitRule>,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new()
            .with_rule("linkedin", LINKEDIN_RULE)
            .with_rule("workatastartup", WORKATASTARTUP_RULE)
    }
}

impl RateLimitPolicy {
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, portal: &str, rule: RateLimitRule) -> Self {
        self.rules.insert(portal.to_string(), rule);
        self
    }

    pub fn rule_for(&self, portal: &str) -> RateLimitRule {
        self.rules.get(portal).copied().unwrap_or(FALLBACK_RULE)
    }
}

/// Persisted counter for one portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    #[serde(default, alias = "daily_used", alias = "weekly_used")]
    pub used: u32,
    #[serde(default, alias = "last_date", alias = "week_start")]
    pub window_start: Option<NaiveDate>,
}

impl RateLimitCounter {
    /// Applications counted against `window`; zero if the counter belongs to an older window.
    pub fn used_in(&self, window: NaiveDate) -> u32 {
        if self.window_start == Some(window) {
            self.used
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limit reached for {portal}: {used}/{ceiling} used")]
pub struct QuotaExhausted {
    pub portal: String,
    pub used: u32,
    pub ceiling: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub window: WindowKind,
    pub used: u32,
    pub ceiling: u32,
    pub remaining: u32,
    pub can_apply: bool,
    pub reset_info: String,
}

/// All persisted counters, keyed by portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateLimitLedger(BTreeMap<String, RateLimitCounter>);

impl RateLimitLedger {
    #[cfg(test)]
    pub fn counter(&self, portal: &str) -> Option<&RateLimitCounter> {
        self.0.get(portal)
    }

    pub fn status(&self, portal: &str, rule: RateLimitRule, today: NaiveDate) -> RateLimitStatus {
        let window = rule.window.window_start(today);
        let used = self
            .0
            .get(portal)
            .map(|c| c.used_in(window))
            .unwrap_or(0);
        let remaining = rule.ceiling.saturating_sub(used);
        RateLimitStatus {
            window: rule.window,
            used,
            ceiling: rule.ceiling,
            remaining,
            can_apply: remaining > 0,
            reset_info: rule.window.reset_info(today),
        }
    }

    pub fn may_apply(&self, portal: &str, rule: RateLimitRule, today: NaiveDate) -> bool {
        self.status(portal, rule, today).can_apply
    }

    /// Counts one successful application. Resets the counter first if `today`
    /// falls in a new window. Rejects the (ceiling+1)-th application of a window
    /// without touching the counter.
    pub fn record(
        &mut self,
        portal: &str,
        rule: RateLimitRule,
        today: NaiveDate,
    ) -> Result<RateLimitStatus, QuotaExhausted> {
        if !self.may_apply(portal, rule, today) {
            return Err(QuotaExhausted {
                portal: portal.to_string(),
                used: self.status(portal, rule, today).used,
                ceiling: rule.ceiling,
            });
        }

        let window = rule.window.window_start(today);
        let counter = self.0.entry(portal.to_string()).or_default();
        if counter.window_start != Some(window) {
            counter.window_start = Some(window);
            counter.used = 0;
        }
        counter.used += 1;

        Ok(self.status(portal, rule, today))
    }
}
