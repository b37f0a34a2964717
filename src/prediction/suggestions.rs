//! Proactive suggestions and acceptance tracking
//!
//! Every suggestion carries a type key. Callers report whether the user
//! accepted it, and the per-key acceptance ratio feeds back into ranking:
//! `rank = 0.5 * severity weight + 0.5 * acceptance ratio`.

use super::bottlenecks::{Bottleneck, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ratio assumed for suggestion types with no feedback yet
pub const NEUTRAL_ACCEPTANCE: f64 = 0.5;

/// Type key of hand-off suggestions
pub const NEXT_AGENT_SUGGESTION: &str = "next-agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    /// Raised by a bottleneck signature
    Warning,
    /// Hand-off hint from the transition model
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Acceptance-tracking key: a bottleneck name or `"next-agent"`
    pub kind: String,
    pub category: SuggestionCategory,
    pub severity: Severity,
    pub message: String,
    pub recommended_agent: String,
    pub rank_score: f64,
}

impl Suggestion {
    pub fn from_bottleneck(bottleneck: Bottleneck) -> Self {
        Self {
            kind: bottleneck.name,
            category: SuggestionCategory::Warning,
            severity: bottleneck.severity,
            message: bottleneck.message,
            recommended_agent: bottleneck.recommended_agent,
            rank_score: 0.0,
        }
    }

    pub fn next_agent(current: &str, next: &str, probability: f64) -> Self {
        Self {
            kind: NEXT_AGENT_SUGGESTION.to_string(),
            category: SuggestionCategory::Info,
            severity: Severity::Info,
            message: format!(
                "{next} usually follows {current} ({:.0}% of hand-offs)",
                probability * 100.0
            ),
            recommended_agent: next.to_string(),
            rank_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceStats {
    pub accepted: u64,
    pub rejected: u64,
}

impl AcceptanceStats {
    pub fn total(&self) -> u64 {
        self.accepted + self.rejected
    }

    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => NEUTRAL_ACCEPTANCE,
            total => self.accepted as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptanceTracker {
    stats: BTreeMap<String, AcceptanceStats>,
}

impl AcceptanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: &str, accepted: bool) -> AcceptanceStats {
        let stats = self.stats.entry(kind.to_string()).or_default();
        if accepted {
            stats.accepted += 1;
        } else {
            stats.rejected += 1;
        }
        *stats
    }

    pub fn ratio(&self, kind: &str) -> f64 {
        self.stats
            .get(kind)
            .map(AcceptanceStats::ratio)
            .unwrap_or(NEUTRAL_ACCEPTANCE)
    }

    pub fn get(&self, kind: &str) -> Option<AcceptanceStats> {
        self.stats.get(kind).copied()
    }

    pub fn ratios(&self) -> BTreeMap<String, f64> {
        self.stats
            .iter()
            .map(|(kind, stats)| (kind.clone(), stats.ratio()))
            .collect()
    }

    pub fn export(&self) -> BTreeMap<String, AcceptanceStats> {
        self.stats.clone()
    }

    pub fn import(&mut self, stats: BTreeMap<String, AcceptanceStats>) {
        self.stats = stats;
    }

    /// Score and order suggestions, best first; ties keep input order
    pub fn rank(&self, mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        for suggestion in &mut suggestions {
            suggestion.rank_score =
                0.5 * suggestion.severity.weight() + 0.5 * self.ratio(&suggestion.kind);
        }
        suggestions.sort_by(|a, b| {
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(Ordering::Equal)
        });
        suggestions
    }
}
