//! Confidence Scorer
//!
//! Combines four sub-scores into an overall confidence and maps it to the
//! action the orchestrator should take.

use super::decision::{agents_key, ActionSuggestion, ConfidenceBreakdown, RoutingAction, RoutingCandidate};
use crate::config::{ConfidenceConfig, ConfidenceWeights};
use crate::context::AnalyzedContext;
use crate::history::RoutingHistory;
use crate::parser::{Clarity, ParsedInput};

/// Historical success assumed for agent sets with no recorded outcome
pub const NEUTRAL_HISTORICAL_SUCCESS: f64 = 0.5;

const KNOWN_PHASE_RELEVANCE: f64 = 0.8;
const UNKNOWN_PHASE_RELEVANCE: f64 = 0.6;

/// Top-candidate score at which match strength saturates
const FULL_MATCH_SCORE: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    auto_route_threshold: f64,
    suggest_threshold: f64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(&ConfidenceConfig::default())
    }
}

impl ConfidenceScorer {
    pub fn new(config: &ConfidenceConfig) -> Self {
        Self {
            weights: config.weights,
            auto_route_threshold: config.auto_route_threshold,
            suggest_threshold: config.suggest_threshold,
        }
    }

    /// Score a ranked candidate list
    pub fn score(
        &self,
        parsed: &ParsedInput,
        candidates: &[RoutingCandidate],
        context: &AnalyzedContext,
        history: &RoutingHistory,
    ) -> ConfidenceBreakdown {
        let intent_clarity = match parsed.clarity {
            Clarity::High => 1.0,
            Clarity::Medium => 0.7,
            Clarity::Low => 0.3,
        };

        let agent_match_strength = candidates
            .first()
            .map(|top| (top.score / FULL_MATCH_SCORE).min(1.0))
            .unwrap_or(0.0);

        let context_relevance = if context.has_known_phase() {
            KNOWN_PHASE_RELEVANCE
        } else {
            UNKNOWN_PHASE_RELEVANCE
        };

        let historical_success = history
            .success_rate_for(&agents_key(candidates))
            .unwrap_or(NEUTRAL_HISTORICAL_SUCCESS);

        self.combine(
            intent_clarity,
            agent_match_strength,
            context_relevance,
            historical_success,
        )
    }

    /// Weighted sum of sub-scores, clamped to [0, 1]
    pub fn combine(
        &self,
        intent_clarity: f64,
        agent_match_strength: f64,
        context_relevance: f64,
        historical_success: f64,
    ) -> ConfidenceBreakdown {
        let w = &self.weights;
        let overall = w.intent_clarity * intent_clarity
            + w.agent_match_strength * agent_match_strength
            + w.context_relevance * context_relevance
            + w.historical_success * historical_success;

        ConfidenceBreakdown {
            intent_clarity,
            agent_match_strength,
            context_relevance,
            historical_success,
            overall: overall.clamp(0.0, 1.0),
        }
    }

    pub fn action_for(&self, overall: f64) -> RoutingAction {
        if overall >= self.auto_route_threshold {
            RoutingAction::AutoRoute
        } else if overall >= self.suggest_threshold {
            RoutingAction::Suggest
        } else {
            RoutingAction::Confirm
        }
    }

    pub fn recommend(&self, overall: f64) -> ActionSuggestion {
        self.action_for(overall).into()
    }
}
