//! Intelligent Router
//!
//! Owns the capability registry, parser, confidence scorer and routing
//! history for one orchestrator. `route` runs the full pipeline:
//!
//! parse + analyze → four matching strategies → aggregate → score → record
//!
//! History is the only state mutated while routing. It sits behind a mutex
//! that is held from scoring through recording, so the historical-success
//! lookup and the append observe the same buffer.

use super::aggregator::{aggregate, build_reasoning, collaboration_mode};
use super::confidence::ConfidenceScorer;
use super::decision::{RoutedDecision, RoutingDecision};
use super::matcher::CandidateMatcher;
use crate::config::RouterConfig;
use crate::context::{analyze, json_type_name, WorkflowContext};
use crate::error::{RouterError, RouterResult};
use crate::history::{
    HistoryHandle, HistorySnapshot, Outcome, Pattern, RoutingHistory, RoutingStatistics,
};
use crate::observability::{MetricsSnapshot, RouterMetrics};
use crate::parser::{InputParser, IntentClassifier};
use crate::registry::CapabilityRegistry;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct IntelligentRouter {
    config: RouterConfig,
    registry: Arc<CapabilityRegistry>,
    parser: InputParser,
    scorer: ConfidenceScorer,
    history: Mutex<RoutingHistory>,
    metrics: RouterMetrics,
}

impl Default for IntelligentRouter {
    fn default() -> Self {
        Self::with_registry(RouterConfig::default(), CapabilityRegistry::builtin())
    }
}

impl IntelligentRouter {
    /// Build a router from validated configuration
    pub fn new(config: RouterConfig) -> RouterResult<Self> {
        config.validate()?;
        let registry = config.registry()?;
        Ok(Self::with_registry(config, registry))
    }

    /// Build a router around an explicit registry, ignoring `config.agents`
    pub fn with_registry(config: RouterConfig, registry: CapabilityRegistry) -> Self {
        info!(
            "Initializing router with {} agents, history capacity {}",
            registry.len(),
            config.history.capacity
        );

        Self {
            scorer: ConfidenceScorer::new(&config.confidence),
            history: Mutex::new(RoutingHistory::new(&config.history)),
            parser: InputParser::default(),
            registry: Arc::new(registry),
            metrics: RouterMetrics::new(),
            config,
        }
    }

    /// Replace the default keyword classifier
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.parser = InputParser::new(classifier);
        self
    }

    /// Load configuration from TOML and build the router
    pub async fn load(path: impl AsRef<Path>) -> RouterResult<Self> {
        let config = RouterConfig::load(path).await?;
        Self::new(config)
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<CapabilityRegistry> {
        Arc::clone(&self.registry)
    }

    // History is plain bookkeeping that stays consistent across a panic
    fn lock_history(&self) -> MutexGuard<'_, RoutingHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route a request. Never fails; an unmatched request yields an empty,
    /// low-confidence decision.
    pub fn route(&self, input: &str, context: &WorkflowContext) -> RoutedDecision {
        let span = crate::route_span!(input_len = input.len());
        let _guard = span.enter();

        let parsed = self.parser.parse(input);
        let analyzed = analyze(context);

        let matches = CandidateMatcher::new(&self.registry).match_all(&parsed, &analyzed);
        debug!("Strategies proposed {} candidate match(es)", matches.len());

        let agents = aggregate(matches);
        let mode = collaboration_mode(&agents);
        let reasoning = build_reasoning(&agents);

        let (handle, decision) = {
            let mut history = self.lock_history();
            let confidence = self.scorer.score(&parsed, &agents, &analyzed, &history);
            let decision = RoutingDecision {
                agents,
                collaboration_mode: mode,
                suggestion: self.scorer.recommend(confidence.overall),
                confidence,
                reasoning,
            };
            let handle = history.record(input, &decision, &analyzed.phase);
            (handle, decision)
        };

        self.metrics
            .routing_completed(decision.suggestion.action, decision.is_empty());

        info!(
            handle = handle.id(),
            agents = %decision.agents_key(),
            mode = %decision.collaboration_mode,
            confidence = decision.confidence.overall,
            action = ?decision.suggestion.action,
            "Routing decision made"
        );

        RoutedDecision { handle, decision }
    }

    /// Route untyped input, validating it at the boundary
    ///
    /// `input` must be a JSON string; `context` must be an object or null.
    pub fn route_value(&self, input: &Value, context: &Value) -> RouterResult<RoutedDecision> {
        let Some(text) = input.as_str() else {
            self.metrics.input_rejected();
            warn!("Rejected routing input of type {}", json_type_name(input));
            return Err(RouterError::invalid_argument(format!(
                "routing input must be a string, got {}",
                json_type_name(input)
            )));
        };

        let context = WorkflowContext::from_value(context).map_err(|e| {
            self.metrics.input_rejected();
            e
        })?;

        Ok(self.route(text, &context))
    }

    /// Report what happened after acting on a decision
    ///
    /// Returns the input's pattern after learning, if one exists.
    pub fn update_outcome(
        &self,
        handle: HistoryHandle,
        outcome: Outcome,
        feedback: Option<Value>,
    ) -> RouterResult<Option<Pattern>> {
        let span = crate::learning_span!(handle = handle.id(), outcome = ?outcome);
        let _guard = span.enter();

        let mut history = self.lock_history();
        let patterns_before = history.pattern_count();

        let pattern = history
            .update_outcome(handle, outcome, feedback)
            .map_err(|e| {
                self.metrics.stale_handle();
                e
            })?;

        self.metrics.outcome_recorded(outcome);
        if history.pattern_count() > patterns_before {
            self.metrics.pattern_learned();
        }
        if let Some(pattern) = &pattern {
            debug!(
                "Pattern '{}' strength now {:.2} ({} success, {} failure)",
                pattern.input, pattern.strength, pattern.success_count, pattern.failure_count
            );
        }

        Ok(pattern)
    }

    pub fn statistics(&self) -> RoutingStatistics {
        self.lock_history().statistics()
    }

    pub fn pattern(&self, input: &str) -> Option<Pattern> {
        self.lock_history().pattern(input).cloned()
    }

    pub fn history_len(&self) -> usize {
        self.lock_history().len()
    }

    pub fn export_data(&self) -> HistorySnapshot {
        self.lock_history().export_data()
    }

    pub fn import_data(&self, snapshot: HistorySnapshot) -> RouterResult<()> {
        self.lock_history().import_data(snapshot)
    }

    pub fn export_json(&self) -> RouterResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_data())?)
    }

    pub fn import_json(&self, json: &str) -> RouterResult<()> {
        let snapshot: HistorySnapshot = serde_json::from_str(json)?;
        self.import_data(snapshot)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
