//! Prediction Engine
//!
//! Runs independently of routing. The orchestrator calls it after acting on a
//! decision, keyed by the agent that just ran and the current phase.

use super::artifacts::{self, ArtifactPrediction, ValidationTrigger};
use super::bottlenecks::{self, WorkflowSignal};
use super::suggestions::{AcceptanceStats, AcceptanceTracker, Suggestion};
use super::transitions::{TransitionModel, TransitionPrediction, TransitionRow};
use crate::config::{validate_agent_id, PredictionConfig};
use crate::context::{analyze, WorkflowContext, UNKNOWN};
use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Probability at which the top successor is surfaced as a hand-off hint
pub const NEXT_AGENT_SUGGESTION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionStatistics {
    /// Observed transitions for which a prediction existed
    pub evaluated_predictions: u64,
    /// Of those, how many had the observed agent ranked first
    pub correct_predictions: u64,
    pub accuracy: f64,
    pub transition_rows: usize,
    pub acceptance_ratios: BTreeMap<String, f64>,
}

/// Serializable engine state for caller-managed persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSnapshot {
    pub transitions: Vec<TransitionRow>,
    pub acceptance: BTreeMap<String, AcceptanceStats>,
    pub evaluated_predictions: u64,
    pub correct_predictions: u64,
}

#[derive(Debug, Clone)]
pub struct PredictionEngine {
    transitions: TransitionModel,
    acceptance: AcceptanceTracker,
    evaluated_predictions: u64,
    correct_predictions: u64,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(&PredictionConfig::default())
    }
}

impl PredictionEngine {
    pub fn new(config: &PredictionConfig) -> Self {
        let transitions = TransitionModel::new(config);
        info!(
            "Initializing prediction engine with {} transition rows",
            transitions.row_count()
        );
        Self {
            transitions,
            acceptance: AcceptanceTracker::new(),
            evaluated_predictions: 0,
            correct_predictions: 0,
        }
    }

    /// Likely next agents after `from`, most probable first
    pub fn predict_next_agent(
        &self,
        from: &str,
        context: &WorkflowContext,
    ) -> Vec<TransitionPrediction> {
        let span = crate::prediction_span!(operation = "next_agent", from = from);
        let _guard = span.enter();

        let phase = analyze(context).phase;
        let predictions = self.transitions.predict(from, &phase);
        debug!(
            "{} successor(s) predicted for '{}' in phase '{}'",
            predictions.len(),
            from,
            phase
        );
        predictions
    }

    /// Artifacts likely to be needed after `producing_agent` emits `artifact_type`
    pub fn predict_artifacts(
        &self,
        artifact_type: &str,
        producing_agent: &str,
    ) -> Vec<ArtifactPrediction> {
        let span = crate::prediction_span!(operation = "artifacts", artifact = artifact_type);
        let _guard = span.enter();

        let successors = self.transitions.predict(producing_agent, UNKNOWN);
        artifacts::predict(artifact_type, producing_agent, &successors)
    }

    /// Checks that should run once `agent` hands off its work
    pub fn predict_validation_triggers(
        &self,
        agent: &str,
        context: &WorkflowContext,
    ) -> Vec<ValidationTrigger> {
        artifacts::validation_triggers(agent, &analyze(context))
    }

    /// Bottleneck warnings plus a hand-off hint, ranked by acceptance history
    pub fn generate_suggestions(&self, signal: &WorkflowSignal) -> Vec<Suggestion> {
        let span = crate::prediction_span!(operation = "suggestions");
        let _guard = span.enter();

        let mut suggestions: Vec<Suggestion> = bottlenecks::detect(signal)
            .into_iter()
            .map(Suggestion::from_bottleneck)
            .collect();

        if let Some(current) = signal.current_agent.as_deref() {
            let phase = signal.phase.as_deref().unwrap_or(UNKNOWN);
            if let Some(top) = self.transitions.predict(current, phase).first() {
                if top.probability >= NEXT_AGENT_SUGGESTION_THRESHOLD {
                    suggestions.push(Suggestion::next_agent(current, &top.agent, top.probability));
                }
            }
        }

        let ranked = self.acceptance.rank(suggestions);
        debug!("Generated {} suggestion(s)", ranked.len());
        ranked
    }

    /// Record whether the user accepted a suggestion of the given kind
    pub fn record_suggestion_feedback(&mut self, kind: &str, accepted: bool) -> AcceptanceStats {
        let stats = self.acceptance.record(kind, accepted);
        debug!(
            "Suggestion '{}' acceptance now {:.2} over {} response(s)",
            kind,
            stats.ratio(),
            stats.total()
        );
        stats
    }

    /// Learn from a real hand-off
    ///
    /// Returns whether `to` was the top prediction beforehand, or `None` when
    /// there was no prediction to evaluate.
    pub fn observe_transition(
        &mut self,
        from: &str,
        to: &str,
        context: &WorkflowContext,
    ) -> Option<bool> {
        let span = crate::learning_span!(from = from, to = to);
        let _guard = span.enter();

        let phase = analyze(context).phase;
        let correct = self
            .transitions
            .predict(from, &phase)
            .first()
            .map(|top| top.agent.eq_ignore_ascii_case(to));

        if let Some(correct) = correct {
            self.evaluated_predictions += 1;
            if correct {
                self.correct_predictions += 1;
            }
        }

        self.transitions.observe(from, to, &phase);
        correct
    }

    pub fn statistics(&self) -> PredictionStatistics {
        let accuracy = if self.evaluated_predictions == 0 {
            0.0
        } else {
            self.correct_predictions as f64 / self.evaluated_predictions as f64
        };

        PredictionStatistics {
            evaluated_predictions: self.evaluated_predictions,
            correct_predictions: self.correct_predictions,
            accuracy,
            transition_rows: self.transitions.row_count(),
            acceptance_ratios: self.acceptance.ratios(),
        }
    }

    pub fn export_data(&self) -> PredictionSnapshot {
        PredictionSnapshot {
            transitions: self.transitions.export_rows(),
            acceptance: self.acceptance.export(),
            evaluated_predictions: self.evaluated_predictions,
            correct_predictions: self.correct_predictions,
        }
    }

    /// Replace engine state with a snapshot
    pub fn import_data(&mut self, snapshot: PredictionSnapshot) -> RouterResult<()> {
        if snapshot.correct_predictions > snapshot.evaluated_predictions {
            return Err(RouterError::invalid_argument(format!(
                "correct predictions ({}) exceed evaluated predictions ({})",
                snapshot.correct_predictions, snapshot.evaluated_predictions
            )));
        }
        for row in &snapshot.transitions {
            validate_agent_id(&row.from)?;
            for target in &row.targets {
                validate_agent_id(&target.agent)?;
            }
        }

        let row_count = snapshot.transitions.len();
        self.transitions.import_rows(snapshot.transitions)?;
        info!("Imported prediction state: {} transition rows", row_count);

        self.acceptance.import(snapshot.acceptance);
        self.evaluated_predictions = snapshot.evaluated_predictions;
        self.correct_predictions = snapshot.correct_predictions;
        Ok(())
    }

    pub fn export_json(&self) -> RouterResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_data())?)
    }

    pub fn import_json(&mut self, json: &str) -> RouterResult<()> {
        let snapshot: PredictionSnapshot = serde_json::from_str(json)?;
        self.import_data(snapshot)
    }
}
