//! Agent transition model
//!
//! A sparse first-order transition table: each row maps a `(from, phase)`
//! key to the probabilities of the next agent. A `None` phase is the
//! wildcard row used when no phase-specific row exists.
//!
//! Row invariant: every probability lies in `[min, max]` unless the row had
//! to be normalized, and every row sums to at most 1.

use crate::config::{PredictionConfig, TransitionSeed};
use crate::context::UNKNOWN;
use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

type RowKey = (String, Option<String>);

/// Slack when deciding whether an imported row is already normalized
const NORMALIZED_TOLERANCE: f64 = 1e-9;

/// One candidate next agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPrediction {
    pub agent: String,
    pub probability: f64,
}

/// Exported form of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRow {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub targets: Vec<TransitionPrediction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    rows: BTreeMap<RowKey, BTreeMap<String, f64>>,
    learning_rate: f64,
    min_probability: f64,
    max_probability: f64,
}

impl Default for TransitionModel {
    fn default() -> Self {
        Self::new(&PredictionConfig::default())
    }
}

impl TransitionModel {
    /// Seed from configuration, or the built-in table when none is configured
    pub fn new(config: &PredictionConfig) -> Self {
        let mut model = Self {
            rows: BTreeMap::new(),
            learning_rate: config.learning_rate,
            min_probability: config.min_probability,
            max_probability: config.max_probability,
        };

        let seeds = if config.transitions.is_empty() {
            builtin_transitions()
        } else {
            config.transitions.clone()
        };
        for seed in seeds {
            let key = (seed.from.to_lowercase(), phase_key(seed.phase.as_deref()));
            model
                .rows
                .entry(key)
                .or_default()
                .insert(seed.to.to_lowercase(), seed.probability);
        }

        let keys: Vec<RowKey> = model.rows.keys().cloned().collect();
        for key in keys {
            model.settle(&key);
        }
        model
    }

    /// Likely next agents, most probable first
    ///
    /// Uses the phase-specific row when one exists, else the wildcard row.
    /// Unknown agents yield an empty list.
    pub fn predict(&self, from: &str, phase: &str) -> Vec<TransitionPrediction> {
        let Some(row) = self.effective_row(&from.to_lowercase(), phase) else {
            return Vec::new();
        };

        let mut predictions: Vec<TransitionPrediction> = row
            .iter()
            .map(|(agent, &probability)| TransitionPrediction {
                agent: agent.clone(),
                probability,
            })
            .collect();
        predictions.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.agent.cmp(&b.agent))
        });
        predictions
    }

    pub fn probability(&self, from: &str, to: &str, phase: &str) -> Option<f64> {
        self.effective_row(&from.to_lowercase(), phase)
            .and_then(|row| row.get(&to.to_lowercase()).copied())
    }

    fn effective_row(&self, from: &str, phase: &str) -> Option<&BTreeMap<String, f64>> {
        phase_key(Some(phase))
            .and_then(|phase| self.rows.get(&(from.to_string(), Some(phase))))
            .or_else(|| self.rows.get(&(from.to_string(), None)))
    }

    /// Reinforce an observed transition
    ///
    /// The target moves toward 1 by the learning rate and its siblings shrink
    /// by the same factor. A known phase without its own row gets one, forked
    /// from the wildcard row, so learning stays scoped to that phase.
    pub fn observe(&mut self, from: &str, to: &str, phase: &str) {
        let from = from.to_lowercase();
        let to = to.to_lowercase();
        let key = (from.clone(), phase_key(Some(phase)));

        if !self.rows.contains_key(&key) {
            let forked = self
                .rows
                .get(&(from.clone(), None))
                .cloned()
                .unwrap_or_default();
            self.rows.insert(key.clone(), forked);
        }

        let rate = self.learning_rate;
        if let Some(row) = self.rows.get_mut(&key) {
            for (agent, probability) in row.iter_mut() {
                if *agent != to {
                    *probability *= 1.0 - rate;
                }
            }
            let target = row.entry(to.clone()).or_insert(0.0);
            *target += rate * (1.0 - *target);
        }
        self.settle(&key);

        debug!(
            "Reinforced transition {} -> {} in phase '{}': {:.3}",
            from,
            to,
            phase,
            self.rows
                .get(&key)
                .and_then(|row| row.get(&to))
                .copied()
                .unwrap_or_default()
        );
    }

    /// Clamp a row into bounds, then normalize if it sums above 1
    fn settle(&mut self, key: &RowKey) {
        let (min, max) = (self.min_probability, self.max_probability);
        if let Some(row) = self.rows.get_mut(key) {
            for probability in row.values_mut() {
                *probability = probability.clamp(min, max);
            }
            normalize(row);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn export_rows(&self) -> Vec<TransitionRow> {
        self.rows
            .iter()
            .map(|((from, phase), targets)| TransitionRow {
                from: from.clone(),
                phase: phase.clone(),
                targets: targets
                    .iter()
                    .map(|(agent, &probability)| TransitionPrediction {
                        agent: agent.clone(),
                        probability,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Replace all rows as exported
    ///
    /// Nothing is replaced unless every row passes validation. Probabilities
    /// above the ceiling, negative or non-finite values, and repeated rows or
    /// targets are rejected. A row summing to 1 may hold values below the
    /// floor, since normalization produces those, and is only normalized.
    /// Any other row is clamped and normalized as if freshly observed.
    pub fn import_rows(&mut self, rows: Vec<TransitionRow>) -> RouterResult<()> {
        let mut imported: BTreeMap<RowKey, BTreeMap<String, f64>> = BTreeMap::new();

        for row in rows {
            let key = (row.from.to_lowercase(), phase_key(row.phase.as_deref()));
            if imported.contains_key(&key) {
                return Err(RouterError::invalid_argument(format!(
                    "duplicate transition row for '{}' in phase '{}'",
                    key.0,
                    key.1.as_deref().unwrap_or(UNKNOWN)
                )));
            }

            let mut targets = BTreeMap::new();
            for target in row.targets {
                let agent = target.agent.to_lowercase();
                let probability = target.probability;
                if !probability.is_finite()
                    || probability < 0.0
                    || probability > self.max_probability
                {
                    return Err(RouterError::invalid_argument(format!(
                        "transition {} -> {} has probability {} outside [0, {}]",
                        key.0, agent, probability, self.max_probability
                    )));
                }
                if probability == 0.0 && self.min_probability > 0.0 {
                    return Err(RouterError::invalid_argument(format!(
                        "transition {} -> {} has zero probability",
                        key.0, agent
                    )));
                }
                if targets.insert(agent.clone(), probability).is_some() {
                    return Err(RouterError::invalid_argument(format!(
                        "duplicate target {} in transition row for '{}'",
                        agent, key.0
                    )));
                }
            }
            imported.insert(key, targets);
        }

        let unsettled: Vec<RowKey> = imported
            .iter_mut()
            .filter_map(|(key, row)| {
                if row.values().sum::<f64>() >= 1.0 - NORMALIZED_TOLERANCE {
                    normalize(row);
                    None
                } else {
                    Some(key.clone())
                }
            })
            .collect();

        self.rows = imported;
        for key in unsettled {
            self.settle(&key);
        }
        Ok(())
    }
}

fn normalize(row: &mut BTreeMap<String, f64>) {
    let sum: f64 = row.values().sum();
    if sum > 1.0 {
        for probability in row.values_mut() {
            *probability /= sum;
        }
    }
}

/// Lowercased phase, with blank and `"unknown"` meaning the wildcard row
fn phase_key(phase: Option<&str>) -> Option<String> {
    let phase = phase?.trim().to_lowercase();
    (!phase.is_empty() && phase != UNKNOWN).then_some(phase)
}

/// Default hand-off table between the built-in agents
pub fn builtin_transitions() -> Vec<TransitionSeed> {
    [
        ("analyst", "pm", 0.7),
        ("analyst", "architect", 0.2),
        ("pm", "architect", 0.6),
        ("pm", "sm", 0.25),
        ("pm", "analyst", 0.1),
        ("architect", "sm", 0.5),
        ("architect", "dev", 0.3),
        ("architect", "oracle", 0.15),
        ("sm", "dev", 0.8),
        ("sm", "qa", 0.1),
        ("dev", "eval", 0.6),
        ("dev", "oracle", 0.2),
        ("dev", "qa", 0.15),
        ("qa", "dev", 0.4),
        ("qa", "oracle", 0.4),
        ("eval", "dev", 0.45),
        ("eval", "oracle", 0.35),
        ("eval", "reflection", 0.15),
        ("oracle", "validator", 0.4),
        ("oracle", "dev", 0.3),
        ("oracle", "pm", 0.2),
        ("validator", "dev", 0.5),
        ("validator", "pm", 0.3),
        ("reflection", "dev", 0.5),
        ("reflection", "pm", 0.2),
        ("reflection", "architect", 0.2),
    ]
    .into_iter()
    .map(|(from, to, p)| TransitionSeed::new(from, to, p))
    .chain([
        TransitionSeed::new("dev", "eval", 0.7).in_phase("testing"),
        TransitionSeed::new("dev", "qa", 0.2).in_phase("testing"),
        TransitionSeed::new("pm", "analyst", 0.5).in_phase("discovery"),
        TransitionSeed::new("pm", "architect", 0.4).in_phase("discovery"),
    ])
    .collect()
}
