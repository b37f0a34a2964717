//! Routing History and Learning Loop
//!
//! Bounded FIFO log of routing decisions. Each `record` returns a
//! [`HistoryHandle`] carrying a monotonic id; outcomes are reported against
//! that handle, so handles stay valid (or fail loudly) after older entries are
//! evicted. Successful outcomes create or strengthen a [`Pattern`] keyed by the
//! exact input text; failures only weaken existing patterns.

mod pattern;

use crate::config::HistoryConfig;
use crate::error::{RouterError, RouterResult};
use crate::routing::{CollaborationMode, RoutingDecision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, info, warn};

pub use pattern::Pattern;

/// Opaque reference to a recorded routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryHandle(u64);

impl HistoryHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HistoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observed result of acting on a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingHistoryEntry {
    pub handle: HistoryHandle,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    /// Comma-joined agent ids in rank order
    pub agents: String,
    pub mode: CollaborationMode,
    pub confidence: f64,
    /// Workflow phase at routing time
    pub context: String,
    pub outcome: Option<Outcome>,
    pub feedback: Option<Value>,
}

/// Aggregate view of the history buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStatistics {
    pub total_routings: usize,
    pub successful_routings: usize,
    pub failed_routings: usize,
    pub pending_routings: usize,
    /// Successes over all retained routings
    pub success_rate: f64,
    pub average_confidence: f64,
    pub patterns_learned: usize,
}

/// Serializable copy of history state for caller-managed persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub entries: Vec<RoutingHistoryEntry>,
    /// Sorted by input
    pub patterns: Vec<Pattern>,
    pub next_handle: u64,
}

/// Highest `next_handle` accepted on import
///
/// Leaves 2^63 handles of headroom so `record` never overflows.
pub const HANDLE_LIMIT: u64 = i64::MAX as u64;

#[derive(Debug, Clone)]
pub struct RoutingHistory {
    entries: VecDeque<RoutingHistoryEntry>,
    patterns: HashMap<String, Pattern>,
    capacity: usize,
    next_handle: u64,
    initial_strength: f64,
    step: f64,
}

impl Default for RoutingHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl RoutingHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            patterns: HashMap::new(),
            capacity: config.capacity.max(1),
            next_handle: 0,
            initial_strength: config.pattern_initial_strength,
            step: config.pattern_step,
        }
    }

    /// Append a decision with no outcome, evicting the oldest entry when full
    pub fn record(&mut self, input: &str, decision: &RoutingDecision, phase: &str) -> HistoryHandle {
        let handle = HistoryHandle(self.next_handle);
        self.next_handle += 1;

        self.entries.push_back(RoutingHistoryEntry {
            handle,
            timestamp: Utc::now(),
            input: input.to_string(),
            agents: decision.agents_key(),
            mode: decision.collaboration_mode,
            confidence: decision.confidence.overall,
            context: phase.to_string(),
            outcome: None,
            feedback: None,
        });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("Evicted routing history entry {}", evicted.handle);
            }
        }

        handle
    }

    /// Set the outcome of a recorded decision and learn from it
    ///
    /// Only the first report for an entry adjusts its pattern. Later reports
    /// overwrite the stored outcome and feedback but learn nothing.
    ///
    /// Returns the pattern for the entry's input, if one exists. Fails for
    /// handles that were never issued or have been evicted.
    pub fn update_outcome(
        &mut self,
        handle: HistoryHandle,
        outcome: Outcome,
        feedback: Option<Value>,
    ) -> RouterResult<Option<Pattern>> {
        let position = self.position(handle).ok_or_else(|| {
            warn!("Outcome reported for unknown history handle {}", handle);
            RouterError::index_out_of_range(handle.0, self.oldest_handle(), self.next_handle)
        })?;

        let entry = &mut self.entries[position];
        let previous = entry.outcome.replace(outcome);
        entry.feedback = feedback;
        let entry = entry.clone();

        if let Some(previous) = previous {
            debug!(
                "Entry {} already resolved as {:?}; recording {:?} without learning",
                handle, previous, outcome
            );
            return Ok(self.patterns.get(&entry.input).cloned());
        }

        Ok(self.learn(&entry, outcome))
    }

    fn learn(&mut self, entry: &RoutingHistoryEntry, outcome: Outcome) -> Option<Pattern> {
        match outcome {
            Outcome::Success => {
                let initial_strength = self.initial_strength;
                let pattern = self.patterns.entry(entry.input.clone()).or_insert_with(|| {
                    info!("Learned new routing pattern for input '{}'", entry.input);
                    Pattern::new(&entry.input, &entry.agents, &entry.context, initial_strength)
                });
                pattern.record_success(self.step);
                Some(pattern.clone())
            }
            // Failures never seed new patterns
            Outcome::Failure => self.patterns.get_mut(&entry.input).map(|pattern| {
                pattern.record_failure(self.step);
                pattern.clone()
            }),
        }
    }

    fn position(&self, handle: HistoryHandle) -> Option<usize> {
        self.entries
            .binary_search_by_key(&handle, |entry| entry.handle)
            .ok()
    }

    fn oldest_handle(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.handle.0)
    }

    pub fn get(&self, handle: HistoryHandle) -> Option<&RoutingHistoryEntry> {
        self.position(handle).map(|i| &self.entries[i])
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &RoutingHistoryEntry> {
        self.entries.iter()
    }

    pub fn pattern(&self, input: &str) -> Option<&Pattern> {
        self.patterns.get(input)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Success ratio over completed entries routed to exactly this agent list
    ///
    /// `None` when no entry with this agent list has an outcome yet.
    pub fn success_rate_for(&self, agents_key: &str) -> Option<f64> {
        let (completed, successes) = self
            .entries
            .iter()
            .filter(|entry| entry.agents == agents_key)
            .filter_map(|entry| entry.outcome)
            .fold((0usize, 0usize), |(completed, successes), outcome| {
                (
                    completed + 1,
                    successes + usize::from(outcome == Outcome::Success),
                )
            });

        (completed > 0).then(|| successes as f64 / completed as f64)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn statistics(&self) -> RoutingStatistics {
        let total = self.entries.len();
        let count = |wanted: Option<Outcome>| {
            self.entries
                .iter()
                .filter(|entry| entry.outcome == wanted)
                .count()
        };
        let successful = count(Some(Outcome::Success));
        let failed = count(Some(Outcome::Failure));

        let (success_rate, average_confidence) = if total == 0 {
            (0.0, 0.0)
        } else {
            let confidence_sum: f64 = self.entries.iter().map(|entry| entry.confidence).sum();
            (
                successful as f64 / total as f64,
                confidence_sum / total as f64,
            )
        };

        RoutingStatistics {
            total_routings: total,
            successful_routings: successful,
            failed_routings: failed,
            pending_routings: total - successful - failed,
            success_rate,
            average_confidence,
            patterns_learned: self.patterns.len(),
        }
    }

    pub fn export_data(&self) -> HistorySnapshot {
        let mut patterns: Vec<Pattern> = self.patterns.values().cloned().collect();
        patterns.sort_by(|a, b| a.input.cmp(&b.input));

        HistorySnapshot {
            entries: self.entries.iter().cloned().collect(),
            patterns,
            next_handle: self.next_handle,
        }
    }

    /// Replace state with a snapshot, keeping the newest entries that fit
    pub fn import_data(&mut self, snapshot: HistorySnapshot) -> RouterResult<()> {
        if snapshot.next_handle > HANDLE_LIMIT {
            return Err(RouterError::invalid_argument(format!(
                "history snapshot next_handle {} exceeds {}",
                snapshot.next_handle, HANDLE_LIMIT
            )));
        }
        let ordered = snapshot
            .entries
            .windows(2)
            .all(|pair| pair[0].handle < pair[1].handle);
        if !ordered {
            return Err(RouterError::invalid_argument(
                "history snapshot entries must have strictly increasing handles",
            ));
        }
        if let Some(last) = snapshot.entries.last() {
            if last.handle.0 >= snapshot.next_handle {
                return Err(RouterError::invalid_argument(format!(
                    "history snapshot next_handle {} must exceed last entry handle {}",
                    snapshot.next_handle, last.handle
                )));
            }
        }
        if let Some(bad) = snapshot
            .patterns
            .iter()
            .find(|p| !(0.0..=1.0).contains(&p.strength))
        {
            return Err(RouterError::invalid_argument(format!(
                "pattern strength {} for input '{}' is outside [0, 1]",
                bad.strength, bad.input
            )));
        }

        let mut entries: VecDeque<RoutingHistoryEntry> = snapshot.entries.into();
        while entries.len() > self.capacity {
            entries.pop_front();
        }

        info!(
            "Imported routing history: {} entries, {} patterns",
            entries.len(),
            snapshot.patterns.len()
        );

        self.entries = entries;
        self.patterns = snapshot
            .patterns
            .into_iter()
            .map(|p| (p.input.clone(), p))
            .collect();
        self.next_handle = snapshot.next_handle;
        Ok(())
    }
}
