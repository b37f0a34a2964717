//! Thread-safe router metrics
//!
//! Each router owns its own [`RouterMetrics`]; counters are atomics so they
//! can be bumped through a shared reference from concurrent callers.

use crate::history::Outcome;
use crate::routing::RoutingAction;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub struct RouterMetrics {
    routings: AtomicU64,
    auto_routed: AtomicU64,
    suggested: AtomicU64,
    confirmed: AtomicU64,
    empty_decisions: AtomicU64,
    rejected_inputs: AtomicU64,

    successful_outcomes: AtomicU64,
    failed_outcomes: AtomicU64,
    stale_handles: AtomicU64,
    patterns_learned: AtomicU64,

    started_at: u64,
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self {
            routings: AtomicU64::new(0),
            auto_routed: AtomicU64::new(0),
            suggested: AtomicU64::new(0),
            confirmed: AtomicU64::new(0),
            empty_decisions: AtomicU64::new(0),
            rejected_inputs: AtomicU64::new(0),
            successful_outcomes: AtomicU64::new(0),
            failed_outcomes: AtomicU64::new(0),
            stale_handles: AtomicU64::new(0),
            patterns_learned: AtomicU64::new(0),
            started_at: current_timestamp(),
        }
    }

    pub fn routing_completed(&self, action: RoutingAction, empty: bool) {
        self.routings.fetch_add(1, Ordering::Relaxed);
        let counter = match action {
            RoutingAction::AutoRoute => &self.auto_routed,
            RoutingAction::Suggest => &self.suggested,
            RoutingAction::Confirm => &self.confirmed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_decisions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn input_rejected(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn outcome_recorded(&self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.successful_outcomes.fetch_add(1, Ordering::Relaxed),
            Outcome::Failure => self.failed_outcomes.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn stale_handle(&self) {
        self.stale_handles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pattern_learned(&self) {
        self.patterns_learned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        MetricsSnapshot {
            routings: self.routings.load(Ordering::Relaxed),
            auto_routed: self.auto_routed.load(Ordering::Relaxed),
            suggested: self.suggested.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            empty_decisions: self.empty_decisions.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            successful_outcomes: self.successful_outcomes.load(Ordering::Relaxed),
            failed_outcomes: self.failed_outcomes.load(Ordering::Relaxed),
            stale_handles: self.stale_handles.load(Ordering::Relaxed),
            patterns_learned: self.patterns_learned.load(Ordering::Relaxed),
            uptime_seconds: now.saturating_sub(self.started_at),
            timestamp: now,
        }
    }

    /// Reset all counters (useful for testing)
    pub fn reset(&self) {
        for counter in [
            &self.routings,
            &self.auto_routed,
            &self.suggested,
            &self.confirmed,
            &self.empty_decisions,
            &self.rejected_inputs,
            &self.successful_outcomes,
            &self.failed_outcomes,
            &self.stale_handles,
            &self.patterns_learned,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub routings: u64,
    pub auto_routed: u64,
    pub suggested: u64,
    pub confirmed: u64,
    pub empty_decisions: u64,
    pub rejected_inputs: u64,
    pub successful_outcomes: u64,
    pub failed_outcomes: u64,
    pub stale_handles: u64,
    pub patterns_learned: u64,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
