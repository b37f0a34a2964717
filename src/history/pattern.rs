use serde::{Deserialize, Serialize};

/// Learned association between an exact input text and the agents routed to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub input: String,
    pub agents: String,
    pub context: String,
    pub success_count: u32,
    pub failure_count: u32,
    /// Always within [0, 1]
    pub strength: f64,
}

impl Pattern {
    pub(crate) fn new(input: &str, agents: &str, context: &str, strength: f64) -> Self {
        Self {
            input: input.to_string(),
            agents: agents.to_string(),
            context: context.to_string(),
            success_count: 0,
            failure_count: 0,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    pub(crate) fn record_success(&mut self, step: f64) {
        self.success_count += 1;
        self.strength = (self.strength + step).min(1.0);
    }

    pub(crate) fn record_failure(&mut self, step: f64) {
        self.failure_count += 1;
        self.strength = (self.strength - step).max(0.0);
    }

    pub fn total_outcomes(&self) -> u32 {
        self.success_count + self.failure_count
    }
}
