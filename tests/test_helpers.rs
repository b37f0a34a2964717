//! Test helpers and utilities for integration tests

use agent_router::config::HistoryConfig;
use agent_router::{IntelligentRouter, RouterConfig, RoutingDecision, WorkflowContext};

/// Router with the built-in registry and default configuration
#[allow(dead_code)]
pub fn test_router() -> IntelligentRouter {
    IntelligentRouter::default()
}

/// Router whose history holds at most `capacity` entries
#[allow(dead_code)]
pub fn router_with_capacity(capacity: usize) -> IntelligentRouter {
    let config = RouterConfig {
        history: HistoryConfig {
            capacity,
            ..HistoryConfig::default()
        },
        ..RouterConfig::default()
    };
    IntelligentRouter::new(config).expect("valid test configuration")
}

/// Context in the given phase with no other state
#[allow(dead_code)]
pub fn phase(phase: &str) -> WorkflowContext {
    WorkflowContext::new().with_phase(phase)
}

/// `(agent, final role)` pairs in rank order
#[allow(dead_code)]
pub fn ranked(decision: &RoutingDecision) -> Vec<(String, String)> {
    decision
        .agents
        .iter()
        .map(|c| (c.agent.clone(), c.final_role.to_string()))
        .collect()
}
