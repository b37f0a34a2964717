//! Routing decision types
//!
//! A [`RoutingDecision`] is the output of one `route()` call: the ranked
//! candidate agents, how they should collaborate, the confidence breakdown
//! and the recommended action.

use crate::history::HistoryHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role a candidate plays in handling a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Secondary,
    Background,
}

impl Role {
    /// Ranking priority (higher ranks first)
    pub fn priority(&self) -> u8 {
        match self {
            Role::Primary => 3,
            Role::Secondary => 2,
            Role::Background => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
            Role::Background => "background",
        })
    }
}

/// One proposal from a matching strategy, before aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    pub agent: String,
    pub role: Role,
    pub reason: String,
    pub score: f64,
}

impl CandidateMatch {
    /// Match with the default score of 1
    pub fn new(agent: impl Into<String>, role: Role, reason: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            role,
            reason: reason.into(),
            score: 1.0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score.max(0.0);
        self
    }
}

/// An agent proposed by one or more strategies, after aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingCandidate {
    pub agent: String,
    /// Every role any strategy assigned
    pub roles: BTreeSet<Role>,
    /// Reasons in the order strategies produced them
    pub reasons: Vec<String>,
    pub score: f64,
    /// Highest-priority role held
    pub final_role: Role,
}

impl RoutingCandidate {
    pub fn is_primary(&self) -> bool {
        self.final_role == Role::Primary
    }
}

/// How selected agents are invoked relative to one another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationMode {
    Sequential,
    Parallel,
    /// A quality gate (oracle or validator) must sign off
    Gated,
}

impl fmt::Display for CollaborationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollaborationMode::Sequential => "sequential",
            CollaborationMode::Parallel => "parallel",
            CollaborationMode::Gated => "gated",
        })
    }
}

/// Weighted confidence sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub intent_clarity: f64,
    pub agent_match_strength: f64,
    pub context_relevance: f64,
    pub historical_success: f64,
    pub overall: f64,
}

/// What the orchestrator should do with a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    AutoRoute,
    Suggest,
    Confirm,
}

impl RoutingAction {
    pub fn message(&self) -> &'static str {
        match self {
            RoutingAction::AutoRoute => "High confidence: routing automatically",
            RoutingAction::Suggest => {
                "Moderate confidence: suggested routing, confirm or adjust before proceeding"
            }
            RoutingAction::Confirm => {
                "Low confidence: please confirm the agent selection before proceeding"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSuggestion {
    pub action: RoutingAction,
    pub message: String,
}

impl From<RoutingAction> for ActionSuggestion {
    fn from(action: RoutingAction) -> Self {
        Self {
            action,
            message: action.message().to_string(),
        }
    }
}

/// Output of one routing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Primary candidates first, then by score descending
    pub agents: Vec<RoutingCandidate>,
    pub collaboration_mode: CollaborationMode,
    pub confidence: ConfidenceBreakdown,
    pub reasoning: String,
    pub suggestion: ActionSuggestion,
}

impl RoutingDecision {
    /// The top-ranked candidate, if any
    pub fn primary(&self) -> Option<&RoutingCandidate> {
        self.agents.first().filter(|c| c.is_primary())
    }

    pub fn primary_agents(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|c| c.is_primary())
            .map(|c| c.agent.as_str())
            .collect()
    }

    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|c| c.agent.as_str()).collect()
    }

    /// Comma-joined agent ids in rank order, the exact-match learning key
    pub fn agents_key(&self) -> String {
        agents_key(&self.agents)
    }

    pub fn candidate(&self, agent: &str) -> Option<&RoutingCandidate> {
        self.agents.iter().find(|c| c.agent == agent)
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

pub(crate) fn agents_key(candidates: &[RoutingCandidate]) -> String {
    candidates
        .iter()
        .map(|c| c.agent.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// A decision together with the handle used to report its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedDecision {
    pub handle: HistoryHandle,
    pub decision: RoutingDecision,
}
