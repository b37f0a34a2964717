//! Agent Capability Registry
//!
//! Static catalogue of the agents the router can dispatch to. Each agent has a
//! capability set, the domains it operates in, and the keyword triggers used by
//! keyword-based candidate matching. The registry is built once at startup and
//! never mutated afterwards.

mod builtin;

use crate::config::{validate_agent_id, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

pub use builtin::builtin_agents;

/// Static description of one agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentCapability {
    /// Agent identifier (must match [a-zA-Z0-9._-]+)
    pub id: String,
    /// What the agent can do
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    /// Areas the agent operates in
    #[serde(default)]
    pub domains: BTreeSet<String>,
    /// Keyword triggers (matched case-insensitively)
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl AgentCapability {
    /// Create an agent with no capabilities, domains or keywords
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: BTreeSet::new(),
            domains: BTreeSet::new(),
            keywords: BTreeSet::new(),
        }
    }

    /// Builder method to set capabilities
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set domains
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set keyword triggers
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    fn normalized(mut self) -> Self {
        self.keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }
}

/// Immutable registry of agent capabilities, in declaration order
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    agents: Vec<AgentCapability>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Build a registry, rejecting invalid or duplicate agent ids
    pub fn new(agents: Vec<AgentCapability>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(agents.len());
        let mut normalized = Vec::with_capacity(agents.len());

        for agent in agents {
            validate_agent_id(&agent.id)?;
            if index.contains_key(&agent.id) {
                return Err(ConfigError::InvalidConfig(format!(
                    "Duplicate agent id '{}' in capability registry",
                    agent.id
                )));
            }
            index.insert(agent.id.clone(), normalized.len());
            normalized.push(agent.normalized());
        }

        info!("Loaded capability registry with {} agents", normalized.len());
        Ok(Self {
            agents: normalized,
            index,
        })
    }

    /// Registry populated with the built-in agent catalogue
    pub fn builtin() -> Self {
        let agents: Vec<AgentCapability> = builtin_agents()
            .into_iter()
            .map(AgentCapability::normalized)
            .collect();
        let index = agents
            .iter()
            .enumerate()
            .map(|(i, agent)| (agent.id.clone(), i))
            .collect();
        Self { agents, index }
    }

    /// Get agent by ID
    pub fn get(&self, agent_id: &str) -> Option<&AgentCapability> {
        self.index.get(agent_id).map(|&i| &self.agents[i])
    }

    /// Whether the registry knows an agent
    pub fn contains(&self, agent_id: &str) -> bool {
        self.index.contains_key(agent_id)
    }

    /// Iterate agents in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AgentCapability> {
        self.agents.iter()
    }

    /// Get count of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
