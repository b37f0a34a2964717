//! Configuration system for the routing and prediction engine
//!
//! Every section and field has a default, so an empty TOML document yields
//! [`RouterConfig::default`]. Loading always validates.
//!
//! ```toml
//! [confidence]
//! auto_route_threshold = 0.9
//! suggest_threshold = 0.7
//!
//! [confidence.weights]
//! intent_clarity = 0.40
//! agent_match_strength = 0.35
//! context_relevance = 0.15
//! historical_success = 0.10
//!
//! [history]
//! capacity = 100
//!
//! [prediction]
//! learning_rate = 0.1
//! min_probability = 0.1
//! max_probability = 0.95
//!
//! [[prediction.transitions]]
//! from = "pm"
//! to = "architect"
//! probability = 0.7
//!
//! [[agents]]
//! id = "dev"
//! capabilities = ["implementation"]
//! keywords = ["code", "bug"]
//! ```

use crate::registry::{AgentCapability, CapabilityRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Main router configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    pub confidence: ConfidenceConfig,
    pub history: HistoryConfig,
    pub prediction: PredictionConfig,
    /// Capability registry; the built-in catalogue is used when empty
    pub agents: Vec<AgentCapability>,
}

/// Confidence scoring weights and action thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub weights: ConfidenceWeights,
    /// Overall confidence at or above which the decision routes automatically
    pub auto_route_threshold: f64,
    /// Overall confidence at or above which the decision is only suggested
    pub suggest_threshold: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            auto_route_threshold: 0.9,
            suggest_threshold: 0.7,
        }
    }
}

/// Weights of the four confidence sub-scores; must sum to 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub intent_clarity: f64,
    pub agent_match_strength: f64,
    pub context_relevance: f64,
    pub historical_success: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            intent_clarity: 0.40,
            agent_match_strength: 0.35,
            context_relevance: 0.15,
            historical_success: 0.10,
        }
    }
}

impl ConfidenceWeights {
    pub fn sum(&self) -> f64 {
        self.intent_clarity
            + self.agent_match_strength
            + self.context_relevance
            + self.historical_success
    }
}

/// Routing history and pattern learning settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Ring buffer capacity (oldest entries evicted first)
    pub capacity: usize,
    /// Strength assigned to a pattern when it is first created
    pub pattern_initial_strength: f64,
    /// Strength change per observed outcome
    pub pattern_step: f64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            pattern_initial_strength: 0.6,
            pattern_step: 0.1,
        }
    }
}

/// Prediction engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    /// How far one observed transition moves its probability toward 1
    pub learning_rate: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    /// Seed transition table; the built-in table is used when empty
    pub transitions: Vec<TransitionSeed>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            min_probability: 0.1,
            max_probability: 0.95,
            transitions: Vec::new(),
        }
    }
}

/// One seeded transition probability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionSeed {
    pub from: String,
    pub to: String,
    pub probability: f64,
    /// Phase scope; `None` applies to every phase without a specific row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl TransitionSeed {
    pub fn new(from: &str, to: &str, probability: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            probability,
            phase: None,
        }
    }

    pub fn in_phase(mut self, phase: &str) -> Self {
        self.phase = Some(phase.to_string());
        self
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid agent ID format: {0}")]
    InvalidAgentId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterConfig {
    /// Load configuration from a TOML file (blocking)
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML file as an awaited setup step
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the capability registry this configuration describes
    pub fn registry(&self) -> Result<CapabilityRegistry, ConfigError> {
        if self.agents.is_empty() {
            Ok(CapabilityRegistry::builtin())
        } else {
            CapabilityRegistry::new(self.agents.clone())
        }
    }

    /// Validate cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confidence.validate()?;
        self.history.validate()?;
        self.prediction.validate()?;

        for agent in &self.agents {
            validate_agent_id(&agent.id)?;
        }
        // Duplicate detection lives in the registry constructor
        if !self.agents.is_empty() {
            CapabilityRegistry::new(self.agents.clone())?;
        }
        Ok(())
    }
}

impl ConfidenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let weights = &self.weights;
        for (name, value) in [
            ("intent_clarity", weights.intent_clarity),
            ("agent_match_strength", weights.agent_match_strength),
            ("context_relevance", weights.context_relevance),
            ("historical_success", weights.historical_success),
        ] {
            check_unit_interval(&format!("confidence.weights.{name}"), value)?;
        }

        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::InvalidConfig(format!(
                "Confidence weights must sum to 1.0, got {sum:.6}"
            )));
        }

        check_unit_interval("confidence.auto_route_threshold", self.auto_route_threshold)?;
        check_unit_interval("confidence.suggest_threshold", self.suggest_threshold)?;
        if self.suggest_threshold > self.auto_route_threshold {
            return Err(ConfigError::InvalidConfig(format!(
                "suggest_threshold ({}) must not exceed auto_route_threshold ({})",
                self.suggest_threshold, self.auto_route_threshold
            )));
        }
        Ok(())
    }
}

impl HistoryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "history.capacity must be greater than zero".to_string(),
            ));
        }
        check_unit_interval(
            "history.pattern_initial_strength",
            self.pattern_initial_strength,
        )?;
        check_unit_interval("history.pattern_step", self.pattern_step)
    }
}

impl PredictionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "prediction.learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        check_unit_interval("prediction.min_probability", self.min_probability)?;
        check_unit_interval("prediction.max_probability", self.max_probability)?;
        if self.min_probability >= self.max_probability {
            return Err(ConfigError::InvalidConfig(format!(
                "prediction.min_probability ({}) must be below max_probability ({})",
                self.min_probability, self.max_probability
            )));
        }

        for seed in &self.transitions {
            validate_agent_id(&seed.from)?;
            validate_agent_id(&seed.to)?;
            check_unit_interval(
                &format!("transition {} -> {}", seed.from, seed.to),
                seed.probability,
            )?;
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Validate agent ID format
pub(crate) fn validate_agent_id(agent_id: &str) -> Result<(), ConfigError> {
    let valid_chars = agent_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if agent_id.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidAgentId(format!(
            "Agent ID '{agent_id}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}
