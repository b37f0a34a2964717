//! Agent Router
//!
//! Intelligent routing and predictive orchestration for multi-agent
//! workflows. Given a free-text request and the current workflow context, the
//! router decides which agents should handle it, how they collaborate, and
//! how confident that decision is. A separate prediction engine anticipates
//! the next agent, follow-up artifacts, validation checks and bottlenecks.
//!
//! # Overview
//!
//! - [`registry`]: static agent capability catalogue
//! - [`parser`]: intent, entity and keyword extraction behind a pluggable
//!   [`IntentClassifier`]
//! - [`routing`]: candidate matching, aggregation, confidence scoring and the
//!   [`IntelligentRouter`] facade
//! - [`history`]: bounded routing log and pattern learning
//! - [`prediction`]: transition model, artifacts, bottlenecks, suggestions
//!
//! # Quick Start
//!
//! ```rust
//! use agent_router::{IntelligentRouter, Outcome, WorkflowContext};
//!
//! let router = IntelligentRouter::default();
//! let context = WorkflowContext::new().with_phase("discovery");
//!
//! let routed = router.route("Create a PRD for checkout flow", &context);
//! assert_eq!(routed.decision.primary().unwrap().agent, "pm");
//!
//! // Later, once the orchestrator knows how it went
//! router
//!     .update_outcome(routed.handle, Outcome::Success, None)
//!     .unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod observability;
pub mod parser;
pub mod prediction;
pub mod registry;
pub mod routing;

pub use config::{ConfigError, RouterConfig};
pub use context::WorkflowContext;
pub use error::{RouterError, RouterResult};
pub use history::{HistoryHandle, HistorySnapshot, Outcome, Pattern, RoutingStatistics};
pub use parser::{Clarity, Entity, InputParser, Intent, IntentClassifier, ParsedInput};
pub use prediction::{PredictionEngine, Suggestion, WorkflowSignal};
pub use registry::{AgentCapability, CapabilityRegistry};
pub use routing::{
    CollaborationMode, IntelligentRouter, Role, RoutedDecision, RoutingAction, RoutingDecision,
};
