//! Prediction Engine
//!
//! Anticipates what happens after a routing decision is acted upon: the next
//! agent (a phase-scoped first-order transition model), follow-up artifacts,
//! validation checks, and workflow bottlenecks. Suggestions are ranked by how
//! often users accepted suggestions of the same kind.

pub mod artifacts;
pub mod bottlenecks;
pub mod engine;
pub mod suggestions;
pub mod transitions;

pub use artifacts::{ArtifactPrediction, ValidationTrigger};
pub use bottlenecks::{Bottleneck, Severity, WorkflowSignal};
pub use engine::{PredictionEngine, PredictionSnapshot, PredictionStatistics};
pub use suggestions::{AcceptanceStats, AcceptanceTracker, Suggestion, SuggestionCategory};
pub use transitions::{TransitionModel, TransitionPrediction, TransitionRow};
