//! Routing pipeline
//!
//! [`IntelligentRouter::route`] turns free text plus workflow context into a
//! ranked [`RoutingDecision`]. The stages live in their own modules so they
//! can be exercised independently.

pub mod aggregator;
pub mod confidence;
pub mod decision;
pub mod matcher;
pub mod router;

pub use aggregator::{aggregate, build_reasoning, collaboration_mode};
pub use confidence::{ConfidenceScorer, NEUTRAL_HISTORICAL_SUCCESS};
pub use decision::{
    ActionSuggestion, CandidateMatch, CollaborationMode, ConfidenceBreakdown, Role,
    RoutedDecision, RoutingAction, RoutingCandidate, RoutingDecision,
};
pub use matcher::CandidateMatcher;
pub use router::IntelligentRouter;
