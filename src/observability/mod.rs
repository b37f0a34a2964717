//! Observability: structured logging setup and per-router metrics

pub mod logging;
pub mod metrics;

pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{MetricsSnapshot, RouterMetrics};

// Span macros for structured logging
pub use logging::{learning_span, prediction_span, route_span};
