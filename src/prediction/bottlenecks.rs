//! Bottleneck detection
//!
//! A fixed catalogue of named signatures, each a predicate over a
//! [`WorkflowSignal`]. Every matching signature yields a [`Bottleneck`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Test coverage expected once a phase is complete
pub const COVERAGE_TARGET: f64 = 0.8;
pub const REVIEW_BACKLOG_LIMIT: u32 = 3;
pub const FAILURE_STREAK_LIMIT: u32 = 2;
pub const STALLED_PHASE_HOURS: f64 = 48.0;

/// Observed workflow state, all fields optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSignal {
    pub phase: Option<String>,
    /// Agent that currently holds the work
    pub current_agent: Option<String>,
    pub phase_completed: bool,
    /// Fraction in [0, 1]
    pub test_coverage: Option<f64>,
    pub pending_reviews: u32,
    pub consecutive_failures: u32,
    pub blocked_tasks: u32,
    pub hours_in_phase: Option<f64>,
    pub missing_artifacts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Ranking weight in [0, 1]
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Info => 0.4,
            Severity::Warning => 0.7,
            Severity::Critical => 1.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// Signature name, also the acceptance-tracking key
    pub name: String,
    pub severity: Severity,
    pub message: String,
    pub recommended_agent: String,
}

struct Signature {
    name: &'static str,
    severity: Severity,
    recommended_agent: &'static str,
    detect: fn(&WorkflowSignal) -> Option<String>,
}

static SIGNATURES: &[Signature] = &[
    Signature {
        name: "low-test-coverage",
        severity: Severity::Warning,
        recommended_agent: "eval",
        detect: |s| match s.test_coverage {
            Some(coverage) if s.phase_completed && coverage < COVERAGE_TARGET => Some(format!(
                "Test coverage is {:.0}% after phase completion, below the {:.0}% target",
                coverage * 100.0,
                COVERAGE_TARGET * 100.0
            )),
            _ => None,
        },
    },
    Signature {
        name: "review-backlog",
        severity: Severity::Warning,
        recommended_agent: "oracle",
        detect: |s| {
            (s.pending_reviews >= REVIEW_BACKLOG_LIMIT)
                .then(|| format!("{} reviews are waiting", s.pending_reviews))
        },
    },
    Signature {
        name: "repeated-failures",
        severity: Severity::Critical,
        recommended_agent: "reflection",
        detect: |s| {
            (s.consecutive_failures >= FAILURE_STREAK_LIMIT)
                .then(|| format!("{} consecutive failures", s.consecutive_failures))
        },
    },
    Signature {
        name: "blocked-tasks",
        severity: Severity::Warning,
        recommended_agent: "sm",
        detect: |s| {
            (s.blocked_tasks > 0).then(|| format!("{} task(s) are blocked", s.blocked_tasks))
        },
    },
    Signature {
        name: "stalled-phase",
        severity: Severity::Warning,
        recommended_agent: "pm",
        detect: |s| match s.hours_in_phase {
            Some(hours) if hours > STALLED_PHASE_HOURS => Some(format!(
                "Phase '{}' has run for {:.0} hours",
                s.phase.as_deref().unwrap_or("unknown"),
                hours
            )),
            _ => None,
        },
    },
    Signature {
        name: "missing-artifacts",
        severity: Severity::Warning,
        recommended_agent: "validator",
        detect: |s| {
            (!s.missing_artifacts.is_empty())
                .then(|| format!("Missing artifacts: {}", s.missing_artifacts.join(", ")))
        },
    },
];

/// Every catalogue signature matching the signal, in catalogue order
pub fn detect(signal: &WorkflowSignal) -> Vec<Bottleneck> {
    SIGNATURES
        .iter()
        .filter_map(|signature| {
            (signature.detect)(signal).map(|message| Bottleneck {
                name: signature.name.to_string(),
                severity: signature.severity,
                message,
                recommended_agent: signature.recommended_agent.to_string(),
            })
        })
        .collect()
}

/// Names of all catalogue signatures
pub fn signature_names() -> impl Iterator<Item = &'static str> {
    SIGNATURES.iter().map(|s| s.name)
}
