//! Workflow context supplied by the orchestrator on every routing call
//!
//! Every field is optional. [`analyze`] substitutes documented defaults:
//! missing or blank phase and project type become `"unknown"`, missing
//! collections become empty.

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Placeholder for a phase or project type the caller did not supply
pub const UNKNOWN: &str = "unknown";

/// Caller-supplied workflow state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowContext {
    pub phase: Option<String>,
    #[serde(alias = "projectType")]
    pub project_type: Option<String>,
    #[serde(alias = "recentActivity")]
    pub recent_activity: Vec<String>,
    #[serde(alias = "activeAgents")]
    pub active_agents: BTreeSet<String>,
    /// Failure tags such as `"eval-timeout"`
    #[serde(alias = "recentFailures")]
    pub recent_failures: Vec<String>,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_project_type(mut self, project_type: impl Into<String>) -> Self {
        self.project_type = Some(project_type.into());
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.recent_activity.push(activity.into());
        self
    }

    pub fn with_active_agent(mut self, agent: impl Into<String>) -> Self {
        self.active_agents.insert(agent.into());
        self
    }

    pub fn with_failure(mut self, tag: impl Into<String>) -> Self {
        self.recent_failures.push(tag.into());
        self
    }

    /// Validate an untyped context object at the boundary
    ///
    /// `null` is treated as an empty context. Anything other than an object
    /// with the documented fields is rejected.
    pub fn from_value(value: &Value) -> RouterResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value.clone()).map_err(|e| {
                warn!("Rejected malformed workflow context: {}", e);
                RouterError::invalid_argument(format!("malformed workflow context: {e}"))
            }),
            other => Err(RouterError::invalid_argument(format!(
                "workflow context must be an object, got {}",
                json_type_name(other)
            ))),
        }
    }
}

/// Context after defaulting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedContext {
    /// Lowercased phase or `"unknown"`
    pub phase: String,
    pub project_type: String,
    pub recent_activity: Vec<String>,
    pub active_agents: BTreeSet<String>,
    pub recent_failures: Vec<String>,
}

impl AnalyzedContext {
    pub fn has_known_phase(&self) -> bool {
        self.phase != UNKNOWN
    }

    pub fn has_recent_failures(&self) -> bool {
        !self.recent_failures.is_empty()
    }
}

/// Normalize caller context. Never fails.
pub fn analyze(context: &WorkflowContext) -> AnalyzedContext {
    AnalyzedContext {
        phase: normalize_label(context.phase.as_deref()),
        project_type: normalize_label(context.project_type.as_deref()),
        recent_activity: context.recent_activity.clone(),
        active_agents: context.active_agents.clone(),
        recent_failures: context.recent_failures.clone(),
    }
}

fn normalize_label(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_lowercase(),
        _ => UNKNOWN.to_string(),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_context_defaults() {
        let analyzed = analyze(&WorkflowContext::new());

        assert_eq!(analyzed.phase, UNKNOWN);
        assert_eq!(analyzed.project_type, UNKNOWN);
        assert!(analyzed.recent_activity.is_empty());
        assert!(analyzed.active_agents.is_empty());
        assert!(!analyzed.has_recent_failures());
        assert!(!analyzed.has_known_phase());
    }

    #[test]
    fn test_phase_is_normalized() {
        let analyzed = analyze(&WorkflowContext::new().with_phase("  Development "));
        assert_eq!(analyzed.phase, "development");
        assert!(analyzed.has_known_phase());

        let blank = analyze(&WorkflowContext::new().with_phase("   "));
        assert_eq!(blank.phase, UNKNOWN);
    }

    #[test]
    fn test_builder_fields_carry_through() {
        let context = WorkflowContext::new()
            .with_project_type("greenfield")
            .with_activity("pm drafted prd")
            .with_active_agent("pm")
            .with_failure("eval-timeout");
        let analyzed = analyze(&context);

        assert_eq!(analyzed.project_type, "greenfield");
        assert_eq!(analyzed.recent_activity, vec!["pm drafted prd"]);
        assert!(analyzed.active_agents.contains("pm"));
        assert_eq!(analyzed.recent_failures, vec!["eval-timeout"]);
    }

    #[test]
    fn test_from_value_accepts_camel_case() {
        let context = WorkflowContext::from_value(&json!({
            "phase": "testing",
            "recentFailures": ["eval-timeout"],
            "activeAgents": ["dev"]
        }))
        .unwrap();

        assert_eq!(context.phase.as_deref(), Some("testing"));
        assert_eq!(context.recent_failures, vec!["eval-timeout"]);
        assert!(context.active_agents.contains("dev"));
    }

    #[test]
    fn test_from_value_null_is_empty() {
        let context = WorkflowContext::from_value(&Value::Null).unwrap();
        assert_eq!(context, WorkflowContext::default());
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let err = WorkflowContext::from_value(&json!("development")).unwrap_err();
        assert!(matches!(err, RouterError::InvalidArgument { .. }));
        assert!(err.to_string().contains("string"));

        let err = WorkflowContext::from_value(&json!({"phase": 42})).unwrap_err();
        assert!(matches!(err, RouterError::InvalidArgument { .. }));

        let err = WorkflowContext::from_value(&json!({"recent_failures": "eval"})).unwrap_err();
        assert!(matches!(err, RouterError::InvalidArgument { .. }));
    }

    #[test]
    fn test_from_value_rejects_unknown_fields() {
        let err = WorkflowContext::from_value(&json!({"phaze": "testing"})).unwrap_err();
        assert!(matches!(err, RouterError::InvalidArgument { .. }));
    }
}
