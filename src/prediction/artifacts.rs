//! Artifact and validation predictions
//!
//! Artifacts are predicted from two sources: a fixed follow-up table keyed by
//! the artifact just produced, and the typical outputs of the agents likely
//! to act next. Validation triggers list the checks that should run once an
//! agent hands off its work.

use super::transitions::TransitionPrediction;
use crate::context::AnalyzedContext;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Discount applied to artifacts inferred from a successor's typical outputs
const SUCCESSOR_OUTPUT_WEIGHT: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPrediction {
    pub artifact: String,
    pub probability: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationTrigger {
    /// Agent that performs the check
    pub validator: String,
    pub check: String,
    pub reason: String,
}

#[rustfmt::skip]
static FOLLOW_UPS: &[(&str, &[(&str, f64)])] = &[
    ("research-report", &[("project-brief", 0.8), ("prd", 0.6)]),
    ("project-brief", &[("prd", 0.9)]),
    ("prd", &[("architecture", 0.9), ("story", 0.7), ("acceptance-criteria", 0.6)]),
    ("architecture", &[("story", 0.8), ("tech-spec", 0.7), ("adr", 0.5)]),
    ("story", &[("code", 0.9), ("test-plan", 0.6)]),
    ("code", &[("test-suite", 0.9), ("review-report", 0.7), ("documentation", 0.4)]),
    ("test-plan", &[("test-suite", 0.8)]),
    ("test-suite", &[("test-report", 0.9), ("coverage-report", 0.7)]),
    ("test-report", &[("bug-report", 0.5), ("release-notes", 0.3)]),
    ("bug-report", &[("code", 0.8), ("postmortem", 0.4)]),
    ("review-report", &[("code", 0.5), ("compliance-report", 0.4)]),
    ("postmortem", &[("lessons-learned", 0.8)]),
];

#[rustfmt::skip]
static AGENT_OUTPUTS: &[(&str, &[&str])] = &[
    ("analyst", &["research-report", "project-brief"]),
    ("pm", &["prd"]),
    ("architect", &["architecture", "tech-spec"]),
    ("sm", &["story"]),
    ("dev", &["code"]),
    ("qa", &["test-plan"]),
    ("eval", &["test-report"]),
    ("oracle", &["review-report"]),
    ("validator", &["compliance-report"]),
    ("reflection", &["postmortem"]),
];

/// Artifacts that usually follow the given one
pub fn follow_ups(artifact_type: &str) -> &'static [(&'static str, f64)] {
    FOLLOW_UPS
        .iter()
        .find(|(artifact, _)| *artifact == artifact_type)
        .map(|(_, follow_ups)| *follow_ups)
        .unwrap_or(&[])
}

/// Artifacts the agent typically produces
pub fn outputs_of(agent: &str) -> &'static [&'static str] {
    AGENT_OUTPUTS
        .iter()
        .find(|(id, _)| *id == agent)
        .map(|(_, outputs)| *outputs)
        .unwrap_or(&[])
}

/// Merge table follow-ups with successor outputs, highest probability first
///
/// Each artifact appears once with its best probability. The artifact just
/// produced is never predicted again.
pub fn predict(
    artifact_type: &str,
    producing_agent: &str,
    successors: &[TransitionPrediction],
) -> Vec<ArtifactPrediction> {
    let artifact_type = artifact_type.trim().to_lowercase();
    let mut predictions: Vec<ArtifactPrediction> = Vec::new();

    let mut offer = |artifact: &str, probability: f64, reason: String| {
        if artifact == artifact_type {
            return;
        }
        match predictions.iter_mut().find(|p| p.artifact == artifact) {
            Some(existing) if existing.probability >= probability => {}
            Some(existing) => {
                existing.probability = probability;
                existing.reason = reason;
            }
            None => predictions.push(ArtifactPrediction {
                artifact: artifact.to_string(),
                probability,
                reason,
            }),
        }
    };

    for &(artifact, probability) in follow_ups(&artifact_type) {
        offer(artifact, probability, format!("Usually follows {artifact_type}"));
    }
    for successor in successors {
        for artifact in outputs_of(&successor.agent) {
            offer(
                *artifact,
                successor.probability * SUCCESSOR_OUTPUT_WEIGHT,
                format!(
                    "{} likely hands off to {}",
                    producing_agent, successor.agent
                ),
            );
        }
    }

    predictions.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.artifact.cmp(&b.artifact))
    });
    predictions
}

/// Checks to run after `agent` finishes in the given context
pub fn validation_triggers(agent: &str, context: &AnalyzedContext) -> Vec<ValidationTrigger> {
    let trigger = |validator: &str, check: &str, reason: &str| ValidationTrigger {
        validator: validator.to_string(),
        check: check.to_string(),
        reason: reason.to_string(),
    };

    let mut triggers = match agent.to_lowercase().as_str() {
        "pm" => vec![
            trigger("validator", "prd-consistency", "PRD sections must agree with each other"),
            trigger("oracle", "requirements-review", "Requirements need independent review"),
        ],
        "architect" => vec![trigger(
            "oracle",
            "architecture-review",
            "Architecture decisions need independent review",
        )],
        "sm" => vec![trigger("validator", "story-readiness", "Stories must be ready for development")],
        "dev" => vec![
            trigger("eval", "test-suite", "Code changes must pass the test suite"),
            trigger("oracle", "code-review", "Code changes need review"),
        ],
        "qa" => vec![trigger("eval", "regression-run", "Test plans must be exercised")],
        "eval" => vec![trigger("oracle", "result-verification", "Evaluation results need verification")],
        _ => Vec::new(),
    };

    if context.has_recent_failures() {
        triggers.push(trigger(
            "reflection",
            "regression-check",
            "Recent failures must not recur",
        ));
    }
    if context.phase == "deployment" {
        triggers.push(trigger("validator", "release-gate", "Deployment requires a release gate"));
    }
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{analyze, WorkflowContext};

    fn successor(agent: &str, probability: f64) -> TransitionPrediction {
        TransitionPrediction {
            agent: agent.to_string(),
            probability,
        }
    }

    fn artifacts(predictions: &[ArtifactPrediction]) -> Vec<&str> {
        predictions.iter().map(|p| p.artifact.as_str()).collect()
    }

    #[test]
    fn test_follow_up_table_only() {
        let predictions = predict("prd", "pm", &[]);
        assert_eq!(
            artifacts(&predictions),
            vec!["architecture", "story", "acceptance-criteria"]
        );
        assert_eq!(predictions[0].reason, "Usually follows prd");
    }

    #[test]
    fn test_successor_outputs_are_discounted() {
        let predictions = predict("unknown-artifact", "sm", &[successor("dev", 0.8)]);
        assert_eq!(artifacts(&predictions), vec!["code"]);
        assert!((predictions[0].probability - 0.72).abs() < 1e-9);
        assert_eq!(predictions[0].reason, "sm likely hands off to dev");
    }

    #[test]
    fn test_duplicates_keep_best_probability() {
        // story -> code at 0.9 beats dev's 0.8 * 0.9
        let predictions = predict("story", "sm", &[successor("dev", 0.8)]);
        let code = predictions.iter().find(|p| p.artifact == "code").unwrap();
        assert_eq!(code.probability, 0.9);
        assert_eq!(predictions.iter().filter(|p| p.artifact == "code").count(), 1);
    }

    #[test]
    fn test_produced_artifact_is_not_predicted() {
        let predictions = predict("code", "dev", &[successor("dev", 0.5)]);
        assert!(predictions.iter().all(|p| p.artifact != "code"));
    }

    #[test]
    fn test_unknown_inputs_predict_nothing() {
        assert!(predict("mystery", "nobody", &[successor("ghost", 0.9)]).is_empty());
    }

    #[test]
    fn test_validation_triggers_per_agent() {
        let context = analyze(&WorkflowContext::new());
        let checks: Vec<_> = validation_triggers("dev", &context)
            .into_iter()
            .map(|t| (t.validator, t.check))
            .collect();
        assert_eq!(
            checks,
            vec![
                ("eval".to_string(), "test-suite".to_string()),
                ("oracle".to_string(), "code-review".to_string()),
            ]
        );
        assert!(validation_triggers("reflection", &context).is_empty());
    }

    #[test]
    fn test_context_adds_triggers() {
        let context = analyze(
            &WorkflowContext::new()
                .with_phase("Deployment")
                .with_failure("eval-timeout"),
        );
        let checks: Vec<_> = validation_triggers("validator", &context)
            .into_iter()
            .map(|t| t.check)
            .collect();
        assert_eq!(checks, vec!["regression-check", "release-gate"]);
    }
}
