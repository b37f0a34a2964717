//! Candidate Matcher
//!
//! Four independent strategies each propose agents for a request:
//!
//! - **intent**: fixed `(intent, entity)` decision table
//! - **context**: fixed workflow-phase table, plus reflection on recent failures
//! - **keyword**: vocabulary overlap with each agent's keyword triggers
//! - **pattern**: repeated failure signatures in the recent failure tags
//!
//! All four always run. Proposals naming agents absent from the capability
//! registry are dropped, so an unknown reference yields no candidate rather
//! than an error.

use super::decision::{CandidateMatch, Role};
use crate::context::AnalyzedContext;
use crate::parser::{Entity, Intent, ParsedInput};
use crate::registry::CapabilityRegistry;
use tracing::debug;
use EntityCondition::{Any, NoEntities, Requires};

/// Failures mentioning the same subsystem before the pattern strategy fires
const REPEATED_FAILURE_THRESHOLD: usize = 2;

/// Keyword overlaps needed for a primary keyword match
const PRIMARY_KEYWORD_MATCHES: usize = 2;

#[derive(Debug, Clone, Copy)]
enum EntityCondition {
    Any,
    Requires(Entity),
    NoEntities,
}

impl EntityCondition {
    fn holds(&self, parsed: &ParsedInput) -> bool {
        match self {
            EntityCondition::Any => true,
            EntityCondition::Requires(entity) => parsed.has_entity(*entity),
            EntityCondition::NoEntities => parsed.entities.is_empty(),
        }
    }
}

struct IntentRule {
    intent: Intent,
    entity: EntityCondition,
    agent: &'static str,
    role: Role,
    reason: &'static str,
}

const fn rule(
    intent: Intent,
    entity: EntityCondition,
    agent: &'static str,
    role: Role,
    reason: &'static str,
) -> IntentRule {
    IntentRule {
        intent,
        entity,
        agent,
        role,
        reason,
    }
}

#[rustfmt::skip]
static INTENT_RULES: &[IntentRule] = &[
    rule(Intent::Create, Requires(Entity::Prd), "pm", Role::Primary, "Create PRD intent"),
    rule(Intent::Create, Requires(Entity::Architecture), "architect", Role::Primary, "Create architecture intent"),
    rule(Intent::Create, Requires(Entity::Story), "sm", Role::Primary, "Create story intent"),
    rule(Intent::Create, Requires(Entity::Code), "dev", Role::Primary, "Create code intent"),
    rule(Intent::Create, Requires(Entity::Tests), "eval", Role::Primary, "Create tests intent"),
    rule(Intent::Create, Requires(Entity::Documentation), "pm", Role::Secondary, "Create documentation intent"),
    rule(Intent::Create, NoEntities, "dev", Role::Secondary, "Generic creation intent"),
    rule(Intent::Validate, Any, "oracle", Role::Primary, "Validation intent"),
    rule(Intent::Validate, Any, "validator", Role::Secondary, "Validation support"),
    rule(Intent::Validate, Requires(Entity::Architecture), "architect", Role::Background, "Architecture under validation"),
    rule(Intent::Validate, Requires(Entity::Prd), "pm", Role::Background, "Requirements under validation"),
    rule(Intent::Fix, Any, "dev", Role::Primary, "Fix intent"),
    rule(Intent::Fix, Requires(Entity::Bug), "reflection", Role::Secondary, "Root-cause analysis for bug"),
    rule(Intent::Fix, Requires(Entity::Tests), "eval", Role::Secondary, "Re-run affected tests"),
    rule(Intent::Analyze, Any, "analyst", Role::Primary, "Analysis intent"),
    rule(Intent::Analyze, Requires(Entity::Code), "architect", Role::Secondary, "Code structure analysis"),
    rule(Intent::Analyze, Requires(Entity::Bug), "reflection", Role::Secondary, "Failure analysis"),
    rule(Intent::Improve, Any, "dev", Role::Primary, "Improvement intent"),
    rule(Intent::Improve, Requires(Entity::Architecture), "architect", Role::Secondary, "Architecture improvement"),
    rule(Intent::Improve, Any, "reflection", Role::Background, "Capture improvement lessons"),
    rule(Intent::Test, Any, "eval", Role::Primary, "Testing intent"),
    rule(Intent::Test, Any, "qa", Role::Secondary, "Test planning support"),
    rule(Intent::Plan, Requires(Entity::Story), "sm", Role::Primary, "Story planning intent"),
    rule(Intent::Plan, Requires(Entity::Architecture), "architect", Role::Primary, "Architecture planning intent"),
    rule(Intent::Plan, Requires(Entity::Prd), "pm", Role::Primary, "Requirements planning intent"),
    rule(Intent::Plan, NoEntities, "pm", Role::Primary, "Planning intent"),
];

struct PhaseRule {
    phase: &'static str,
    agent: &'static str,
    role: Role,
    reason: &'static str,
}

const fn phase_rule(
    phase: &'static str,
    agent: &'static str,
    role: Role,
    reason: &'static str,
) -> PhaseRule {
    PhaseRule {
        phase,
        agent,
        role,
        reason,
    }
}

#[rustfmt::skip]
static PHASE_RULES: &[PhaseRule] = &[
    phase_rule("discovery", "analyst", Role::Secondary, "Discovery phase research"),
    phase_rule("discovery", "pm", Role::Background, "Discovery phase requirements"),
    phase_rule("planning", "pm", Role::Secondary, "Planning phase ownership"),
    phase_rule("planning", "architect", Role::Secondary, "Planning phase design"),
    phase_rule("planning", "sm", Role::Background, "Planning phase backlog"),
    phase_rule("development", "dev", Role::Primary, "Development phase"),
    phase_rule("development", "eval", Role::Secondary, "Development phase evaluation"),
    phase_rule("development", "oracle", Role::Background, "Development phase quality gate"),
    phase_rule("testing", "eval", Role::Primary, "Testing phase"),
    phase_rule("testing", "qa", Role::Secondary, "Testing phase coverage"),
    phase_rule("review", "oracle", Role::Primary, "Review phase"),
    phase_rule("review", "validator", Role::Secondary, "Review phase compliance"),
    phase_rule("deployment", "validator", Role::Secondary, "Deployment readiness checks"),
    phase_rule("deployment", "dev", Role::Background, "Deployment support"),
    phase_rule("retrospective", "reflection", Role::Primary, "Retrospective phase"),
];

/// Runs every strategy against one request
#[derive(Debug, Clone, Copy)]
pub struct CandidateMatcher<'a> {
    registry: &'a CapabilityRegistry,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(registry: &'a CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Concatenated proposals of all four strategies, registered agents only
    pub fn match_all(&self, parsed: &ParsedInput, context: &AnalyzedContext) -> Vec<CandidateMatch> {
        let intent = intent_based(parsed);
        let context_matches = context_based(context);
        let keyword = keyword_based(parsed, self.registry);
        let pattern = pattern_based(context);

        debug!(
            intent = intent.len(),
            context = context_matches.len(),
            keyword = keyword.len(),
            pattern = pattern.len(),
            "Candidate strategies produced matches"
        );

        intent
            .into_iter()
            .chain(context_matches)
            .chain(keyword)
            .chain(pattern)
            .filter(|m| {
                let known = self.registry.contains(&m.agent);
                if !known {
                    debug!("Dropping match for unregistered agent '{}'", m.agent);
                }
                known
            })
            .collect()
    }
}

/// Decision-table lookup for every detected intent
pub fn intent_based(parsed: &ParsedInput) -> Vec<CandidateMatch> {
    parsed
        .intents
        .iter()
        .flat_map(|intent| {
            INTENT_RULES
                .iter()
                .filter(move |r| r.intent == *intent && r.entity.holds(parsed))
        })
        .map(|r| CandidateMatch::new(r.agent, r.role, r.reason))
        .collect()
}

/// Phase table lookup, plus reflection whenever failures are recent
pub fn context_based(context: &AnalyzedContext) -> Vec<CandidateMatch> {
    let mut matches: Vec<CandidateMatch> = PHASE_RULES
        .iter()
        .filter(|r| r.phase == context.phase)
        .map(|r| CandidateMatch::new(r.agent, r.role, r.reason))
        .collect();

    if context.has_recent_failures() {
        matches.push(CandidateMatch::new(
            "reflection",
            Role::Primary,
            "Recent failures detected",
        ));
    }
    matches
}

/// Keyword overlap per registered agent
///
/// Every (input keyword, agent keyword) pair where either contains the other
/// counts once, so repeated input keywords add weight.
pub fn keyword_based(parsed: &ParsedInput, registry: &CapabilityRegistry) -> Vec<CandidateMatch> {
    let input_keywords: Vec<String> = parsed.keywords.iter().map(|k| k.to_lowercase()).collect();

    registry
        .iter()
        .filter_map(|agent| {
            let count: usize = input_keywords
                .iter()
                .map(|word| {
                    agent
                        .keywords
                        .iter()
                        .filter(|trigger| word.contains(trigger.as_str()) || trigger.contains(word.as_str()))
                        .count()
                })
                .sum();

            if count == 0 {
                return None;
            }

            let role = if count >= PRIMARY_KEYWORD_MATCHES {
                Role::Primary
            } else {
                Role::Secondary
            };
            Some(
                CandidateMatch::new(
                    agent.id.clone(),
                    role,
                    format!("Matched {count} keyword(s)"),
                )
                .with_score(count as f64),
            )
        })
        .collect()
}

/// Repeated-failure signatures in the recent failure tags
pub fn pattern_based(context: &AnalyzedContext) -> Vec<CandidateMatch> {
    let count_tagged = |needle: &str| {
        context
            .recent_failures
            .iter()
            .filter(|tag| tag.to_lowercase().contains(needle))
            .count()
    };

    let mut matches = Vec::new();

    if count_tagged("eval") >= REPEATED_FAILURE_THRESHOLD {
        matches.extend([
            CandidateMatch::new("reflection", Role::Primary, "Repeated evaluation failures"),
            CandidateMatch::new("oracle", Role::Secondary, "Re-validate after evaluation failures"),
            CandidateMatch::new("dev", Role::Secondary, "Fix causes of evaluation failures"),
        ]);
    }

    if count_tagged("oracle") >= REPEATED_FAILURE_THRESHOLD {
        matches.extend([
            CandidateMatch::new("reflection", Role::Primary, "Repeated oracle rejections"),
            CandidateMatch::new("pm", Role::Secondary, "Revisit requirements after oracle rejections"),
        ]);
    }

    matches
}
