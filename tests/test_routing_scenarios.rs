//! End-to-end routing behaviour through the public router API

mod test_helpers;

use agent_router::routing::NEUTRAL_HISTORICAL_SUCCESS;
use agent_router::{
    CollaborationMode, Entity, InputParser, Intent, Outcome, RouterError, RoutingAction,
    WorkflowContext,
};
use test_helpers::{phase, ranked, router_with_capacity, test_router};

fn pair(agent: &str, role: &str) -> (String, String) {
    (agent.to_string(), role.to_string())
}

#[test]
fn test_create_prd_in_discovery_routes_to_pm() {
    let parsed = InputParser::default().parse("Create a PRD for checkout flow");
    assert!(parsed.has_intent(Intent::Create));
    assert!(parsed.has_entity(Entity::Prd));

    let router = test_router();
    let decision = router
        .route("Create a PRD for checkout flow", &phase("discovery"))
        .decision;

    assert_eq!(
        ranked(&decision),
        vec![pair("pm", "primary"), pair("analyst", "secondary")]
    );
    assert_eq!(decision.collaboration_mode, CollaborationMode::Sequential);
    assert_eq!(decision.candidate("pm").unwrap().score, 3.0);
    assert!((decision.confidence.overall - 0.92).abs() < 1e-9);
    assert_eq!(decision.suggestion.action, RoutingAction::AutoRoute);
    assert_eq!(
        decision.reasoning,
        "Selected 1 primary agent(s): pm. Supporting agents: analyst. Primary reason: Create PRD intent."
    );
}

#[test]
fn test_validate_architecture_is_gated() {
    let router = test_router();
    let decision = router
        .route("validate the architecture", &WorkflowContext::new())
        .decision;

    assert_eq!(
        ranked(&decision),
        vec![
            pair("oracle", "primary"),
            pair("architect", "secondary"),
            pair("validator", "secondary"),
        ]
    );
    assert_eq!(decision.collaboration_mode, CollaborationMode::Gated);
    assert_eq!(decision.confidence.context_relevance, 0.6);
}

#[test]
fn test_repeated_eval_failures_bring_in_reflection() {
    let router = test_router();
    let context = WorkflowContext::new()
        .with_failure("eval-timeout")
        .with_failure("eval-assertion");

    let decision = router.route("what now", &context).decision;

    assert_eq!(
        ranked(&decision),
        vec![
            pair("reflection", "primary"),
            pair("oracle", "secondary"),
            pair("dev", "secondary"),
        ]
    );
    let reflection = decision.candidate("reflection").unwrap();
    assert_eq!(reflection.reasons[0], "Recent failures detected");
    assert_eq!(decision.collaboration_mode, CollaborationMode::Gated);
}

#[test]
fn test_history_keeps_latest_hundred_routings() {
    let router = test_router();
    let handles: Vec<_> = (0..150)
        .map(|i| router.route(&format!("request number {i}"), &WorkflowContext::new()).handle)
        .collect();

    let stats = router.statistics();
    assert_eq!(stats.total_routings, 100);
    assert_eq!(stats.pending_routings, 100);

    let snapshot = router.export_data();
    assert_eq!(snapshot.entries.first().unwrap().input, "request number 50");
    assert_eq!(snapshot.entries.last().unwrap().input, "request number 149");

    let err = router
        .update_outcome(handles[10], Outcome::Success, None)
        .unwrap_err();
    assert!(matches!(err, RouterError::IndexOutOfRange { handle: 10, .. }));
    assert!(router
        .update_outcome(handles[149], Outcome::Success, None)
        .is_ok());
}

#[test]
fn test_failure_never_seeds_a_pattern() {
    let router = test_router();
    let routed = router.route("Fix the flaky login bug", &phase("development"));

    let pattern = router
        .update_outcome(routed.handle, Outcome::Failure, None)
        .unwrap();

    assert!(pattern.is_none());
    assert!(router.pattern("Fix the flaky login bug").is_none());
    assert_eq!(router.statistics().patterns_learned, 0);
    assert_eq!(router.statistics().failed_routings, 1);
}

#[test]
fn test_routing_is_deterministic() {
    let inputs = [
        "Create a PRD for checkout flow",
        "validate the architecture",
        "refactor the payment module and add tests",
        "",
        "???",
    ];
    let contexts = [
        WorkflowContext::new(),
        phase("development"),
        phase("review").with_failure("oracle-reject").with_failure("oracle-reject"),
    ];

    let first = test_router();
    let second = test_router();
    for input in inputs {
        for context in &contexts {
            let a = first.route(input, context).decision;
            let b = second.route(input, context).decision;
            let again = first.route(input, context).decision;
            assert_eq!(a, b, "input {input:?}");
            assert_eq!(a, again, "input {input:?}");
        }
    }
}

#[test]
fn test_outcomes_feed_historical_success() {
    let router = test_router();
    let context = phase("discovery");
    let input = "Create a PRD for checkout flow";

    let first = router.route(input, &context);
    assert_eq!(
        first.decision.confidence.historical_success,
        NEUTRAL_HISTORICAL_SUCCESS
    );

    router
        .update_outcome(first.handle, Outcome::Success, None)
        .unwrap();
    let second = router.route(input, &context);
    assert_eq!(second.decision.confidence.historical_success, 1.0);
    assert!(second.decision.confidence.overall > first.decision.confidence.overall);

    router
        .update_outcome(second.handle, Outcome::Failure, None)
        .unwrap();
    let third = router.route(input, &context);
    assert_eq!(third.decision.confidence.historical_success, 0.5);

    let pattern = router.pattern(input).unwrap();
    assert_eq!(pattern.success_count, 1);
    assert_eq!(pattern.failure_count, 1);
    assert!((pattern.strength - 0.6).abs() < 1e-9);
}

#[test]
fn test_pattern_strength_saturates() {
    let router = test_router();
    for _ in 0..8 {
        let routed = router.route("plan the sprint", &WorkflowContext::new());
        router
            .update_outcome(routed.handle, Outcome::Success, None)
            .unwrap();
    }
    assert_eq!(router.pattern("plan the sprint").unwrap().strength, 1.0);

    for _ in 0..15 {
        let routed = router.route("plan the sprint", &WorkflowContext::new());
        router
            .update_outcome(routed.handle, Outcome::Failure, None)
            .unwrap();
    }
    assert_eq!(router.pattern("plan the sprint").unwrap().strength, 0.0);
}

#[test]
fn test_small_capacity_router_evicts() {
    let router = router_with_capacity(5);
    for i in 0..12 {
        router.route(&format!("task {i}"), &WorkflowContext::new());
    }
    assert_eq!(router.history_len(), 5);
    assert_eq!(router.metrics().routings, 12);
}

#[test]
fn test_statistics_after_mixed_outcomes() {
    let router = test_router();
    let a = router.route("fix the bug", &phase("development"));
    let b = router.route("write the docs", &WorkflowContext::new());
    router.route("hmm", &WorkflowContext::new());

    router.update_outcome(a.handle, Outcome::Success, None).unwrap();
    router.update_outcome(b.handle, Outcome::Failure, None).unwrap();

    let stats = router.statistics();
    assert_eq!(stats.total_routings, 3);
    assert_eq!(stats.successful_routings, 1);
    assert_eq!(stats.failed_routings, 1);
    assert!((stats.success_rate - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.patterns_learned, 1);
    assert!(stats.average_confidence > 0.0 && stats.average_confidence <= 1.0);
}
