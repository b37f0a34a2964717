//! Logging setup as seen by an embedding application

use agent_router::observability::logging::{init_logging, LogFormat};
use agent_router::{IntelligentRouter, Outcome, WorkflowContext};
use tracing::Level;

#[test]
fn test_log_format_parse_is_case_and_whitespace_insensitive() {
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse("  pretty  "), LogFormat::Pretty);
    assert_eq!(LogFormat::parse("Compact\n"), LogFormat::Compact);
}

#[test]
fn test_unknown_formats_fall_back_to_json() {
    for input in ["", "xml", "yaml", "123"] {
        assert_eq!(LogFormat::parse(input), LogFormat::Json, "input {input:?}");
    }
}

#[test]
fn test_router_runs_under_installed_subscriber() {
    // Only one global subscriber per test binary; either outcome is fine here
    let _ = init_logging(Level::TRACE, LogFormat::Json, true);
    assert!(!init_logging(Level::INFO, LogFormat::Pretty, false));

    let router = IntelligentRouter::default();
    let routed = router.route("review the code", &WorkflowContext::new().with_phase("review"));
    let pattern = router
        .update_outcome(routed.handle, Outcome::Success, Some(serde_json::json!({"note": "looks right"})))
        .unwrap();

    assert!(pattern.is_some());
    assert_eq!(router.metrics().routings, 1);
}
