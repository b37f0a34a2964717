//! Built-in agent catalogue used when the configuration declares no agents

use super::AgentCapability;

pub fn builtin_agents() -> Vec<AgentCapability> {
    vec![
        AgentCapability::new("analyst")
            .with_capabilities(["market-research", "requirements-elicitation", "brainstorming"])
            .with_domains(["discovery", "research"])
            .with_keywords(["research", "market", "competitor", "brainstorm", "insight"]),
        AgentCapability::new("pm")
            .with_capabilities(["prd-authoring", "prioritization", "roadmapping"])
            .with_domains(["discovery", "planning", "product"])
            .with_keywords(["prd", "requirement", "product", "roadmap", "priority"]),
        AgentCapability::new("architect")
            .with_capabilities(["system-design", "technology-selection", "architecture-review"])
            .with_domains(["planning", "architecture"])
            .with_keywords([
                "architecture",
                "infrastructure",
                "scalability",
                "database",
                "integration",
            ]),
        AgentCapability::new("sm")
            .with_capabilities(["story-writing", "sprint-planning", "backlog-grooming"])
            .with_domains(["planning", "delivery"])
            .with_keywords(["story", "sprint", "backlog", "epic", "estimate"]),
        AgentCapability::new("dev")
            .with_capabilities(["implementation", "debugging", "refactoring"])
            .with_domains(["development"])
            .with_keywords(["code", "implement", "refactor", "function", "debug", "bug"]),
        AgentCapability::new("qa")
            .with_capabilities(["test-planning", "regression-testing", "acceptance-testing"])
            .with_domains(["testing", "quality"])
            .with_keywords(["quality", "regression", "acceptance", "coverage"]),
        AgentCapability::new("eval")
            .with_capabilities(["test-execution", "benchmarking", "evaluation"])
            .with_domains(["testing", "development"])
            .with_keywords(["test", "assertion", "benchmark", "evaluate", "metric"]),
        AgentCapability::new("oracle")
            .with_capabilities(["validation", "verification", "quality-gate"])
            .with_domains(["review", "quality"])
            .with_keywords(["validate", "verify", "correctness", "audit", "review"]),
        AgentCapability::new("validator")
            .with_capabilities(["compliance-check", "consistency-check", "linting"])
            .with_domains(["review", "deployment"])
            .with_keywords(["compliance", "consistency", "schema", "lint", "standard"]),
        AgentCapability::new("reflection")
            .with_capabilities(["failure-analysis", "retrospective", "process-improvement"])
            .with_domains(["learning", "quality"])
            .with_keywords(["failure", "retrospective", "lesson", "postmortem", "cause"]),
    ]
}
