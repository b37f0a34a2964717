//! Candidate Aggregator
//!
//! Merges strategy proposals per agent, ranks the merged candidates and
//! derives the collaboration mode and reasoning text.

use super::decision::{CandidateMatch, CollaborationMode, Role, RoutingCandidate};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Agents whose presence makes a single-primary decision gated
const GATE_AGENTS: [&str; 2] = ["oracle", "validator"];

/// Group, rank and validate strategy proposals
///
/// Candidates are ordered by role priority then score, ties keeping the order
/// in which agents were first proposed. When no candidate is primary the
/// top-ranked one is promoted.
///
/// Every agent proposed as primary stays primary, so the result holds at
/// least one primary and possibly several. Exactly one is guaranteed only
/// when promotion was needed; several primaries make the mode `parallel`.
pub fn aggregate(matches: Vec<CandidateMatch>) -> Vec<RoutingCandidate> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<RoutingCandidate> = Vec::new();

    for m in matches {
        match positions.get(&m.agent) {
            Some(&i) => {
                let candidate = &mut candidates[i];
                candidate.roles.insert(m.role);
                candidate.reasons.push(m.reason);
                candidate.score += m.score;
            }
            None => {
                positions.insert(m.agent.clone(), candidates.len());
                candidates.push(RoutingCandidate {
                    agent: m.agent,
                    roles: BTreeSet::from([m.role]),
                    reasons: vec![m.reason],
                    score: m.score,
                    final_role: m.role,
                });
            }
        }
    }

    for candidate in &mut candidates {
        candidate.final_role = highest_role(&candidate.roles);
    }

    // sort_by is stable, so equal candidates keep first-proposed order
    candidates.sort_by(|a, b| {
        b.final_role
            .priority()
            .cmp(&a.final_role.priority())
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    if !candidates.iter().any(RoutingCandidate::is_primary) {
        if let Some(top) = candidates.first_mut() {
            debug!("No primary candidate, promoting '{}'", top.agent);
            top.final_role = Role::Primary;
            top.roles.insert(Role::Primary);
        }
    }

    candidates
}

fn highest_role(roles: &BTreeSet<Role>) -> Role {
    if roles.contains(&Role::Primary) {
        Role::Primary
    } else if roles.contains(&Role::Secondary) {
        Role::Secondary
    } else {
        Role::Background
    }
}

/// Parallel for several primaries; otherwise gated when a gate agent is involved
pub fn collaboration_mode(candidates: &[RoutingCandidate]) -> CollaborationMode {
    let primary_count = candidates.iter().filter(|c| c.is_primary()).count();

    if primary_count > 1 {
        CollaborationMode::Parallel
    } else if candidates
        .iter()
        .any(|c| GATE_AGENTS.contains(&c.agent.as_str()))
    {
        CollaborationMode::Gated
    } else {
        CollaborationMode::Sequential
    }
}

/// Human-readable summary of a ranked candidate list
pub fn build_reasoning(candidates: &[RoutingCandidate]) -> String {
    if candidates.is_empty() {
        return "No suitable agents found for this request.".to_string();
    }

    let primaries: Vec<&str> = candidates
        .iter()
        .filter(|c| c.final_role == Role::Primary)
        .map(|c| c.agent.as_str())
        .collect();
    let secondaries: Vec<&str> = candidates
        .iter()
        .filter(|c| c.final_role == Role::Secondary)
        .map(|c| c.agent.as_str())
        .collect();

    let mut reasoning = format!(
        "Selected {} primary agent(s): {}. ",
        primaries.len(),
        primaries.join(",")
    );
    if !secondaries.is_empty() {
        reasoning.push_str(&format!("Supporting agents: {}. ", secondaries.join(",")));
    }
    if let Some(reason) = candidates
        .iter()
        .find(|c| c.is_primary())
        .and_then(|c| c.reasons.first())
    {
        reasoning.push_str(&format!("Primary reason: {reason}."));
    }

    reasoning.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(agent: &str, role: Role, reason: &str) -> CandidateMatch {
        CandidateMatch::new(agent, role, reason)
    }

    fn ranked(candidates: &[RoutingCandidate]) -> Vec<(&str, Role)> {
        candidates
            .iter()
            .map(|c| (c.agent.as_str(), c.final_role))
            .collect()
    }

    #[test]
    fn test_groups_by_agent_and_sums_scores() {
        let candidates = aggregate(vec![
            m("pm", Role::Primary, "Create PRD intent"),
            m("analyst", Role::Secondary, "Discovery phase research"),
            m("pm", Role::Background, "Discovery phase requirements"),
            CandidateMatch::new("pm", Role::Secondary, "Matched 3 keyword(s)").with_score(3.0),
        ]);

        assert_eq!(candidates.len(), 2);
        let pm = &candidates[0];
        assert_eq!(pm.agent, "pm");
        assert_eq!(pm.score, 5.0);
        assert_eq!(pm.final_role, Role::Primary);
        assert_eq!(
            pm.roles,
            BTreeSet::from([Role::Primary, Role::Secondary, Role::Background])
        );
        assert_eq!(
            pm.reasons,
            vec![
                "Create PRD intent",
                "Discovery phase requirements",
                "Matched 3 keyword(s)"
            ]
        );
    }

    #[test]
    fn test_ranking_by_role_then_score() {
        let candidates = aggregate(vec![
            m("bg", Role::Background, "b"),
            m("sec", Role::Secondary, "s"),
            CandidateMatch::new("sec-strong", Role::Secondary, "s").with_score(4.0),
            m("prim", Role::Primary, "p"),
        ]);

        assert_eq!(
            ranked(&candidates),
            vec![
                ("prim", Role::Primary),
                ("sec-strong", Role::Secondary),
                ("sec", Role::Secondary),
                ("bg", Role::Background),
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let candidates = aggregate(vec![
            m("b", Role::Secondary, "x"),
            m("a", Role::Secondary, "x"),
            m("c", Role::Primary, "x"),
        ]);
        assert_eq!(
            ranked(&candidates),
            vec![
                ("c", Role::Primary),
                ("b", Role::Secondary),
                ("a", Role::Secondary),
            ]
        );
    }

    #[test]
    fn test_promotes_top_candidate_when_no_primary() {
        let candidates = aggregate(vec![
            m("qa", Role::Background, "x"),
            CandidateMatch::new("eval", Role::Secondary, "x").with_score(2.0),
            m("dev", Role::Secondary, "x"),
        ]);

        assert_eq!(candidates[0].agent, "eval");
        assert_eq!(candidates[0].final_role, Role::Primary);
        assert!(candidates[0].roles.contains(&Role::Primary));
        assert_eq!(candidates.iter().filter(|c| c.is_primary()).count(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(vec![]).is_empty());
    }

    #[test]
    fn test_collaboration_modes() {
        let sequential = aggregate(vec![m("pm", Role::Primary, "x"), m("analyst", Role::Secondary, "x")]);
        assert_eq!(collaboration_mode(&sequential), CollaborationMode::Sequential);

        let gated = aggregate(vec![m("oracle", Role::Primary, "x"), m("validator", Role::Secondary, "x")]);
        assert_eq!(collaboration_mode(&gated), CollaborationMode::Gated);

        // Several primaries win over gate agents
        let parallel = aggregate(vec![m("oracle", Role::Primary, "x"), m("dev", Role::Primary, "x")]);
        assert_eq!(collaboration_mode(&parallel), CollaborationMode::Parallel);

        assert_eq!(collaboration_mode(&[]), CollaborationMode::Sequential);
    }

    #[test]
    fn test_gate_agent_in_background_still_gates() {
        let candidates = aggregate(vec![m("dev", Role::Primary, "x"), m("oracle", Role::Background, "x")]);
        assert_eq!(collaboration_mode(&candidates), CollaborationMode::Gated);
    }

    #[test]
    fn test_reasoning_text() {
        let candidates = aggregate(vec![
            m("pm", Role::Primary, "Create PRD intent"),
            m("analyst", Role::Secondary, "Discovery phase research"),
            m("sm", Role::Background, "Planning phase backlog"),
        ]);

        assert_eq!(
            build_reasoning(&candidates),
            "Selected 1 primary agent(s): pm. Supporting agents: analyst. Primary reason: Create PRD intent."
        );
    }

    #[test]
    fn test_reasoning_without_secondaries() {
        let candidates = aggregate(vec![m("dev", Role::Primary, "Fix intent"), m("eval", Role::Primary, "Testing intent")]);
        assert_eq!(
            build_reasoning(&candidates),
            "Selected 2 primary agent(s): dev,eval. Primary reason: Fix intent."
        );
    }

    #[test]
    fn test_reasoning_for_empty_decision() {
        assert_eq!(build_reasoning(&[]), "No suitable agents found for this request.");
    }

    fn arb_match() -> impl Strategy<Value = CandidateMatch> {
        (
            prop::sample::select(vec!["pm", "dev", "eval", "oracle", "qa", "sm"]),
            prop::sample::select(vec![Role::Primary, Role::Secondary, Role::Background]),
            0.0f64..5.0,
        )
            .prop_map(|(agent, role, score)| CandidateMatch::new(agent, role, "generated").with_score(score))
    }

    proptest! {
        #[test]
        fn non_empty_input_always_has_a_primary_ranked_first(
            matches in prop::collection::vec(arb_match(), 1..20)
        ) {
            let candidates = aggregate(matches);
            prop_assert!(!candidates.is_empty());
            prop_assert!(candidates[0].is_primary());
            prop_assert!(candidates.iter().any(|c| c.is_primary()));
        }

        #[test]
        fn promotion_without_proposed_primary_yields_exactly_one(
            matches in prop::collection::vec(arb_match(), 1..20)
        ) {
            let had_primary = matches.iter().any(|m| m.role == Role::Primary);
            let candidates = aggregate(matches);
            if !had_primary {
                prop_assert_eq!(candidates.iter().filter(|c| c.is_primary()).count(), 1);
            }
        }

        #[test]
        fn proposed_primaries_all_survive(
            matches in prop::collection::vec(arb_match(), 1..20)
        ) {
            let proposed: BTreeSet<String> = matches
                .iter()
                .filter(|m| m.role == Role::Primary)
                .map(|m| m.agent.clone())
                .collect();
            let candidates = aggregate(matches);
            for agent in &proposed {
                let candidate = candidates.iter().find(|c| &c.agent == agent);
                prop_assert!(candidate.map_or(false, |c| c.is_primary()));
            }
        }

        #[test]
        fn ranking_is_sorted_by_role_priority(
            matches in prop::collection::vec(arb_match(), 0..20)
        ) {
            let candidates = aggregate(matches);
            for pair in candidates.windows(2) {
                prop_assert!(pair[0].final_role.priority() >= pair[1].final_role.priority());
            }
        }

        #[test]
        fn each_agent_appears_once(
            matches in prop::collection::vec(arb_match(), 0..20)
        ) {
            let candidates = aggregate(matches);
            let unique: BTreeSet<_> = candidates.iter().map(|c| c.agent.clone()).collect();
            prop_assert_eq!(unique.len(), candidates.len());
        }
    }
}
