//! Concurrent callers sharing one router

use agent_router::{HistoryHandle, IntelligentRouter, Outcome, WorkflowContext};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;

const TASKS: usize = 8;
const ROUTES_PER_TASK: usize = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_routes_serialize_history_appends() {
    let router = Arc::new(IntelligentRouter::default());

    let tasks = (0..TASKS).map(|task| {
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            (0..ROUTES_PER_TASK)
                .map(|i| {
                    router
                        .route(
                            &format!("fix bug {i} from worker {task}"),
                            &WorkflowContext::new().with_phase("development"),
                        )
                        .handle
                })
                .collect::<Vec<HistoryHandle>>()
        })
    });

    let handles: Vec<HistoryHandle> = join_all(tasks)
        .await
        .into_iter()
        .flat_map(|result| result.unwrap())
        .collect();

    let unique: BTreeSet<u64> = handles.iter().map(|h| h.id()).collect();
    assert_eq!(unique.len(), TASKS * ROUTES_PER_TASK);
    assert_eq!(unique.iter().next_back().copied(), Some(199));

    assert_eq!(router.history_len(), 100);
    assert_eq!(router.metrics().routings, 200);

    let snapshot = router.export_data();
    let ids: Vec<u64> = snapshot.entries.iter().map(|e| e.handle.id()).collect();
    assert_eq!(ids, (100..200).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_outcomes_and_routes() {
    let router = Arc::new(IntelligentRouter::default());
    let seeded: Vec<HistoryHandle> = (0..50)
        .map(|i| {
            router
                .route(&format!("write tests {i}"), &WorkflowContext::new())
                .handle
        })
        .collect();

    let reporter = {
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            for handle in seeded {
                router
                    .update_outcome(handle, Outcome::Success, None)
                    .unwrap();
            }
        })
    };
    let router_task = {
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            for i in 0..40 {
                router.route(&format!("review {i}"), &WorkflowContext::new());
            }
        })
    };

    reporter.await.unwrap();
    router_task.await.unwrap();

    let stats = router.statistics();
    assert_eq!(stats.total_routings, 90);
    assert_eq!(stats.successful_routings, 50);
    assert_eq!(stats.patterns_learned, 50);
    assert_eq!(router.metrics().successful_outcomes, 50);
}
