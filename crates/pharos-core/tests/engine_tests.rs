use std::sync::Arc;

use pharos_core::{DismissPlan, ExecutePlan, ListPlans, PlanError, PlanStatus};
use serde_json::json;

mod common;

use common::{create_test_engine, scale_draft, CountingExecutor};

fn execute_params(plan_id: &str, resource_version: &str, key: &str) -> ExecutePlan {
    ExecutePlan {
        plan_id: plan_id.to_string(),
        actor: Some("user:bob".to_string()),
        resource_version: resource_version.to_string(),
        idempotency_key: key.to_string(),
    }
}

#[tokio::test]
async fn draft_persists_a_pending_plan() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();

    assert!(!plan.id.is_empty());
    assert_eq!(plan.status, PlanStatus::Pending);
    assert_eq!(plan.audit.requested_by, "user:alice");
    assert_eq!(plan.steps[0].id, "step-1");

    let stored = engine.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(stored, plan);
}

#[tokio::test]
async fn invalid_draft_persists_nothing() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let mut draft = scale_draft();
    draft.steps.clear();
    let err = engine.draft(&draft).await.unwrap_err();
    let PlanError::Validation { fields } = err else {
        panic!("expected validation error");
    };
    assert!(fields.contains_key("steps"));

    let plans = engine.list_plans(&ListPlans::default()).await.unwrap();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn execute_transitions_to_executed() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    let executed = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();

    assert_eq!(executed.status, PlanStatus::Executed);
    assert!(executed.audit.timestamps.executed_at.is_some());
    assert_eq!(
        executed.audit.applied_resource_version,
        Some("42".to_string())
    );
    assert_eq!(executed.idempotency_key, Some("key-1".to_string()));
    assert_eq!(executor.calls(), 1);

    // The transition is recorded in the history with the executing actor.
    let last = executed.audit.actor_history.last().unwrap();
    assert_eq!(last.actor, "user:bob");
    assert_eq!(last.from_state, Some(PlanStatus::Pending));
    assert_eq!(last.to_state, PlanStatus::Executed);
}

#[tokio::test]
async fn execute_retry_with_same_key_is_idempotent() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    let first = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();
    let second = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn stale_resource_version_conflicts_without_side_effects() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    let err = engine
        .execute(&execute_params(&plan.id, "99", "key-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::Conflict { .. }));
    assert_eq!(executor.calls(), 0);

    let stored = engine.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::Pending);
}

#[tokio::test]
async fn terminal_plans_cannot_be_re_executed() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();

    // Different key: the idempotent-return path does not apply.
    let err = engine
        .execute(&execute_params(&plan.id, "41", "key-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Conflict { .. }));
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn executor_failure_marks_the_plan_failed() {
    let executor = CountingExecutor::failing();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    let failed = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();

    assert_eq!(failed.status, PlanStatus::Failed);
    assert!(failed.audit.timestamps.executed_at.is_some());
    assert!(failed
        .audit
        .execution_error
        .as_deref()
        .unwrap()
        .contains("admission webhook"));
    assert_eq!(executor.calls(), 1);

    // A failed attempt is terminal; retrying with the same key conflicts.
    let err = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Conflict { .. }));
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn racing_executes_invoke_the_executor_exactly_once() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;
    let engine = Arc::new(engine);

    let plan = engine.draft(&scale_draft()).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let params = execute_params(&plan.id, "41", &format!("key-{i}"));
            tokio::spawn(async move { engine.execute(&params).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let outcomes: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();

    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(PlanError::Conflict { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 3);
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn dismiss_before_execute_scenario() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor.clone()).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();

    // Preview must show the scaled-up replica count.
    let after = engine.preview(&plan.id).await.unwrap().unwrap();
    assert_eq!(after["spec"]["replicas"], json!(5));

    let dismissed = engine
        .dismiss(&DismissPlan {
            plan_id: plan.id.clone(),
            actor: Some("user:carol".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(dismissed.status, PlanStatus::Reverted);
    assert!(dismissed.audit.timestamps.reverted_at.is_some());

    let err = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Conflict { .. }));
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn dismiss_is_a_noop_on_terminal_plans() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let plan = engine.draft(&scale_draft()).await.unwrap();
    let executed = engine
        .execute(&execute_params(&plan.id, "41", "key-1"))
        .await
        .unwrap();

    let dismissed = engine
        .dismiss(&DismissPlan {
            plan_id: plan.id.clone(),
            actor: Some("user:carol".to_string()),
        })
        .await
        .unwrap();

    // Unchanged: still executed, no reverted stamp, no extra history entry.
    assert_eq!(dismissed, executed);
}

#[tokio::test]
async fn unknown_plan_ids_are_not_found() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let err = engine
        .execute(&execute_params("nope", "41", "key-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::PlanNotFound { .. }));

    let err = engine
        .dismiss(&DismissPlan {
            plan_id: "nope".to_string(),
            actor: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::PlanNotFound { .. }));

    let err = engine.preview("nope").await.unwrap_err();
    assert!(matches!(err, PlanError::PlanNotFound { .. }));
}

#[tokio::test]
async fn list_plans_filters_by_status() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let first = engine.draft(&scale_draft()).await.unwrap();
    let _second = engine.draft(&scale_draft()).await.unwrap();
    engine
        .execute(&execute_params(&first.id, "41", "key-1"))
        .await
        .unwrap();

    let all = engine.list_plans(&ListPlans::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let pending = engine
        .list_plans(&ListPlans {
            status: Some(PlanStatus::Pending),
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let executed = engine
        .list_plans(&ListPlans {
            status: Some(PlanStatus::Executed),
        })
        .await
        .unwrap();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].id, first.id);
}

#[tokio::test]
async fn default_actor_is_recorded_when_absent() {
    let executor = CountingExecutor::succeeding();
    let (_tmp, engine) = create_test_engine(executor).await;

    let mut draft = scale_draft();
    draft.requested_by = None;
    let plan = engine.draft(&draft).await.unwrap();
    assert_eq!(plan.audit.requested_by, "user:unknown");

    let executed = engine
        .execute(&ExecutePlan {
            plan_id: plan.id.clone(),
            actor: None,
            resource_version: "41".to_string(),
            idempotency_key: "key-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        executed.audit.actor_history.last().unwrap().actor,
        "user:unknown"
    );
}
