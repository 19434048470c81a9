use jiff::Timestamp;
use pharos_core::models::{
    Action, Audit, Diff, OperationPlan, PatchFormat, PlanStatus, PlanStep, ResourceRef, Risk,
};
use pharos_core::{Database, PatchOp, PlanError};
use serde_json::json;
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn test_plan(id: &str) -> OperationPlan {
    let now = Timestamp::from_second(1640995200).unwrap();
    OperationPlan {
        id: id.to_string(),
        action: Action::Scale,
        intent: "Scale web to 5".to_string(),
        ai_rationale: "Traffic spike".to_string(),
        resource: ResourceRef {
            kind: "Deployment".to_string(),
            namespace: "default".to_string(),
            name: "web".to_string(),
            uid: None,
            resource_version: "41".to_string(),
            cluster: None,
            href: "/k8s/deployments/default/web".to_string(),
        },
        diff: Diff {
            before: Some(json!({"spec": {"replicas": 2}})),
            patch: vec![PatchOp::Replace {
                path: "/spec/replicas".to_string(),
                value: json!(5),
            }],
            rollback_patch: None,
            patch_format: PatchFormat::Rfc6902,
        },
        steps: vec![PlanStep {
            id: "step-1".to_string(),
            action: "set-replicas".to_string(),
            description: "Set replicas to 5".to_string(),
            patch: None,
            rollback_patch: None,
        }],
        status: PlanStatus::Pending,
        risk: Risk::default(),
        audit: Audit::new("user:alice", now),
        idempotency_key: None,
        source_prompt_id: Some("prompt-7".to_string()),
        version: None,
    }
}

#[test]
fn database_initialization_creates_the_schema() {
    let (temp_file, _db) = create_test_db();
    assert!(temp_file.path().exists());

    // Re-opening an existing database re-applies the schema idempotently.
    let _again = Database::new(temp_file.path()).expect("Failed to reopen database");
}

#[test]
fn insert_and_get_round_trip() {
    let (_temp_file, mut db) = create_test_db();

    let plan = test_plan("plan-1");
    db.insert_plan(&plan).expect("Failed to insert plan");

    let stored = db
        .get_plan("plan-1")
        .expect("Failed to get plan")
        .expect("Plan should exist");
    assert_eq!(stored, plan);
}

#[test]
fn get_missing_plan_is_none() {
    let (_temp_file, db) = create_test_db();
    assert!(db.get_plan("missing").expect("query failed").is_none());
}

#[test]
fn list_plans_filters_by_status() {
    let (_temp_file, mut db) = create_test_db();

    db.insert_plan(&test_plan("plan-1")).unwrap();
    db.insert_plan(&test_plan("plan-2")).unwrap();

    let mut executed = test_plan("plan-3");
    executed.status = PlanStatus::Executed;
    db.insert_plan(&executed).unwrap();

    let all = db.list_plans(None).unwrap();
    assert_eq!(all.len(), 3);

    let pending = db.list_plans(Some(PlanStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 2);

    let executed = db.list_plans(Some(PlanStatus::Executed)).unwrap();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].id, "plan-3");
}

#[test]
fn transition_swaps_only_from_the_expected_status() {
    let (_temp_file, mut db) = create_test_db();

    let mut plan = test_plan("plan-1");
    db.insert_plan(&plan).unwrap();

    plan.status = PlanStatus::Executed;
    plan.idempotency_key = Some("key-1".to_string());
    let swapped = db
        .transition_plan(&plan, PlanStatus::Pending)
        .expect("transition failed");
    assert!(swapped);

    let stored = db.get_plan("plan-1").unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::Executed);
    assert_eq!(stored.idempotency_key, Some("key-1".to_string()));

    // Second swap from pending loses: the stored status moved on.
    plan.status = PlanStatus::Reverted;
    let swapped = db
        .transition_plan(&plan, PlanStatus::Pending)
        .expect("transition failed");
    assert!(!swapped);

    let stored = db.get_plan("plan-1").unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::Executed);
}

#[test]
fn transition_of_a_missing_plan_is_not_found() {
    let (_temp_file, mut db) = create_test_db();

    let mut plan = test_plan("ghost");
    plan.status = PlanStatus::Executed;
    let err = db.transition_plan(&plan, PlanStatus::Pending).unwrap_err();
    assert!(matches!(err, PlanError::PlanNotFound { .. }));
}

#[test]
fn terminal_plans_are_retained_for_audit() {
    let (_temp_file, mut db) = create_test_db();

    let mut plan = test_plan("plan-1");
    db.insert_plan(&plan).unwrap();

    plan.status = PlanStatus::Reverted;
    plan.audit.timestamps.reverted_at = Some(Timestamp::from_second(1641081600).unwrap());
    assert!(db.transition_plan(&plan, PlanStatus::Pending).unwrap());

    // The dismissed plan is still queryable with its full audit record.
    let stored = db.get_plan("plan-1").unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::Reverted);
    assert!(stored.audit.timestamps.reverted_at.is_some());
}
