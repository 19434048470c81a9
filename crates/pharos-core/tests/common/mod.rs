use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pharos_core::executor::{ExecuteChange, Executor, ExecutorError};
use pharos_core::models::ResourceRef;
use pharos_core::{DraftPlan, EngineBuilder, PlanEngine};
use serde_json::json;
use tempfile::TempDir;

/// Test executor that counts invocations and can be told to fail.
pub struct CountingExecutor {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingExecutor {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for CountingExecutor {
    async fn apply(
        &self,
        _resource: &ResourceRef,
        _change: &ExecuteChange,
    ) -> Result<String, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ExecutorError::Rejected(
                "denied by admission webhook".to_string(),
            ))
        } else {
            Ok("42".to_string())
        }
    }
}

/// Helper function to create a test engine backed by a temp database
pub async fn create_test_engine(executor: Arc<dyn Executor>) -> (TempDir, PlanEngine) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let engine = EngineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_executor(executor)
        .build()
        .await
        .expect("Failed to create engine");
    (temp_dir, engine)
}

/// A valid scale draft for `Deployment/default/web`, 2 → 5 replicas.
pub fn scale_draft() -> DraftPlan {
    serde_json::from_value(json!({
        "action": "scale",
        "intent": "Scale web to 5 replicas",
        "aiRationale": "Sustained traffic above target utilization",
        "requestedBy": "user:alice",
        "resource": {
            "kind": "Deployment",
            "namespace": "default",
            "name": "web",
            "resourceVersion": "41",
            "href": "/k8s/deployments/default/web"
        },
        "diff": {
            "before": {"spec": {"replicas": 2}},
            "patch": [{"op": "replace", "path": "/spec/replicas", "value": 5}],
            "rollbackPatch": [{"op": "replace", "path": "/spec/replicas", "value": 2}]
        },
        "steps": [
            {"action": "set-replicas", "description": "Set spec.replicas to 5"}
        ],
        "risk": {"level": "medium"}
    }))
    .expect("scale draft fixture should deserialize")
}
