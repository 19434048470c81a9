//! Core library for the Pharos operation plan engine.
//!
//! Pharos turns an AI assistant's proposed cluster mutation into a
//! structured, reviewable plan: the patch engine previews the resulting
//! document, the lifecycle manager executes an approved plan exactly once
//! under idempotency and optimistic-concurrency guards, and the audit trail
//! records every transition with actor and timestamp.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pharos_core::{executor::{ExecuteChange, Executor, ExecutorError}, models::ResourceRef};
//! use pharos_core::{params::DraftPlan, EngineBuilder};
//!
//! struct ClusterExecutor;
//!
//! #[async_trait::async_trait]
//! impl Executor for ClusterExecutor {
//!     async fn apply(
//!         &self,
//!         _resource: &ResourceRef,
//!         _change: &ExecuteChange,
//!     ) -> Result<String, ExecutorError> {
//!         Ok("42".to_string())
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .with_database_path(Some("pharos.db"))
//!     .with_executor(Arc::new(ClusterExecutor))
//!     .build()
//!     .await?;
//!
//! let draft: DraftPlan = serde_json::from_str(r#"{
//!     "action": "scale",
//!     "intent": "Scale web to 5 replicas",
//!     "aiRationale": "Sustained traffic above target utilization",
//!     "resource": {"kind": "Deployment", "namespace": "default", "name": "web",
//!                  "resourceVersion": "41", "href": "/k8s/deployments/default/web"},
//!     "diff": {"before": {"spec": {"replicas": 2}},
//!              "patch": [{"op": "replace", "path": "/spec/replicas", "value": 5}]},
//!     "steps": [{"action": "set-replicas", "description": "Set replicas to 5"}]
//! }"#)?;
//!
//! let plan = engine.draft(&draft).await?;
//! println!("Drafted plan {} in status {}", plan.id, plan.status);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod engine;
pub mod error;
pub mod executor;
pub mod models;
pub mod params;
pub mod patch;
pub mod validate;

// Re-export commonly used types
pub use db::Database;
pub use engine::{EngineBuilder, PlanEngine};
pub use error::{PatchError, PlanError, Result};
pub use models::{
    Action, Audit, AuditEntry, Diff, OperationPlan, PatchFormat, PlanStatus, PlanStep,
    ResourceRef, Risk, RiskLevel,
};
pub use params::{DismissPlan, DraftPlan, ExecutePlan, ListPlans, UNKNOWN_ACTOR};
pub use patch::PatchOp;
