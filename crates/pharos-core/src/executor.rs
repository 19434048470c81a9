//! The external collaborator that applies approved changes to the cluster.
//!
//! The engine never talks to the control plane itself; it delegates the
//! actual mutation to an [`Executor`] implementation injected at build time.
//! An executor failure is a recorded fact, not a request error: the plan
//! transitions to `failed` and the error text is retained in the audit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    models::{PlanStep, ResourceRef},
    patch::PatchOp,
};

/// The approved change handed to the executor: the whole forward patch plus
/// the ordered steps, so implementations can apply either granularity and
/// attribute results per step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteChange {
    pub patch: Vec<PatchOp>,
    pub steps: Vec<PlanStep>,
}

/// Errors reported by the external executor.
#[derive(Error, Debug, Clone)]
pub enum ExecutorError {
    /// The control plane accepted the request but rejected the mutation
    #[error("apply rejected by the control plane: {0}")]
    Rejected(String),
    /// The control plane could not be reached
    #[error("control plane unreachable: {0}")]
    Unavailable(String),
}

/// Contract for the cluster-mutating collaborator.
///
/// On success the executor returns the resource version observed after the
/// mutation was applied.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn apply(
        &self,
        resource: &ResourceRef,
        change: &ExecuteChange,
    ) -> Result<String, ExecutorError>;
}
