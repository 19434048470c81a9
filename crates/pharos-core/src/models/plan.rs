//! The operation plan and its constituent parts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::PatchError,
    models::{Action, Audit, PatchFormat, PlanStatus, RiskLevel},
    patch::{self, PatchOp},
};

/// Reference to the cluster resource a plan targets.
///
/// `resource_version` is the version the diff was computed against; it is the
/// baseline for the optimistic-concurrency check at execute time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// Resource kind, e.g. `Deployment`
    pub kind: String,
    /// Namespace the resource lives in
    pub namespace: String,
    /// Resource name
    pub name: String,
    /// Server-assigned UID, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Version the diff was computed against
    #[serde(default)]
    pub resource_version: String,
    /// Cluster identifier for multi-cluster setups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// Canonical link to the resource in the dashboard
    #[serde(default)]
    pub href: String,
}

/// The proposed change: a before-snapshot plus forward and rollback patches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    /// Snapshot of the resource the patch was computed from; absent for
    /// `create`, where no resource exists yet
    pub before: Option<Value>,
    /// Forward patch, applied in order
    pub patch: Vec<PatchOp>,
    /// Authored inverse of `patch`, applied the same way to roll back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_patch: Option<Vec<PatchOp>>,
    /// Encoding of both patches
    #[serde(default)]
    pub patch_format: PatchFormat,
}

impl Diff {
    /// Computes the preview "after" state from `before` + `patch`.
    ///
    /// Returns `None` when no preview is possible: the resource does not
    /// exist yet, or the patch is strategic-merge and therefore opaque to
    /// the patch engine.
    pub fn preview(&self) -> Result<Option<Value>, PatchError> {
        if self.patch_format == PatchFormat::StrategicMerge {
            return Ok(None);
        }
        patch::apply(self.before.as_ref(), &self.patch)
    }
}

/// A finer-grained, independently revertible slice of the plan's change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// Step identifier, unique within the plan
    pub id: String,
    /// What this step does, e.g. `set-replicas`
    pub action: String,
    /// Human-readable description of the step
    pub description: String,
    /// Patch slice this step contributes, when it carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Vec<PatchOp>>,
    /// Authored inverse of this step's patch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_patch: Option<Vec<PatchOp>>,
}

/// Risk tier attached to a plan by an external policy engine.
///
/// The engine records it at draft time and never recomputes it; extra fields
/// from the policy engine pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Risk {
    pub level: RiskLevel,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A reviewable, exactly-once-executable mutation to a cluster resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationPlan {
    /// Opaque unique identifier, assigned at draft time, immutable
    pub id: String,
    /// The kind of mutation proposed
    pub action: Action,
    /// Proposer-supplied description of the goal; never interpreted
    pub intent: String,
    /// Proposer-supplied reasoning; never interpreted
    pub ai_rationale: String,
    /// The target resource and the concurrency baseline
    pub resource: ResourceRef,
    /// The proposed change
    pub diff: Diff,
    /// Ordered, non-empty breakdown of the change
    pub steps: Vec<PlanStep>,
    /// Lifecycle status
    pub status: PlanStatus,
    /// Externally computed risk tier, carried unchanged
    pub risk: Risk,
    /// Actor and timestamp trail for every transition
    pub audit: Audit,
    /// Caller-supplied token making execute retries safe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// Provenance: the prompt that produced this plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_prompt_id: Option<String>,
    /// Provenance: proposer-side plan version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
