//! Parameter structures for engine operations.
//!
//! These structures carry requests from any interface (HTTP today, others
//! later) into the engine without framework-specific derives. Draft input is
//! deliberately loose where the validation layer owns the decision: `action`,
//! patch operations, and `patchFormat` arrive as raw strings/shapes and are
//! checked into their closed domain types by [`crate::validate`], so a bad
//! value produces a field-level validation error instead of an opaque
//! deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{PlanStatus, ResourceRef, Risk};

/// Actor recorded when a request carries no identity.
pub const UNKNOWN_ACTOR: &str = "user:unknown";

/// A patch operation as submitted, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPatchOp {
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// The diff section of a draft, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiff {
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub patch: Vec<RawPatchOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_patch: Option<Vec<RawPatchOp>>,
    /// Defaults to `rfc6902` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_format: Option<String>,
}

/// A plan step as submitted; a missing `id` is assigned at draft time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Vec<RawPatchOp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_patch: Option<Vec<RawPatchOp>>,
}

/// Parameters for drafting a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPlan {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub ai_rationale: String,
    /// Defaults to [`UNKNOWN_ACTOR`] when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub resource: ResourceRef,
    #[serde(default)]
    pub diff: RawDiff,
    #[serde(default)]
    pub steps: Vec<RawStep>,
    /// Externally computed risk tier; defaults to `low` when the proposer
    /// supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<Risk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_prompt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Parameters for executing a pending plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePlan {
    #[serde(default)]
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Must equal the baseline the diff was computed against
    #[serde(default)]
    pub resource_version: String,
    /// Token making retries of this execution intent safe
    #[serde(default)]
    pub idempotency_key: String,
}

/// Parameters for dismissing a pending plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissPlan {
    #[serde(default)]
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Parameters for listing plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPlans {
    /// Restrict to a single lifecycle status
    #[serde(default)]
    pub status: Option<PlanStatus>,
}
