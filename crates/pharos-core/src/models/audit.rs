//! Audit trail stamped onto every plan transition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::PlanStatus;

/// Named lifecycle timestamps (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    /// When the plan was drafted
    pub created_at: Timestamp,
    /// When the plan was confirmed, if a separate approval step ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<Timestamp>,
    /// When execution was attempted, whether it succeeded or failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<Timestamp>,
    /// When the plan was dismissed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverted_at: Option<Timestamp>,
}

/// One entry per transition: who moved the plan, when, and between which
/// states. The draft entry has no `from_state`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub actor: String,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_state: Option<PlanStatus>,
    pub to_state: PlanStatus,
}

/// The full audit record carried by a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Actor that requested the draft
    pub requested_by: String,
    pub timestamps: Timestamps,
    pub actor_history: Vec<AuditEntry>,
    /// Error reported by the external executor when execution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
    /// Resource version observed after a successful execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_resource_version: Option<String>,
}

impl Audit {
    /// Creates the audit record for a freshly drafted plan, including the
    /// initial history entry into `pending`.
    pub fn new(requested_by: impl Into<String>, now: Timestamp) -> Self {
        let requested_by = requested_by.into();
        Self {
            requested_by: requested_by.clone(),
            timestamps: Timestamps {
                created_at: now,
                confirmed_at: None,
                executed_at: None,
                reverted_at: None,
            },
            actor_history: vec![AuditEntry {
                actor: requested_by,
                timestamp: now,
                from_state: None,
                to_state: PlanStatus::Pending,
            }],
            execution_error: None,
            applied_resource_version: None,
        }
    }

    /// Appends a transition to the history.
    pub fn record_transition(
        &mut self,
        actor: impl Into<String>,
        now: Timestamp,
        from: PlanStatus,
        to: PlanStatus,
    ) {
        self.actor_history.push(AuditEntry {
            actor: actor.into(),
            timestamp: now,
            from_state: Some(from),
            to_state: to,
        });
    }
}
