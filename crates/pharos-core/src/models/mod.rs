//! Data models for operation plans.
//!
//! This module contains the core domain models for the Pharos operation plan
//! engine: the plan itself, the resource reference and diff it carries, the
//! lifecycle/status enumerations, and the audit trail stamped onto every
//! transition.
//!
//! All wire-facing types serialize as camelCase JSON so the HTTP surface and
//! stored records share one representation.

pub mod audit;
pub mod plan;
pub mod status;


pub use audit::{Audit, AuditEntry, Timestamps};
pub use plan::{Diff, OperationPlan, PlanStep, ResourceRef, Risk};
pub use status::{Action, PatchFormat, PlanStatus, RiskLevel};
