//! Type-safe enumerations for plan actions, statuses, and classifications.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The kind of mutation a plan proposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create a resource that does not exist yet
    Create,
    /// Update fields of an existing resource
    Update,
    /// Delete an existing resource
    Delete,
    /// Change the replica count of a workload
    Scale,
    /// Trigger a rolling restart of a workload
    Restart,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "scale" => Ok(Action::Scale),
            "restart" => Ok(Action::Restart),
            _ => Err(format!("Invalid action: {s}")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Action {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Scale => "scale",
            Action::Restart => "restart",
        }
    }
}

/// Lifecycle status of a plan.
///
/// The machine is one-way: `pending` is the only non-terminal state reachable
/// through the engine, and no state may be re-entered. `confirmed` is
/// representable so that externally approved plans render correctly, but no
/// engine operation produces it; execute treats authorization as already
/// granted and only ever leaves `pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Drafted and awaiting a decision
    #[default]
    Pending,
    /// Approved by a reviewer but not yet executed
    Confirmed,
    /// Executed successfully against the live resource
    Executed,
    /// Execution was attempted and the external mutation failed
    Failed,
    /// Dismissed before execution
    Reverted,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PlanStatus::Pending),
            "confirmed" => Ok(PlanStatus::Confirmed),
            "executed" => Ok(PlanStatus::Executed),
            "failed" => Ok(PlanStatus::Failed),
            "reverted" => Ok(PlanStatus::Reverted),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PlanStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Confirmed => "confirmed",
            PlanStatus::Executed => "executed",
            PlanStatus::Failed => "failed",
            PlanStatus::Reverted => "reverted",
        }
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlanStatus::Executed | PlanStatus::Failed | PlanStatus::Reverted
        )
    }
}

/// Encoding of the forward and rollback patches carried by a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PatchFormat {
    /// RFC 6902 operation sequences, interpreted by the patch engine
    #[default]
    #[serde(rename = "rfc6902")]
    Rfc6902,
    /// Kubernetes strategic merge patches, opaque to the patch engine and
    /// handled entirely by the external executor
    #[serde(rename = "strategic-merge")]
    StrategicMerge,
}

impl FromStr for PatchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rfc6902" => Ok(PatchFormat::Rfc6902),
            "strategic-merge" => Ok(PatchFormat::StrategicMerge),
            _ => Err(format!("Invalid patch format: {s}")),
        }
    }
}

impl PatchFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchFormat::Rfc6902 => "rfc6902",
            PatchFormat::StrategicMerge => "strategic-merge",
        }
    }
}

/// Externally computed risk classification carried through the plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}
