//! Structural validation of draft and execute requests.
//!
//! Every check runs before the lifecycle manager sees the request, and all
//! violations are collected into one field → reason map, so a caller fixing
//! a rejected draft sees the whole picture at once, never partial success.

use std::collections::BTreeMap;

use crate::{
    error::{PlanError, Result},
    models::{Action, Diff, PatchFormat, PlanStep},
    params::{DraftPlan, ExecutePlan, RawPatchOp},
    patch::PatchOp,
};

/// The typed pieces of a draft that survive validation.
#[derive(Debug)]
pub struct ValidatedDraft {
    pub action: Action,
    pub diff: Diff,
    pub steps: Vec<PlanStep>,
}

/// Validates a draft request and converts its loose fields into domain types.
pub fn validate_draft(params: &DraftPlan) -> Result<ValidatedDraft> {
    let mut fields = BTreeMap::new();

    let action = match params.action.parse::<Action>() {
        Ok(action) => Some(action),
        Err(_) => {
            fields.insert(
                "action".to_string(),
                format!(
                    "must be one of create, update, delete, scale, restart (got '{}')",
                    params.action
                ),
            );
            None
        }
    };

    if params.resource.resource_version.is_empty() {
        fields.insert(
            "resource.resourceVersion".to_string(),
            "must be a non-empty string".to_string(),
        );
    }
    if params.resource.href.is_empty() {
        fields.insert(
            "resource.href".to_string(),
            "must be a non-empty string".to_string(),
        );
    }

    if params.diff.patch.is_empty() {
        fields.insert(
            "diff.patch".to_string(),
            "must contain at least one operation".to_string(),
        );
    }
    let patch = convert_ops(&params.diff.patch, "diff.patch", &mut fields);
    let rollback_patch = params
        .diff
        .rollback_patch
        .as_ref()
        .map(|ops| convert_ops(ops, "diff.rollbackPatch", &mut fields));

    let patch_format = match params.diff.patch_format.as_deref() {
        None => Some(PatchFormat::default()),
        Some(raw) => match raw.parse::<PatchFormat>() {
            Ok(format) => Some(format),
            Err(_) => {
                fields.insert(
                    "diff.patchFormat".to_string(),
                    format!("must be 'rfc6902' or 'strategic-merge' (got '{raw}')"),
                );
                None
            }
        },
    };

    if params.steps.is_empty() {
        fields.insert(
            "steps".to_string(),
            "must contain at least one step".to_string(),
        );
    }
    let steps: Vec<PlanStep> = params
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| PlanStep {
            id: step
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("step-{}", index + 1)),
            action: step.action.clone(),
            description: step.description.clone(),
            patch: step
                .patch
                .as_ref()
                .map(|ops| convert_ops(ops, &format!("steps[{index}].patch"), &mut fields)),
            rollback_patch: step.rollback_patch.as_ref().map(|ops| {
                convert_ops(ops, &format!("steps[{index}].rollbackPatch"), &mut fields)
            }),
        })
        .collect();

    // action/patch_format are None exactly when a reason was recorded above.
    match (action, patch_format) {
        (Some(action), Some(patch_format)) if fields.is_empty() => Ok(ValidatedDraft {
            action,
            diff: Diff {
                before: params.diff.before.clone(),
                patch,
                rollback_patch,
                patch_format,
            },
            steps,
        }),
        _ => Err(PlanError::Validation { fields }),
    }
}

/// Validates an execute request. Presence-only checks; the lifecycle manager
/// owns the semantic comparisons.
pub fn validate_execute(params: &ExecutePlan) -> Result<()> {
    let mut fields = BTreeMap::new();

    if params.plan_id.is_empty() {
        fields.insert("planId".to_string(), "must be a non-empty string".to_string());
    }
    if params.resource_version.is_empty() {
        fields.insert(
            "resourceVersion".to_string(),
            "must be a non-empty string".to_string(),
        );
    }
    if params.idempotency_key.is_empty() {
        fields.insert(
            "idempotencyKey".to_string(),
            "must be a non-empty string".to_string(),
        );
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(PlanError::Validation { fields })
    }
}

/// Converts raw patch operations into the closed [`PatchOp`] enum, recording
/// a field-level reason for every op that fails.
fn convert_ops(
    ops: &[RawPatchOp],
    prefix: &str,
    fields: &mut BTreeMap<String, String>,
) -> Vec<PatchOp> {
    ops.iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            if raw.path.is_empty() {
                fields.insert(
                    format!("{prefix}[{index}].path"),
                    "must be a non-empty JSON pointer".to_string(),
                );
                return None;
            }
            match raw.op.as_str() {
                "add" | "replace" => {
                    let Some(value) = raw.value.clone() else {
                        fields.insert(
                            format!("{prefix}[{index}].value"),
                            format!("is required for op '{}'", raw.op),
                        );
                        return None;
                    };
                    Some(if raw.op == "add" {
                        PatchOp::Add {
                            path: raw.path.clone(),
                            value,
                        }
                    } else {
                        PatchOp::Replace {
                            path: raw.path.clone(),
                            value,
                        }
                    })
                }
                // value is ignored for remove
                "remove" => Some(PatchOp::Remove {
                    path: raw.path.clone(),
                }),
                other => {
                    fields.insert(
                        format!("{prefix}[{index}].op"),
                        format!("must be one of add, remove, replace (got '{other}')"),
                    );
                    None
                }
            }
        })
        .collect()
}
