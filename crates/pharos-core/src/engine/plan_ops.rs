//! The three lifecycle operations plus the read paths.

use jiff::Timestamp;
use log::{info, warn};
use serde_json::Value;
use tokio::task;
use uuid::Uuid;

use super::PlanEngine;
use crate::{
    db::Database,
    error::{PlanError, Result},
    executor::ExecuteChange,
    models::{Audit, OperationPlan, PlanStatus},
    params::{DismissPlan, DraftPlan, ExecutePlan, ListPlans, UNKNOWN_ACTOR},
    validate,
};

impl PlanEngine {
    /// Drafts a new plan: validates the input, assigns an id, stamps the
    /// audit record, persists in `pending`, and returns the stored plan.
    pub async fn draft(&self, params: &DraftPlan) -> Result<OperationPlan> {
        let validated = validate::validate_draft(params)?;

        let now = Timestamp::now();
        let requested_by = params
            .requested_by
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());

        let plan = OperationPlan {
            id: Uuid::new_v4().to_string(),
            action: validated.action,
            intent: params.intent.clone(),
            ai_rationale: params.ai_rationale.clone(),
            resource: params.resource.clone(),
            diff: validated.diff,
            steps: validated.steps,
            status: PlanStatus::Pending,
            risk: params.risk.clone().unwrap_or_default(),
            audit: Audit::new(requested_by, now),
            idempotency_key: params.idempotency_key.clone(),
            source_prompt_id: params.source_prompt_id.clone(),
            version: params.version.clone(),
        };

        let db_path = self.db_path.clone();
        let stored = plan.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.insert_plan(&stored)
        })
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        info!(
            "Drafted plan {} ({} {} {}/{})",
            plan.id, plan.action, plan.resource.kind, plan.resource.namespace, plan.resource.name
        );

        Ok(plan)
    }

    /// Executes a pending plan exactly once.
    ///
    /// Under the plan's lock: a retry of an already-successful execution with
    /// the same idempotency key returns the stored result without touching
    /// the executor; any other terminal status conflicts; a stale resource
    /// version conflicts before the executor is invoked. The executor's
    /// outcome decides the terminal state; its failure is a recorded fact,
    /// not an error returned to the caller.
    pub async fn execute(&self, params: &ExecutePlan) -> Result<OperationPlan> {
        validate::validate_execute(params)?;

        let lock = self.lock_for(&params.plan_id);
        let _guard = lock.lock().await;

        let mut plan = self
            .fetch_plan(params.plan_id.clone())
            .await?
            .ok_or_else(|| PlanError::PlanNotFound {
                id: params.plan_id.clone(),
            })?;

        if plan.status == PlanStatus::Executed
            && plan.idempotency_key.as_deref() == Some(params.idempotency_key.as_str())
        {
            info!(
                "Execute retry for plan {} matched idempotency key; returning prior result",
                plan.id
            );
            return Ok(plan);
        }
        if plan.status != PlanStatus::Pending {
            return Err(PlanError::conflict(format!(
                "plan {} is {}; only pending plans can be executed",
                plan.id, plan.status
            )));
        }
        if plan.resource.resource_version != params.resource_version {
            return Err(PlanError::conflict(
                "plan is stale; the resource changed since this plan was drafted",
            ));
        }

        let actor = params
            .actor
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
        let change = ExecuteChange {
            patch: plan.diff.patch.clone(),
            steps: plan.steps.clone(),
        };

        info!(
            "Executing plan {} against {} {}/{} as {}",
            plan.id, plan.resource.kind, plan.resource.namespace, plan.resource.name, actor
        );
        let outcome = self.executor.apply(&plan.resource, &change).await;

        let now = Timestamp::now();
        let to = match outcome {
            Ok(applied_version) => {
                plan.audit.applied_resource_version = Some(applied_version);
                PlanStatus::Executed
            }
            Err(err) => {
                warn!("Executor failed for plan {}: {err}", plan.id);
                plan.audit.execution_error = Some(err.to_string());
                PlanStatus::Failed
            }
        };
        // executed_at stamps the attempt time whether or not it succeeded
        plan.audit.timestamps.executed_at = Some(now);
        plan.audit
            .record_transition(&actor, now, PlanStatus::Pending, to);
        plan.status = to;
        plan.idempotency_key = Some(params.idempotency_key.clone());

        let swapped = self
            .store_transition(plan.clone(), PlanStatus::Pending)
            .await?;
        if !swapped {
            return Err(PlanError::conflict(format!(
                "plan {} left pending while the execution was in flight",
                plan.id
            )));
        }

        Ok(plan)
    }

    /// Dismisses a plan.
    ///
    /// Dismissing a terminal plan is a no-op that returns the stored plan
    /// unchanged. Racing a dismissal against an execute must never turn
    /// into an error the caller has to branch on.
    pub async fn dismiss(&self, params: &DismissPlan) -> Result<OperationPlan> {
        if params.plan_id.is_empty() {
            return Err(PlanError::invalid_field(
                "planId",
                "must be a non-empty string",
            ));
        }

        let lock = self.lock_for(&params.plan_id);
        let _guard = lock.lock().await;

        let mut plan = self
            .fetch_plan(params.plan_id.clone())
            .await?
            .ok_or_else(|| PlanError::PlanNotFound {
                id: params.plan_id.clone(),
            })?;

        if plan.status.is_terminal() {
            return Ok(plan);
        }

        let actor = params
            .actor
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
        let now = Timestamp::now();
        let from = plan.status;

        plan.audit.timestamps.reverted_at = Some(now);
        plan.audit
            .record_transition(&actor, now, from, PlanStatus::Reverted);
        plan.status = PlanStatus::Reverted;

        let swapped = self.store_transition(plan.clone(), from).await?;
        if !swapped {
            // Lost a race to another transition; dismissal stays a no-op.
            let current = self.fetch_plan(params.plan_id.clone()).await?;
            return Ok(current.unwrap_or(plan));
        }

        info!("Dismissed plan {} as {}", plan.id, actor);

        Ok(plan)
    }

    /// Computes the preview "after" state for a plan.
    ///
    /// Returns `None` when no preview is possible (no before-snapshot, or a
    /// strategic-merge patch the engine does not interpret).
    pub async fn preview(&self, plan_id: &str) -> Result<Option<Value>> {
        let plan = self
            .fetch_plan(plan_id.to_string())
            .await?
            .ok_or_else(|| PlanError::PlanNotFound {
                id: plan_id.to_string(),
            })?;

        plan.diff.preview().map_err(PlanError::from)
    }

    /// Retrieves a plan by its ID.
    pub async fn get_plan(&self, plan_id: &str) -> Result<Option<OperationPlan>> {
        self.fetch_plan(plan_id.to_string()).await
    }

    /// Lists plans, optionally restricted to one status, newest first.
    pub async fn list_plans(&self, params: &ListPlans) -> Result<Vec<OperationPlan>> {
        let db_path = self.db_path.clone();
        let status = params.status;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_plans(status)
        })
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    async fn fetch_plan(&self, plan_id: String) -> Result<Option<OperationPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_plan(&plan_id)
        })
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    async fn store_transition(&self, plan: OperationPlan, from: PlanStatus) -> Result<bool> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.transition_plan(&plan, from)
        })
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
