//! Plan persistence and the conditional status updates.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};
use serde::de::DeserializeOwned;

use crate::{
    error::{DatabaseResultExt, PlanError, Result},
    models::{OperationPlan, PlanStatus},
};

// Optimized SQL queries as const strings for compile-time optimization
const INSERT_PLAN_SQL: &str = "INSERT INTO plans (id, action, intent, ai_rationale, status, resource, diff, steps, risk, audit, idempotency_key, source_prompt_id, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";
const PLAN_COLUMNS: &str = "id, action, intent, ai_rationale, status, resource, diff, steps, risk, audit, idempotency_key, source_prompt_id, version";
const SELECT_PLAN_SQL: &str = "SELECT id, action, intent, ai_rationale, status, resource, diff, steps, risk, audit, idempotency_key, source_prompt_id, version FROM plans WHERE id = ?1";
const TRANSITION_PLAN_SQL: &str = "UPDATE plans SET status = ?1, audit = ?2, idempotency_key = ?3, updated_at = ?4 WHERE id = ?5 AND status = ?6";

/// Parses a JSON text column, surfacing parse failures as conversion errors.
fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Maps a plan row using the [`PLAN_COLUMNS`] ordering.
fn row_to_plan(row: &Row<'_>) -> rusqlite::Result<OperationPlan> {
    let action_str: String = row.get(1)?;
    let action = action_str.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid action: {action_str}"),
            )),
        )
    })?;

    let status_str: String = row.get(4)?;
    let status = status_str.parse::<PlanStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid plan status: {status_str}"),
            )),
        )
    })?;

    Ok(OperationPlan {
        id: row.get(0)?,
        action,
        intent: row.get(2)?,
        ai_rationale: row.get(3)?,
        status,
        resource: json_column(row, 5)?,
        diff: json_column(row, 6)?,
        steps: json_column(row, 7)?,
        risk: json_column(row, 8)?,
        audit: json_column(row, 9)?,
        idempotency_key: row.get(10)?,
        source_prompt_id: row.get(11)?,
        version: row.get(12)?,
    })
}

impl super::Database {
    /// Persists a freshly drafted plan.
    pub fn insert_plan(&mut self, plan: &OperationPlan) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let created_at = plan.audit.timestamps.created_at.to_string();

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                plan.id,
                plan.action.as_str(),
                plan.intent,
                plan.ai_rationale,
                plan.status.as_str(),
                serde_json::to_string(&plan.resource)?,
                serde_json::to_string(&plan.diff)?,
                serde_json::to_string(&plan.steps)?,
                serde_json::to_string(&plan.risk)?,
                serde_json::to_string(&plan.audit)?,
                plan.idempotency_key,
                plan.source_prompt_id,
                plan.version,
                &created_at,
                &created_at,
            ],
        )
        .db_context("Failed to insert plan")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(())
    }

    /// Retrieves a plan by its ID.
    pub fn get_plan(&self, id: &str) -> Result<Option<OperationPlan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLAN_SQL)
            .db_context("Failed to prepare query")?;

        stmt.query_row(params![id], row_to_plan)
            .optional()
            .db_context("Failed to query plan")
    }

    /// Lists plans, optionally restricted to one status, newest first.
    pub fn list_plans(&self, status: Option<PlanStatus>) -> Result<Vec<OperationPlan>> {
        let mut query = format!("SELECT {PLAN_COLUMNS} FROM plans");

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(status) = status {
            query.push_str(" WHERE status = ?");
            params_vec.push(Box::new(status.as_str().to_string()));
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let result = stmt
            .query_map(&params_refs[..], row_to_plan)
            .db_context("Failed to query plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch plans");
        result
    }

    /// Conditionally writes a plan's terminal state.
    ///
    /// The update only fires while the stored status still equals `from`,
    /// which is what makes the lifecycle transitions one-way even under
    /// racing callers. Returns whether the swap happened.
    pub fn transition_plan(&mut self, plan: &OperationPlan, from: PlanStatus) -> Result<bool> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let rows_affected = tx
            .execute(
                TRANSITION_PLAN_SQL,
                params![
                    plan.status.as_str(),
                    serde_json::to_string(&plan.audit)?,
                    plan.idempotency_key,
                    &now,
                    plan.id,
                    from.as_str(),
                ],
            )
            .db_context("Failed to transition plan")?;

        if rows_affected == 0 {
            // Lost the race or the plan is gone; confirm it still exists so
            // the caller can distinguish the two.
            let exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM plans WHERE id = ?1)",
                    params![plan.id],
                    |row| row.get(0),
                )
                .db_context("Failed to check plan existence")?;

            if !exists {
                return Err(PlanError::PlanNotFound {
                    id: plan.id.clone(),
                });
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(rows_affected == 1)
    }
}
