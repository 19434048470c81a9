//! HTTP routes for drafting, inspecting, executing, and dismissing plans.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use pharos_core::{DismissPlan, DraftPlan, ExecutePlan, ListPlans, PlanEngine, PlanError};
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::envelope::{success, ApiError};

/// Plans carry full before-snapshots; allow room for large resources.
pub const MAX_BODY_SIZE: usize = 1_048_576;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PlanEngine>,
}

/// Builds the application router.
pub fn router(engine: Arc<PlanEngine>) -> Router {
    Router::new()
        .route("/plan", post(draft_plan).delete(dismiss_plan))
        .route("/plan/{id}", get(show_plan))
        .route("/plans", get(list_plans))
        .route("/execute", post(execute_plan))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(AppState { engine })
}

async fn draft_plan(
    State(state): State<AppState>,
    body: Result<Json<DraftPlan>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(params) = body.map_err(ApiError::from_rejection)?;
    let plan = state.engine.draft(&params).await?;
    Ok(success(json!({ "plan": plan })))
}

async fn show_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let plan = state
        .engine
        .get_plan(&id)
        .await?
        .ok_or(PlanError::PlanNotFound { id })?;
    let preview = plan.diff.preview().map_err(PlanError::from)?;
    Ok(success(json!({ "plan": plan, "preview": preview })))
}

async fn list_plans(
    State(state): State<AppState>,
    query: Result<Query<ListPlans>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError {
        status: axum::http::StatusCode::BAD_REQUEST,
        code: "VALIDATION_ERROR",
        message: format!("Invalid query string: {rejection}"),
        details: None,
    })?;
    let plans = state.engine.list_plans(&params).await?;
    Ok(success(json!({ "plans": plans })))
}

async fn dismiss_plan(
    State(state): State<AppState>,
    body: Result<Json<DismissPlan>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(params) = body.map_err(ApiError::from_rejection)?;
    state.engine.dismiss(&params).await?;
    Ok(success(json!({ "dismissed": true })))
}

async fn execute_plan(
    State(state): State<AppState>,
    body: Result<Json<ExecutePlan>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(params) = body.map_err(ApiError::from_rejection)?;
    // An executor failure is not an HTTP error: the attempt is a recorded
    // fact and the response carries the plan in `failed` status.
    let plan = state.engine.execute(&params).await?;
    Ok(success(json!({ "plan": plan })))
}
