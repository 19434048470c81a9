//! The response envelope shared by every endpoint.
//!
//! Success bodies are `{"success": true, "data": ...}`; failures are
//! `{"success": false, "error": {"message", "code", "statusCode", "details"}}`
//! with a stable `code` so clients can branch without string-matching.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use pharos_core::PlanError;
use serde::Serialize;
use serde_json::{json, Value};

/// Wraps endpoint data in the success envelope.
pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// An error response carrying the envelope fields.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    /// A malformed request body, reported before schema validation runs.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: format!("Invalid JSON body: {rejection}"),
            details: None,
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Validation { fields } => Self {
                status: StatusCode::BAD_REQUEST,
                code: "VALIDATION_ERROR",
                message: "Request failed validation".to_string(),
                details: serde_json::to_value(fields).ok(),
            },
            PlanError::Patch { source } => Self {
                status: StatusCode::BAD_REQUEST,
                code: "STRUCTURAL_PATCH_ERROR",
                message: source.to_string(),
                details: None,
            },
            PlanError::PlanNotFound { ref id } => Self {
                status: StatusCode::NOT_FOUND,
                code: "NOT_FOUND",
                message: format!("Plan with ID {id} not found"),
                details: None,
            },
            PlanError::Conflict { reason } => Self {
                status: StatusCode::CONFLICT,
                code: "CONFLICT",
                message: reason,
                details: None,
            },
            other => {
                error!("Internal error while handling request: {other}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "INTERNAL_ERROR",
                    message: "Internal server error".to_string(),
                    details: None,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "message": self.message,
            "code": self.code,
            "statusCode": self.status.as_u16(),
        });
        if let Some(details) = self.details {
            error["details"] = details;
        }
        (
            self.status,
            Json(json!({ "success": false, "error": error })),
        )
            .into_response()
    }
}
