//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps workflow refusals from `placement-state` and identifier errors from
//! `placement-core` to HTTP status codes with a JSON body carrying a
//! machine-readable code, a message, and optional details.
//! Storage and internal failures never expose their cause to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use placement_state::WorkflowError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "ALREADY_RESERVED", "SET_LOCKED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Route-level lookup failed (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure outside the workflow gate (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// A workflow operation was refused or could not reach storage.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Workflow(err) => (workflow_status(err), err.code()),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Workflow(WorkflowError::InvalidTransition { from, to, .. }) => Some(serde_json::json!({
                "from": from.code(),
                "to": to.code(),
            })),
            Self::Workflow(WorkflowError::InternshipClosed { state, .. }) => {
                Some(serde_json::json!({ "state": state.code() }))
            }
            Self::Workflow(WorkflowError::StaleState { expected, .. }) => {
                Some(serde_json::json!({ "expected": expected.code() }))
            }
            _ => None,
        }
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::InvalidStateValue(_)
        | WorkflowError::InvalidTransition { .. }
        | WorkflowError::SetLocked { .. }
        | WorkflowError::AlreadyReserved { .. } => StatusCode::BAD_REQUEST,
        WorkflowError::Forbidden { .. } => StatusCode::FORBIDDEN,
        WorkflowError::InternshipClosed { .. } | WorkflowError::StaleState { .. } => {
            StatusCode::CONFLICT
        }
        WorkflowError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Workflow(err) if err.is_infrastructure() => {
                "Storage is temporarily unavailable; the request may be retried".to_string()
            }
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}
