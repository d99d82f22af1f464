//! # Internship Lifecycle API
//!
//! Creation, record reads, the state read/transition pair, and the
//! highlight flag. States travel as numeric codes (0 to 6) and come back
//! with their names.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use placement_core::{InternshipId, SetId, UserId};
use placement_state::{Internship, InternshipState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

// ── DTOs ────────────────────────────────────────────────────────────

/// A lifecycle state as exchanged over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateView {
    /// Numeric state code (0 = FOUNDED ... 6 = COMPLETED).
    pub code: u8,
    /// State name, e.g. `IN_PROGRESS`.
    pub name: String,
    /// Whether the state is a sink (DENIED, CANCELLED, COMPLETED).
    pub terminal: bool,
}

impl From<InternshipState> for StateView {
    fn from(state: InternshipState) -> Self {
        Self {
            code: state.code(),
            name: state.name().to_string(),
            terminal: state.is_terminal(),
        }
    }
}

/// Current state plus the targets the caller's role may request from it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    pub state: StateView,
    /// Codes of the states reachable from here for the caller's role.
    pub allowed_targets: Vec<u8>,
}

/// Internship record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InternshipView {
    pub id: Uuid,
    pub set_id: Uuid,
    pub owner_id: Uuid,
    pub state: StateView,
    pub reservation_holder_id: Option<Uuid>,
    pub highlighted: bool,
    /// RFC 3339 UTC.
    pub created_at: String,
    /// RFC 3339 UTC.
    pub updated_at: String,
}

impl From<Internship> for InternshipView {
    fn from(record: Internship) -> Self {
        Self {
            id: record.id.0,
            set_id: record.set_id.0,
            owner_id: record.owner_id.0,
            state: record.state.into(),
            reservation_holder_id: record.reservation_holder_id.map(|h| h.0),
            highlighted: record.highlighted,
            created_at: record.created_at.to_iso8601(),
            updated_at: record.updated_at.to_iso8601(),
        }
    }
}

/// Request to create an internship.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInternshipRequest {
    pub set_id: Uuid,
    /// Owning student. Defaults to the caller.
    pub owner_id: Option<Uuid>,
}

/// Request to move an internship to another state.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target state code. Codes outside 0 to 6 are refused with
    /// `INVALID_STATE_VALUE`.
    pub target_state: i64,
}

/// Request to set or clear the highlight flag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HighlightRequest {
    pub highlighted: bool,
}

impl Validate for CreateInternshipRequest {
    fn validate(&self) -> Result<(), String> {
        if self.set_id.is_nil() {
            return Err("set_id must not be the nil UUID".to_string());
        }
        if self.owner_id.is_some_and(|o| o.is_nil()) {
            return Err("owner_id must not be the nil UUID".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the internships router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/internships", post(create_internship))
        .route("/v1/internships/:id", get(get_internship))
        .route(
            "/v1/internships/:id/state",
            get(get_state).patch(transition_state),
        )
        .route("/v1/internships/:id/highlight", patch(set_highlight))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/internships: Create a FOUNDED, unreserved internship.
#[utoipa::path(
    post,
    path = "/v1/internships",
    request_body = CreateInternshipRequest,
    responses(
        (status = 201, description = "Internship created", body = InternshipView),
        (status = 400, description = "Set locked", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Set not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "internships"
)]
async fn create_internship(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateInternshipRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InternshipView>), AppError> {
    let req = extract_validated_json(body)?;
    let owner = match req.owner_id {
        Some(owner) => UserId(owner),
        None => actor
            .user_id
            .ok_or_else(|| AppError::Validation("owner_id is required".to_string()))?,
    };

    let internship = state
        .workflow
        .create_internship(SetId(req.set_id), owner, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(internship.into())))
}

/// GET /v1/internships/:id: Full internship record.
#[utoipa::path(
    get,
    path = "/v1/internships/{id}",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Internship found", body = InternshipView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "internships"
)]
async fn get_internship(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<InternshipView>, AppError> {
    let internship = state
        .workflow
        .get_internship(InternshipId(id), &actor)
        .await?;
    Ok(Json(internship.into()))
}

/// GET /v1/internships/:id/state: Current lifecycle state.
#[utoipa::path(
    get,
    path = "/v1/internships/{id}/state",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Current state", body = StateResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "internships"
)]
async fn get_state(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<StateResponse>, AppError> {
    let current = state.workflow.get_state(InternshipId(id), &actor).await?;
    let allowed_targets = current
        .valid_transitions(actor.role)
        .into_iter()
        .map(|s| s.code())
        .collect();
    Ok(Json(StateResponse {
        state: current.into(),
        allowed_targets,
    }))
}

/// PATCH /v1/internships/:id/state: Transition to `target_state`.
#[utoipa::path(
    patch,
    path = "/v1/internships/{id}/state",
    params(("id" = Uuid, Path, description = "Internship ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = InternshipView),
        (status = 400, description = "Invalid state value, invalid transition, or set locked", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "State changed concurrently", body = crate::error::ErrorBody),
    ),
    tag = "internships"
)]
async fn transition_state(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<InternshipView>, AppError> {
    let req = extract_json(body)?;
    let internship = state
        .workflow
        .transition_state(InternshipId(id), req.target_state, &actor)
        .await?;
    Ok(Json(internship.into()))
}

/// PATCH /v1/internships/:id/highlight: Set the highlight flag.
#[utoipa::path(
    patch,
    path = "/v1/internships/{id}/highlight",
    params(("id" = Uuid, Path, description = "Internship ID")),
    request_body = HighlightRequest,
    responses(
        (status = 200, description = "Flag updated", body = InternshipView),
        (status = 400, description = "Set locked", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "internships"
)]
async fn set_highlight(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Json<InternshipView>, AppError> {
    let req = extract_json(body)?;
    let internship = state
        .workflow
        .set_highlighted(InternshipId(id), req.highlighted, &actor)
        .await?;
    Ok(Json(internship.into()))
}
