//! # Internship Set API
//!
//! Administrators seed sets and lock them. A set with `editable = false`
//! refuses every internship mutation by non-administrators with
//! `SET_LOCKED`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use placement_core::SetId;
use placement_state::InternshipSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_text, Validate};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetView {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub editable: bool,
}

impl From<InternshipSet> for SetView {
    fn from(set: InternshipSet) -> Self {
        Self {
            id: set.id.0,
            name: set.name,
            active: set.active,
            editable: set.editable,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSetRequest {
    pub name: String,
    /// Defaults to `true`.
    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

impl Validate for CreateSetRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name, 255)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSetRequest {
    pub active: Option<bool>,
    pub editable: Option<bool>,
}

impl Validate for UpdateSetRequest {
    fn validate(&self) -> Result<(), String> {
        if self.active.is_none() && self.editable.is_none() {
            return Err("at least one of active, editable must be provided".to_string());
        }
        Ok(())
    }
}

/// Build the sets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/sets", post(create_set))
        .route("/v1/sets/:id", patch(update_set))
}

/// POST /v1/sets: create a set.
#[utoipa::path(
    post,
    path = "/v1/sets",
    request_body = CreateSetRequest,
    responses(
        (status = 201, description = "Set created", body = SetView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "sets"
)]
async fn create_set(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateSetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SetView>), AppError> {
    let req = extract_validated_json(body)?;
    let set = state
        .workflow
        .create_set(req.name.trim().to_string(), req.editable, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(set.into())))
}

/// PATCH /v1/sets/:id: update `active` / `editable`.
#[utoipa::path(
    patch,
    path = "/v1/sets/{id}",
    params(("id" = Uuid, Path, description = "Set ID")),
    request_body = UpdateSetRequest,
    responses(
        (status = 200, description = "Set updated", body = SetView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "sets"
)]
async fn update_set(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateSetRequest>, JsonRejection>,
) -> Result<Json<SetView>, AppError> {
    let req = extract_validated_json(body)?;
    let set = state
        .workflow
        .update_set(SetId(id), req.active, req.editable, &actor)
        .await?;
    Ok(Json(set.into()))
}
