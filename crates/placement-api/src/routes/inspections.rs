//! # Inspection API
//!
//! Recording and listing inspections of an internship, and correcting a
//! recorded inspection. Recording checks existence, then lifecycle, then
//! authorization, so a closed internship answers 409 `INTERNSHIP_CLOSED`
//! whoever asks.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::NaiveDate;
use placement_core::{InspectionId, InternshipId};
use placement_state::{Inspection, InspectionDraft, InspectionPatch};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_text, Validate};
use crate::state::AppState;

const MAX_LABEL: usize = 64;
const MAX_NOTE: usize = 4000;

/// Inspection record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InspectionView {
    pub id: Uuid,
    pub internship_id: Uuid,
    pub inspector_id: Uuid,
    pub date: NaiveDate,
    pub kind: String,
    pub result: String,
    pub note: String,
    /// RFC 3339 UTC.
    pub recorded_at: String,
}

impl From<Inspection> for InspectionView {
    fn from(record: Inspection) -> Self {
        Self {
            id: record.id.0,
            internship_id: record.internship_id.0,
            inspector_id: record.inspector_id.0,
            date: record.date,
            kind: record.kind,
            result: record.result,
            note: record.note,
            recorded_at: record.recorded_at.to_iso8601(),
        }
    }
}

/// Request to record an inspection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordInspectionRequest {
    /// Kind of contact, e.g. `visit` or `phone`.
    pub kind: String,
    pub result: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
}

impl Validate for RecordInspectionRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("kind", &self.kind, MAX_LABEL)?;
        require_text("result", &self.result, MAX_LABEL)?;
        if self.note.len() > MAX_NOTE {
            return Err(format!("note must not exceed {MAX_NOTE} characters"));
        }
        Ok(())
    }
}

impl From<RecordInspectionRequest> for InspectionDraft {
    fn from(req: RecordInspectionRequest) -> Self {
        Self {
            kind: req.kind,
            result: req.result,
            date: req.date,
            note: req.note,
        }
    }
}

/// Correction of a recorded inspection. Absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CorrectInspectionRequest {
    pub kind: Option<String>,
    pub result: Option<String>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl Validate for CorrectInspectionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.kind.is_none() && self.result.is_none() && self.date.is_none() && self.note.is_none()
        {
            return Err("at least one field must be provided".to_string());
        }
        if let Some(kind) = &self.kind {
            require_text("kind", kind, MAX_LABEL)?;
        }
        if let Some(result) = &self.result {
            require_text("result", result, MAX_LABEL)?;
        }
        if self.note.as_ref().is_some_and(|n| n.len() > MAX_NOTE) {
            return Err(format!("note must not exceed {MAX_NOTE} characters"));
        }
        Ok(())
    }
}

impl From<CorrectInspectionRequest> for InspectionPatch {
    fn from(req: CorrectInspectionRequest) -> Self {
        Self {
            kind: req.kind,
            result: req.result,
            date: req.date,
            note: req.note,
        }
    }
}

/// Build the inspections router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/internships/:id/inspections",
            get(list_inspections).post(record_inspection),
        )
        .route("/v1/inspections/:id", patch(correct_inspection))
}

/// POST /v1/internships/:id/inspections: record an inspection.
#[utoipa::path(
    post,
    path = "/v1/internships/{id}/inspections",
    params(("id" = Uuid, Path, description = "Internship ID")),
    request_body = RecordInspectionRequest,
    responses(
        (status = 201, description = "Inspection recorded", body = InspectionView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Internship not found", body = crate::error::ErrorBody),
        (status = 409, description = "Internship closed", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "inspections"
)]
async fn record_inspection(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<RecordInspectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InspectionView>), AppError> {
    let req = extract_validated_json(body)?;
    let inspection = state
        .workflow
        .record_inspection(InternshipId(id), req.into(), &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(inspection.into())))
}

/// GET /v1/internships/:id/inspections: inspections by date.
#[utoipa::path(
    get,
    path = "/v1/internships/{id}/inspections",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Inspections, oldest first", body = Vec<InspectionView>),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Internship not found", body = crate::error::ErrorBody),
    ),
    tag = "inspections"
)]
async fn list_inspections(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InspectionView>>, AppError> {
    let inspections = state
        .workflow
        .list_inspections(InternshipId(id), &actor)
        .await?;
    Ok(Json(inspections.into_iter().map(Into::into).collect()))
}

/// PATCH /v1/inspections/:id: correct a recorded inspection.
#[utoipa::path(
    patch,
    path = "/v1/inspections/{id}",
    params(("id" = Uuid, Path, description = "Inspection ID")),
    request_body = CorrectInspectionRequest,
    responses(
        (status = 200, description = "Inspection corrected", body = InspectionView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Inspection not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "inspections"
)]
async fn correct_inspection(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<CorrectInspectionRequest>, JsonRejection>,
) -> Result<Json<InspectionView>, AppError> {
    let req = extract_validated_json(body)?;
    let inspection = state
        .workflow
        .correct_inspection(InspectionId(id), req.into(), &actor)
        .await?;
    Ok(Json(inspection.into()))
}
