//! # Inspection Reservation API
//!
//! One reservation resource per internship:
//!
//! | Method   | Effect                                   |
//! |----------|------------------------------------------|
//! | `GET`    | peek at the current holder               |
//! | `POST`   | claim for the caller                     |
//! | `DELETE` | release                                  |
//! | `PATCH`  | transfer to `holder_id`                  |
//!
//! A claim on a held internship answers 400 `ALREADY_RESERVED`, including
//! when the caller is the holder, so a retried claim never double-claims.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use placement_core::{InternshipId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Reservation of one internship.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationView {
    pub internship_id: Uuid,
    /// Current holder, `null` when unreserved.
    pub holder_id: Option<Uuid>,
}

impl ReservationView {
    fn new(id: Uuid, holder: Option<UserId>) -> Self {
        Self {
            internship_id: id,
            holder_id: holder.map(|h| h.0),
        }
    }
}

/// Request to hand the reservation to another principal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub holder_id: Uuid,
}

impl Validate for TransferRequest {
    fn validate(&self) -> Result<(), String> {
        if self.holder_id.is_nil() {
            return Err("holder_id must not be the nil UUID".to_string());
        }
        Ok(())
    }
}

/// Build the reservations router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/internships/:id/reservation",
        get(peek_reservation)
            .post(claim_reservation)
            .delete(release_reservation)
            .patch(transfer_reservation),
    )
}

/// GET /v1/internships/:id/reservation: current holder.
#[utoipa::path(
    get,
    path = "/v1/internships/{id}/reservation",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Current reservation", body = ReservationView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "reservations"
)]
async fn peek_reservation(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, AppError> {
    let holder = state
        .workflow
        .peek_reservation(InternshipId(id), &actor)
        .await?;
    Ok(Json(ReservationView::new(id, holder)))
}

/// POST /v1/internships/:id/reservation: claim for the caller.
#[utoipa::path(
    post,
    path = "/v1/internships/{id}/reservation",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Reservation claimed", body = ReservationView),
        (status = 400, description = "Already reserved or set locked", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Internship closed", body = crate::error::ErrorBody),
    ),
    tag = "reservations"
)]
async fn claim_reservation(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, AppError> {
    let holder = state
        .workflow
        .claim_reservation(InternshipId(id), &actor)
        .await?;
    Ok(Json(ReservationView::new(id, Some(holder))))
}

/// DELETE /v1/internships/:id/reservation: release.
#[utoipa::path(
    delete,
    path = "/v1/internships/{id}/reservation",
    params(("id" = Uuid, Path, description = "Internship ID")),
    responses(
        (status = 204, description = "Reservation released"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "reservations"
)]
async fn release_reservation(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .workflow
        .release_reservation(InternshipId(id), &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/internships/:id/reservation: transfer to `holder_id`.
#[utoipa::path(
    patch,
    path = "/v1/internships/{id}/reservation",
    params(("id" = Uuid, Path, description = "Internship ID")),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Reservation transferred", body = ReservationView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Internship closed", body = crate::error::ErrorBody),
    ),
    tag = "reservations"
)]
async fn transfer_reservation(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<ReservationView>, AppError> {
    let req = extract_validated_json(body)?;
    let holder = UserId(req.holder_id);
    state
        .workflow
        .transfer_reservation(InternshipId(id), holder, &actor)
        .await?;
    Ok(Json(ReservationView::new(id, Some(holder))))
}
