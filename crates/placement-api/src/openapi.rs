//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Placement API: Internship Lifecycle and Reservations",
        version = "0.1.0",
        description = "Internship state transitions, inspection reservations, and inspection recording.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Sets
        crate::routes::sets::create_set,
        crate::routes::sets::update_set,
        // Internships
        crate::routes::internships::create_internship,
        crate::routes::internships::get_internship,
        crate::routes::internships::get_state,
        crate::routes::internships::transition_state,
        crate::routes::internships::set_highlight,
        // Reservations
        crate::routes::reservations::peek_reservation,
        crate::routes::reservations::claim_reservation,
        crate::routes::reservations::release_reservation,
        crate::routes::reservations::transfer_reservation,
        // Inspections
        crate::routes::inspections::record_inspection,
        crate::routes::inspections::list_inspections,
        crate::routes::inspections::correct_inspection,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::sets::SetView,
        crate::routes::sets::CreateSetRequest,
        crate::routes::sets::UpdateSetRequest,
        crate::routes::internships::StateView,
        crate::routes::internships::StateResponse,
        crate::routes::internships::InternshipView,
        crate::routes::internships::CreateInternshipRequest,
        crate::routes::internships::TransitionRequest,
        crate::routes::internships::HighlightRequest,
        crate::routes::reservations::ReservationView,
        crate::routes::reservations::TransferRequest,
        crate::routes::inspections::InspectionView,
        crate::routes::inspections::RecordInspectionRequest,
        crate::routes::inspections::CorrectInspectionRequest,
    )),
    tags(
        (name = "sets", description = "Internship sets (cohorts)"),
        (name = "internships", description = "Internship records and lifecycle"),
        (name = "reservations", description = "Inspection reservations"),
        (name = "inspections", description = "Inspection records"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
