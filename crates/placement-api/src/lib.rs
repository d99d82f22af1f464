//! # placement-api: Internship Workflow HTTP Service
//!
//! Axum surface over the internship workflow: lifecycle transitions,
//! the inspection reservation ledger, and inspection recording.
//!
//! ## API Surface
//!
//! | Prefix                              | Module                     |
//! |-------------------------------------|----------------------------|
//! | `/v1/sets/*`                        | [`routes::sets`]           |
//! | `/v1/internships/*` (record, state) | [`routes::internships`]    |
//! | `/v1/internships/{id}/reservation`  | [`routes::reservations`]   |
//! | `/v1/internships/{id}/inspections`, `/v1/inspections/*` | [`routes::inspections`] |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! ## Storage
//!
//! Handlers call the [`workflow::Workflow`] facade, which talks to a
//! [`store::WorkflowRepository`]: PostgreSQL when `DATABASE_URL` is set,
//! in-memory otherwise.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;
pub mod workflow;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::sets::router())
        .merge(routes::internships::router())
        .merge(routes::reservations::router())
        .merge(routes::inspections::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}
