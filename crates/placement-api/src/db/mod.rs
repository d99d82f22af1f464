//! # Database Persistence Layer
//!
//! PostgreSQL persistence for the workflow via SQLx.
//!
//! ## Architecture
//!
//! The database is **optional**. When `DATABASE_URL` is set, every workflow
//! operation reads and writes PostgreSQL through [`PgRepository`]. When
//! absent, the API runs on the in-memory repository (development and tests).
//!
//! All contended writes are single statements whose `WHERE` clause is the
//! precondition (`state = $expected`, `reservation_holder_id IS NULL`), so
//! two API instances racing on the same row get exactly one winner without
//! any in-process lock.
//!
//! [`PgRepository`]: crate::store::postgres::PgRepository

pub mod inspections;
pub mod internships;
pub mod sets;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppConfig;

/// Connect to the database and run embedded migrations.
///
/// Returns `None` if no `DATABASE_URL` is configured (in-memory mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(config: &AppConfig) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, running with the in-memory repository. \
             State will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Storage codes of the non-terminal states, bound as `state = ANY($n)`.
pub(crate) fn open_state_codes() -> Vec<i16> {
    placement_state::InternshipState::OPEN
        .iter()
        .map(|s| i16::from(s.code()))
        .collect()
}
