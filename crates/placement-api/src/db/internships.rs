//! Internship persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `internships` table.
//! The state and reservation writes are conditional single statements; the
//! lifecycle rules that decide *whether* to attempt them live in
//! `placement-state`.

use chrono::{DateTime, Utc};
use placement_core::{InternshipId, SetId, Timestamp, UserId};
use placement_state::{Internship, InternshipState};
use sqlx::PgPool;
use uuid::Uuid;

use super::open_state_codes;
use crate::store::StoreError;

const COLUMNS: &str = "id, set_id, owner_id, state, reservation_holder_id, highlighted, created_at, updated_at";

/// Insert a newly founded internship.
pub async fn insert(pool: &PgPool, record: &Internship) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO internships (id, set_id, owner_id, state, reservation_holder_id, highlighted, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id.0)
    .bind(record.set_id.0)
    .bind(record.owner_id.0)
    .bind(i16::from(record.state.code()))
    .bind(record.reservation_holder_id.map(|h| h.0))
    .bind(record.highlighted)
    .bind(*record.created_at.as_datetime())
    .bind(*record.updated_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch an internship by ID.
pub async fn get_by_id(pool: &PgPool, id: InternshipId) -> Result<Option<Internship>, StoreError> {
    let row = sqlx::query_as::<_, InternshipRow>(&format!(
        "SELECT {COLUMNS} FROM internships WHERE id = $1"
    ))
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    row.map(InternshipRow::into_record).transpose()
}

/// Move the internship from `expected` to `target` if it is still in `expected`.
///
/// Entering a terminal state clears the reservation in the same statement.
/// Returns the updated row, or `None` if the predicate matched nothing.
pub async fn compare_and_set_state(
    pool: &PgPool,
    id: InternshipId,
    expected: InternshipState,
    target: InternshipState,
) -> Result<Option<Internship>, StoreError> {
    let row = sqlx::query_as::<_, InternshipRow>(&format!(
        "UPDATE internships
         SET state = $3,
             reservation_holder_id = CASE WHEN $4 THEN NULL ELSE reservation_holder_id END,
             updated_at = $5
         WHERE id = $1 AND state = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id.0)
    .bind(i16::from(expected.code()))
    .bind(i16::from(target.code()))
    .bind(target.is_terminal())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.map(InternshipRow::into_record).transpose()
}

/// Take the reservation if nobody holds it and the internship is open.
pub async fn claim_reservation(
    pool: &PgPool,
    id: InternshipId,
    holder: UserId,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE internships SET reservation_holder_id = $2, updated_at = $3
         WHERE id = $1 AND reservation_holder_id IS NULL AND state = ANY($4)",
    )
    .bind(id.0)
    .bind(holder.0)
    .bind(Utc::now())
    .bind(open_state_codes())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Clear the reservation. Returns `false` only if the internship does not exist.
pub async fn release_reservation(pool: &PgPool, id: InternshipId) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE internships SET reservation_holder_id = NULL, updated_at = $2 WHERE id = $1",
    )
    .bind(id.0)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite the reservation holder while the internship is open.
pub async fn transfer_reservation(
    pool: &PgPool,
    id: InternshipId,
    holder: UserId,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE internships SET reservation_holder_id = $2, updated_at = $3
         WHERE id = $1 AND state = ANY($4)",
    )
    .bind(id.0)
    .bind(holder.0)
    .bind(Utc::now())
    .bind(open_state_codes())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the highlight flag. Returns the updated row.
pub async fn set_highlighted(
    pool: &PgPool,
    id: InternshipId,
    highlighted: bool,
) -> Result<Option<Internship>, StoreError> {
    let row = sqlx::query_as::<_, InternshipRow>(&format!(
        "UPDATE internships SET highlighted = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id.0)
    .bind(highlighted)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.map(InternshipRow::into_record).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct InternshipRow {
    id: Uuid,
    set_id: Uuid,
    owner_id: Uuid,
    state: i16,
    reservation_holder_id: Option<Uuid>,
    highlighted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InternshipRow {
    fn into_record(self) -> Result<Internship, StoreError> {
        let state = InternshipState::from_code(i64::from(self.state)).ok_or_else(|| {
            tracing::error!(id = %self.id, state = self.state, "unknown internship state in database");
            StoreError::Corrupt(format!("internship {} has state code {}", self.id, self.state))
        })?;

        let record = Internship {
            id: InternshipId(self.id),
            set_id: SetId(self.set_id),
            owner_id: UserId(self.owner_id),
            state,
            reservation_holder_id: self.reservation_holder_id.map(UserId),
            highlighted: self.highlighted,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
        };
        if !record.reservation_consistent() {
            tracing::error!(id = %self.id, state = %state, "terminal internship still holds a reservation");
            return Err(StoreError::Corrupt(format!(
                "internship {} is {state} but reserved",
                self.id
            )));
        }
        Ok(record)
    }
}
