//! Inspection persistence operations.
//!
//! Inspections are append-only; the only update path is a correction by
//! the recording inspector.

use chrono::{DateTime, NaiveDate, Utc};
use placement_core::{InspectionId, InternshipId, Timestamp, UserId};
use placement_state::Inspection;
use sqlx::PgPool;
use uuid::Uuid;

use super::open_state_codes;
use crate::store::StoreError;

/// Append an inspection if its internship is still open.
///
/// `FOR SHARE` holds the internship row until the insert commits, so a
/// concurrent transition into a terminal state either completes first (and
/// the insert matches nothing) or waits for the insert.
pub async fn insert_if_open(pool: &PgPool, record: &Inspection) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "INSERT INTO inspections (id, internship_id, inspector_id, date, kind, result, note, recorded_at)
         SELECT $1, $2, $3, $4, $5, $6, $7, $8
         WHERE EXISTS (
             SELECT 1 FROM internships WHERE id = $2 AND state = ANY($9) FOR SHARE
         )",
    )
    .bind(record.id.0)
    .bind(record.internship_id.0)
    .bind(record.inspector_id.0)
    .bind(record.date)
    .bind(&record.kind)
    .bind(&record.result)
    .bind(&record.note)
    .bind(*record.recorded_at.as_datetime())
    .bind(open_state_codes())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch an inspection by ID.
pub async fn get_by_id(pool: &PgPool, id: InspectionId) -> Result<Option<Inspection>, StoreError> {
    let row = sqlx::query_as::<_, InspectionRow>(
        "SELECT id, internship_id, inspector_id, date, kind, result, note, recorded_at
         FROM inspections WHERE id = $1",
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(InspectionRow::into_record))
}

/// All inspections of an internship, oldest visit first.
pub async fn list_for_internship(
    pool: &PgPool,
    internship_id: InternshipId,
) -> Result<Vec<Inspection>, StoreError> {
    let rows = sqlx::query_as::<_, InspectionRow>(
        "SELECT id, internship_id, inspector_id, date, kind, result, note, recorded_at
         FROM inspections WHERE internship_id = $1 ORDER BY date, recorded_at",
    )
    .bind(internship_id.0)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(InspectionRow::into_record).collect())
}

/// Overwrite the correctable fields of an inspection.
pub async fn update(pool: &PgPool, record: &Inspection) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE inspections SET date = $2, kind = $3, result = $4, note = $5 WHERE id = $1",
    )
    .bind(record.id.0)
    .bind(record.date)
    .bind(&record.kind)
    .bind(&record.result)
    .bind(&record.note)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct InspectionRow {
    id: Uuid,
    internship_id: Uuid,
    inspector_id: Uuid,
    date: NaiveDate,
    kind: String,
    result: String,
    note: String,
    recorded_at: DateTime<Utc>,
}

impl InspectionRow {
    fn into_record(self) -> Inspection {
        Inspection {
            id: InspectionId(self.id),
            internship_id: InternshipId(self.internship_id),
            inspector_id: UserId(self.inspector_id),
            date: self.date,
            kind: self.kind,
            result: self.result,
            note: self.note,
            recorded_at: Timestamp::from_utc(self.recorded_at),
        }
    }
}
