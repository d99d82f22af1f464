//! Internship set persistence operations.

use placement_core::SetId;
use placement_state::InternshipSet;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::StoreError;

/// Insert a set.
pub async fn insert(pool: &PgPool, record: &InternshipSet) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO internship_sets (id, name, active, editable) VALUES ($1, $2, $3, $4)")
        .bind(record.id.0)
        .bind(&record.name)
        .bind(record.active)
        .bind(record.editable)
        .execute(pool)
        .await?;

    Ok(())
}

/// Fetch a set by ID.
pub async fn get_by_id(pool: &PgPool, id: SetId) -> Result<Option<InternshipSet>, StoreError> {
    let row = sqlx::query_as::<_, SetRow>(
        "SELECT id, name, active, editable FROM internship_sets WHERE id = $1",
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(SetRow::into_record))
}

/// Update the `active` / `editable` flags; absent values are kept.
pub async fn update_flags(
    pool: &PgPool,
    id: SetId,
    active: Option<bool>,
    editable: Option<bool>,
) -> Result<Option<InternshipSet>, StoreError> {
    let row = sqlx::query_as::<_, SetRow>(
        "UPDATE internship_sets
         SET active = COALESCE($2, active), editable = COALESCE($3, editable)
         WHERE id = $1
         RETURNING id, name, active, editable",
    )
    .bind(id.0)
    .bind(active)
    .bind(editable)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(SetRow::into_record))
}

#[derive(sqlx::FromRow)]
struct SetRow {
    id: Uuid,
    name: String,
    active: bool,
    editable: bool,
}

impl SetRow {
    fn into_record(self) -> InternshipSet {
        InternshipSet {
            id: SetId(self.id),
            name: self.name,
            active: self.active,
            editable: self.editable,
        }
    }
}
