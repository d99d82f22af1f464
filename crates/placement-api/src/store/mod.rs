//! # Storage Boundary
//!
//! [`WorkflowRepository`] is the only place mutual exclusion happens. Every
//! method that touches `state` or `reservation_holder_id` is a single
//! conditional write whose predicate is authoritative: callers may read
//! first to choose an error message, but never to decide whether the write
//! is allowed.
//!
//! Two implementations ship:
//!
//! - [`MemoryRepository`] for development and tests, with each conditional
//!   write performed under one `parking_lot` write lock.
//! - [`PgRepository`] for production, with each conditional write performed
//!   as one SQL statement.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use placement_core::{InspectionId, InternshipId, SetId, UserId};
use placement_state::{Inspection, Internship, InternshipSet, InternshipState, WorkflowError};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Failure at the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or could not execute the statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a domain record.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        WorkflowError::Storage(err.to_string())
    }
}

/// Persistence operations the workflow needs.
#[async_trait]
pub trait WorkflowRepository: Send + Sync + std::fmt::Debug {
    // ── Sets (collaborator data) ────────────────────────────────────

    async fn insert_set(&self, set: &InternshipSet) -> Result<(), StoreError>;

    async fn get_set(&self, id: SetId) -> Result<Option<InternshipSet>, StoreError>;

    /// Update the flags that are `Some`. Returns the updated set.
    async fn update_set_flags(
        &self,
        id: SetId,
        active: Option<bool>,
        editable: Option<bool>,
    ) -> Result<Option<InternshipSet>, StoreError>;

    // ── Internships ─────────────────────────────────────────────────

    async fn insert_internship(&self, internship: &Internship) -> Result<(), StoreError>;

    async fn get_internship(&self, id: InternshipId) -> Result<Option<Internship>, StoreError>;

    /// Move `id` to `target` only if it is currently in `expected`.
    ///
    /// A terminal `target` clears the reservation in the same write.
    /// Returns `None` when the predicate matched nothing (missing row or
    /// state changed underneath).
    async fn compare_and_set_state(
        &self,
        id: InternshipId,
        expected: InternshipState,
        target: InternshipState,
    ) -> Result<Option<Internship>, StoreError>;

    /// Take the reservation for `holder` only if it is free and the
    /// internship is non-terminal. Returns whether the write happened.
    async fn claim_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError>;

    /// Clear the reservation. Returns `false` only if the internship is missing.
    async fn release_reservation(&self, id: InternshipId) -> Result<bool, StoreError>;

    /// Overwrite the reservation while the internship is non-terminal.
    async fn transfer_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError>;

    async fn set_highlighted(
        &self,
        id: InternshipId,
        highlighted: bool,
    ) -> Result<Option<Internship>, StoreError>;

    // ── Inspections ─────────────────────────────────────────────────

    /// Append `inspection` only if its internship exists and is non-terminal.
    async fn insert_inspection_if_open(&self, inspection: &Inspection) -> Result<bool, StoreError>;

    async fn get_inspection(&self, id: InspectionId) -> Result<Option<Inspection>, StoreError>;

    /// Inspections of one internship, ordered by date.
    async fn list_inspections(&self, internship_id: InternshipId) -> Result<Vec<Inspection>, StoreError>;

    async fn update_inspection(&self, inspection: &Inspection) -> Result<bool, StoreError>;
}
