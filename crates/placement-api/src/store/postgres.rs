//! PostgreSQL repository.
//!
//! A thin adapter from [`WorkflowRepository`] onto the query functions in
//! [`crate::db`]. Each conditional write is one SQL statement.

use async_trait::async_trait;
use sqlx::PgPool;

use placement_core::{InspectionId, InternshipId, SetId, UserId};
use placement_state::{Inspection, Internship, InternshipSet, InternshipState};

use super::{StoreError, WorkflowRepository};
use crate::db;

/// [`WorkflowRepository`] backed by a SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRepository for PgRepository {
    async fn insert_set(&self, set: &InternshipSet) -> Result<(), StoreError> {
        db::sets::insert(&self.pool, set).await
    }

    async fn get_set(&self, id: SetId) -> Result<Option<InternshipSet>, StoreError> {
        db::sets::get_by_id(&self.pool, id).await
    }

    async fn update_set_flags(
        &self,
        id: SetId,
        active: Option<bool>,
        editable: Option<bool>,
    ) -> Result<Option<InternshipSet>, StoreError> {
        db::sets::update_flags(&self.pool, id, active, editable).await
    }

    async fn insert_internship(&self, internship: &Internship) -> Result<(), StoreError> {
        db::internships::insert(&self.pool, internship).await
    }

    async fn get_internship(&self, id: InternshipId) -> Result<Option<Internship>, StoreError> {
        db::internships::get_by_id(&self.pool, id).await
    }

    async fn compare_and_set_state(
        &self,
        id: InternshipId,
        expected: InternshipState,
        target: InternshipState,
    ) -> Result<Option<Internship>, StoreError> {
        db::internships::compare_and_set_state(&self.pool, id, expected, target).await
    }

    async fn claim_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError> {
        db::internships::claim_reservation(&self.pool, id, holder).await
    }

    async fn release_reservation(&self, id: InternshipId) -> Result<bool, StoreError> {
        db::internships::release_reservation(&self.pool, id).await
    }

    async fn transfer_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError> {
        db::internships::transfer_reservation(&self.pool, id, holder).await
    }

    async fn set_highlighted(
        &self,
        id: InternshipId,
        highlighted: bool,
    ) -> Result<Option<Internship>, StoreError> {
        db::internships::set_highlighted(&self.pool, id, highlighted).await
    }

    async fn insert_inspection_if_open(&self, inspection: &Inspection) -> Result<bool, StoreError> {
        db::inspections::insert_if_open(&self.pool, inspection).await
    }

    async fn get_inspection(&self, id: InspectionId) -> Result<Option<Inspection>, StoreError> {
        db::inspections::get_by_id(&self.pool, id).await
    }

    async fn list_inspections(&self, internship_id: InternshipId) -> Result<Vec<Inspection>, StoreError> {
        db::inspections::list_for_internship(&self.pool, internship_id).await
    }

    async fn update_inspection(&self, inspection: &Inspection) -> Result<bool, StoreError> {
        db::inspections::update(&self.pool, inspection).await
    }
}
