//! In-memory repository.
//!
//! Used when `DATABASE_URL` is unset and throughout the test suite. Each
//! conditional write runs its predicate and its mutation under one write
//! lock, which gives the same single-winner guarantee as the SQL backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use placement_core::{InspectionId, InternshipId, SetId, Timestamp, UserId};
use placement_state::{
    can_claim, can_transfer, holder_after_transition, Inspection, Internship, InternshipSet,
    InternshipState,
};

use super::{StoreError, WorkflowRepository};

// ── Generic store ───────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory map keyed by UUID.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// All records matching `pred`.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data.read().values().filter(|v| pred(v)).cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure sees the current value and either mutates it and returns
    /// `Ok`, or leaves it alone and returns `Err`. Both happen under a
    /// single write lock. Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Run `f` against a record while holding the read lock.
    ///
    /// Writers to this store wait until `f` returns, so `f` may act on
    /// another store knowing the record cannot change meanwhile.
    pub fn with<R>(&self, id: &Uuid, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.data.read().get(id))
    }

}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Repository ──────────────────────────────────────────────────────

/// [`WorkflowRepository`] over three in-memory stores.
///
/// Lock order is internships before inspections; no path takes them the
/// other way round.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    sets: Store<InternshipSet>,
    internships: Store<Internship>,
    inspections: Store<Inspection>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for MemoryRepository {
    async fn insert_set(&self, set: &InternshipSet) -> Result<(), StoreError> {
        self.sets.insert(set.id.0, set.clone());
        Ok(())
    }

    async fn get_set(&self, id: SetId) -> Result<Option<InternshipSet>, StoreError> {
        Ok(self.sets.get(&id.0))
    }

    async fn update_set_flags(
        &self,
        id: SetId,
        active: Option<bool>,
        editable: Option<bool>,
    ) -> Result<Option<InternshipSet>, StoreError> {
        Ok(self.sets.update(&id.0, |set| {
            if let Some(active) = active {
                set.active = active;
            }
            if let Some(editable) = editable {
                set.editable = editable;
            }
        }))
    }

    async fn insert_internship(&self, internship: &Internship) -> Result<(), StoreError> {
        self.internships.insert(internship.id.0, internship.clone());
        Ok(())
    }

    async fn get_internship(&self, id: InternshipId) -> Result<Option<Internship>, StoreError> {
        Ok(self.internships.get(&id.0))
    }

    async fn compare_and_set_state(
        &self,
        id: InternshipId,
        expected: InternshipState,
        target: InternshipState,
    ) -> Result<Option<Internship>, StoreError> {
        let outcome = self.internships.try_update(&id.0, |row| {
            if row.state != expected {
                return Err(row.state);
            }
            row.state = target;
            row.reservation_holder_id = holder_after_transition(target, row.reservation_holder_id);
            row.updated_at = Timestamp::now();
            debug_assert!(row.reservation_consistent());
            Ok(row.clone())
        });
        Ok(outcome.and_then(Result::ok))
    }

    async fn claim_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError> {
        let outcome = self.internships.try_update(&id.0, |row| {
            if !can_claim(row) {
                return Err(());
            }
            row.reservation_holder_id = Some(holder);
            row.updated_at = Timestamp::now();
            Ok(())
        });
        Ok(matches!(outcome, Some(Ok(()))))
    }

    async fn release_reservation(&self, id: InternshipId) -> Result<bool, StoreError> {
        let updated = self.internships.update(&id.0, |row| {
            row.reservation_holder_id = None;
            row.updated_at = Timestamp::now();
        });
        Ok(updated.is_some())
    }

    async fn transfer_reservation(&self, id: InternshipId, holder: UserId) -> Result<bool, StoreError> {
        let outcome = self.internships.try_update(&id.0, |row| {
            if !can_transfer(row) {
                return Err(());
            }
            row.reservation_holder_id = Some(holder);
            row.updated_at = Timestamp::now();
            Ok(())
        });
        Ok(matches!(outcome, Some(Ok(()))))
    }

    async fn set_highlighted(
        &self,
        id: InternshipId,
        highlighted: bool,
    ) -> Result<Option<Internship>, StoreError> {
        Ok(self.internships.update(&id.0, |row| {
            row.highlighted = highlighted;
            row.updated_at = Timestamp::now();
        }))
    }

    async fn insert_inspection_if_open(&self, inspection: &Inspection) -> Result<bool, StoreError> {
        let inserted = self
            .internships
            .with(&inspection.internship_id.0, |row| match row {
                Some(internship) if !internship.is_terminal() => {
                    self.inspections.insert(inspection.id.0, inspection.clone());
                    true
                }
                _ => false,
            });
        Ok(inserted)
    }

    async fn get_inspection(&self, id: InspectionId) -> Result<Option<Inspection>, StoreError> {
        Ok(self.inspections.get(&id.0))
    }

    async fn list_inspections(&self, internship_id: InternshipId) -> Result<Vec<Inspection>, StoreError> {
        let mut rows = self
            .inspections
            .filter(|inspection| inspection.internship_id == internship_id);
        rows.sort_by(|a, b| (a.date, a.recorded_at).cmp(&(b.date, b.recorded_at)));
        Ok(rows)
    }

    async fn update_inspection(&self, inspection: &Inspection) -> Result<bool, StoreError> {
        let updated = self.inspections.update(&inspection.id.0, |row| {
            row.date = inspection.date;
            row.kind = inspection.kind.clone();
            row.result = inspection.result.clone();
            row.note = inspection.note.clone();
        });
        Ok(updated.is_some())
    }
}
