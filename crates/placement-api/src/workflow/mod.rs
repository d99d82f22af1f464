//! # Workflow Facade
//!
//! The single entry surface for every workflow operation. It composes the
//! pure rules from `placement-state` with a [`WorkflowRepository`]:
//!
//! - `transition_state`: load, Gate, set lock, then the state machine's
//!   conditional write ([`transitions`]).
//! - `claim_reservation` / `release_reservation` / `transfer_reservation`:
//!   load, Gate, set lock, then the reservation ledger ([`ledger`]).
//! - `record_inspection`: the inspection recorder, which performs its own
//!   ordered admissibility check ([`recorder`]).
//!
//! The acting principal is always an explicit argument. The facade keeps no
//! state of its own; everything lives behind the repository, so any number
//! of facades (or API instances) may run against the same storage.

pub mod ledger;
pub mod recorder;
pub mod transitions;

use std::sync::Arc;

use placement_core::{Actor, InspectionId, InternshipId, Role, SetId, UserId};
use placement_state::{
    require, Inspection, InspectionDraft, InspectionPatch, Internship, InternshipSet,
    InternshipState, Operation, Subject, WorkflowError,
};

use crate::store::{StoreError, WorkflowRepository};

pub use ledger::ReservationLedger;
pub use recorder::InspectionRecorder;
pub use transitions::StateMachine;

/// Log and convert a storage failure.
pub(crate) fn storage_failure(err: StoreError) -> WorkflowError {
    tracing::error!(error = %err, "workflow storage operation failed");
    err.into()
}

/// Workflow entry point shared by all request handlers.
#[derive(Debug, Clone)]
pub struct Workflow {
    repo: Arc<dyn WorkflowRepository>,
    machine: StateMachine,
    ledger: ReservationLedger,
    recorder: InspectionRecorder,
}

impl Workflow {
    pub fn new(repo: Arc<dyn WorkflowRepository>) -> Self {
        Self {
            machine: StateMachine::new(Arc::clone(&repo)),
            ledger: ReservationLedger::new(Arc::clone(&repo)),
            recorder: InspectionRecorder::new(Arc::clone(&repo)),
            repo,
        }
    }

    // ── Shared steps ────────────────────────────────────────────────

    async fn load(&self, id: InternshipId) -> Result<Internship, WorkflowError> {
        self.repo
            .get_internship(id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("internship", id))
    }

    /// Refuse with `SetLocked` when the set is not editable and the actor
    /// is not an administrator.
    ///
    /// This read only chooses the error. It never stands in for a
    /// conditional write's own predicate.
    async fn ensure_set_editable(&self, set_id: SetId, actor: &Actor) -> Result<(), WorkflowError> {
        if actor.role == Role::Admin {
            return Ok(());
        }
        let set = self
            .repo
            .get_set(set_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("set", set_id))?;
        if set.is_locked_for(actor) {
            return Err(WorkflowError::SetLocked {
                set_id: set_id.to_string(),
            });
        }
        Ok(())
    }

    /// Load, Gate, then set lock, for operations on an existing internship.
    async fn admit(
        &self,
        id: InternshipId,
        op: Operation,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        let internship = self.load(id).await?;
        require(actor, op, &Subject::internship(&internship))?;
        self.ensure_set_editable(internship.set_id, actor).await?;
        Ok(internship)
    }

    // ── State machine ───────────────────────────────────────────────

    /// Current state. Guests may read it.
    pub async fn get_state(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<InternshipState, WorkflowError> {
        let internship = self.load(id).await?;
        require(actor, Operation::ReadState, &Subject::internship(&internship))?;
        Ok(internship.state)
    }

    /// Move an internship to the state with code `target`.
    pub async fn transition_state(
        &self,
        id: InternshipId,
        target: i64,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        let internship = self.admit(id, Operation::Transition, actor).await?;
        self.machine.transition(&internship, target, actor).await
    }

    // ── Reservation ledger ──────────────────────────────────────────

    pub async fn claim_reservation(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<UserId, WorkflowError> {
        let internship = self.admit(id, Operation::Claim, actor).await?;
        let holder = actor.user_id.ok_or_else(|| WorkflowError::Forbidden {
            actor: actor.to_string(),
            operation: Operation::Claim.describe(),
        })?;
        self.ledger.claim(&internship, holder, actor).await?;
        Ok(holder)
    }

    pub async fn release_reservation(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let internship = self.admit(id, Operation::Release, actor).await?;
        self.ledger.release(&internship, actor).await
    }

    pub async fn transfer_reservation(
        &self,
        id: InternshipId,
        new_holder: UserId,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let internship = self.admit(id, Operation::Transfer, actor).await?;
        self.ledger.transfer(&internship, new_holder, actor).await
    }

    /// Current reservation holder, if any. Side-effect free.
    pub async fn peek_reservation(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<Option<UserId>, WorkflowError> {
        let internship = self.load(id).await?;
        require(actor, Operation::ReadRecord, &Subject::internship(&internship))?;
        Ok(internship.reservation_holder_id)
    }

    // ── Inspections ─────────────────────────────────────────────────

    pub async fn record_inspection(
        &self,
        id: InternshipId,
        draft: InspectionDraft,
        actor: &Actor,
    ) -> Result<Inspection, WorkflowError> {
        self.recorder.record(id, draft, actor).await
    }

    pub async fn list_inspections(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<Vec<Inspection>, WorkflowError> {
        let internship = self.load(id).await?;
        require(actor, Operation::ReadInspections, &Subject::internship(&internship))?;
        self.repo.list_inspections(id).await.map_err(storage_failure)
    }

    pub async fn correct_inspection(
        &self,
        id: InspectionId,
        patch: InspectionPatch,
        actor: &Actor,
    ) -> Result<Inspection, WorkflowError> {
        self.recorder.correct(id, patch, actor).await
    }

    // ── Records ─────────────────────────────────────────────────────

    /// Create a `Founded`, unreserved internship in `set_id` for `owner`.
    pub async fn create_internship(
        &self,
        set_id: SetId,
        owner: UserId,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        require(actor, Operation::CreateInternship, &Subject::owned_by(owner))?;
        let set = self
            .repo
            .get_set(set_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("set", set_id))?;
        if set.is_locked_for(actor) {
            return Err(WorkflowError::SetLocked {
                set_id: set_id.to_string(),
            });
        }

        let internship = Internship::found(set_id, owner);
        self.repo
            .insert_internship(&internship)
            .await
            .map_err(storage_failure)?;

        tracing::info!(internship_id = %internship.id, set_id = %set_id, owner = %owner, actor = %actor, "internship created");
        Ok(internship)
    }

    pub async fn get_internship(
        &self,
        id: InternshipId,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        let internship = self.load(id).await?;
        require(actor, Operation::ReadRecord, &Subject::internship(&internship))?;
        Ok(internship)
    }

    pub async fn set_highlighted(
        &self,
        id: InternshipId,
        highlighted: bool,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        self.admit(id, Operation::Highlight, actor).await?;
        let updated = self
            .repo
            .set_highlighted(id, highlighted)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("internship", id))?;

        tracing::info!(internship_id = %id, highlighted, actor = %actor, "highlight updated");
        Ok(updated)
    }

    // ── Sets ────────────────────────────────────────────────────────

    pub async fn create_set(
        &self,
        name: String,
        editable: bool,
        actor: &Actor,
    ) -> Result<InternshipSet, WorkflowError> {
        require(actor, Operation::ManageSets, &Subject::none())?;
        let set = InternshipSet {
            editable,
            ..InternshipSet::new(name)
        };
        self.repo.insert_set(&set).await.map_err(storage_failure)?;

        tracing::info!(set_id = %set.id, actor = %actor, "internship set created");
        Ok(set)
    }

    pub async fn update_set(
        &self,
        id: SetId,
        active: Option<bool>,
        editable: Option<bool>,
        actor: &Actor,
    ) -> Result<InternshipSet, WorkflowError> {
        require(actor, Operation::ManageSets, &Subject::none())?;
        let set = self
            .repo
            .update_set_flags(id, active, editable)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("set", id))?;

        tracing::info!(set_id = %id, active = set.active, editable = set.editable, actor = %actor, "internship set updated");
        Ok(set)
    }
}
