//! Reservation ledger.
//!
//! At most one principal holds an internship's reservation. Claims and
//! transfers are conditional writes at the storage boundary; a claim that
//! matches no row is re-read only to pick the error.

use std::sync::Arc;

use placement_core::{Actor, UserId};
use placement_state::{classify_lost_claim, Internship, WorkflowError};

use super::storage_failure;
use crate::store::WorkflowRepository;

#[derive(Debug, Clone)]
pub struct ReservationLedger {
    repo: Arc<dyn WorkflowRepository>,
}

impl ReservationLedger {
    pub fn new(repo: Arc<dyn WorkflowRepository>) -> Self {
        Self { repo }
    }

    /// Take the reservation for `holder`.
    ///
    /// Fails with `AlreadyReserved` when anyone, including `holder`, already
    /// holds it, and with `InternshipClosed` on a terminal internship. A
    /// retried claim whose first attempt succeeded therefore reports
    /// `AlreadyReserved` rather than claiming twice.
    pub async fn claim(
        &self,
        internship: &Internship,
        holder: UserId,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let claimed = self
            .repo
            .claim_reservation(internship.id, holder)
            .await
            .map_err(storage_failure)?;

        if claimed {
            tracing::info!(internship_id = %internship.id, holder = %holder, actor = %actor, "reservation claimed");
            return Ok(());
        }

        let current = self
            .repo
            .get_internship(internship.id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("internship", internship.id))?;
        tracing::debug!(
            internship_id = %internship.id,
            holder = ?current.reservation_holder_id,
            state = %current.state,
            actor = %actor,
            "reservation claim lost"
        );
        Err(classify_lost_claim(&current))
    }

    /// Clear the reservation. Releasing an unheld reservation succeeds.
    pub async fn release(&self, internship: &Internship, actor: &Actor) -> Result<(), WorkflowError> {
        let released = self
            .repo
            .release_reservation(internship.id)
            .await
            .map_err(storage_failure)?;
        if !released {
            return Err(WorkflowError::not_found("internship", internship.id));
        }

        tracing::info!(
            internship_id = %internship.id,
            previous = ?internship.reservation_holder_id,
            actor = %actor,
            "reservation released"
        );
        Ok(())
    }

    /// Hand the reservation to `new_holder`, whoever holds it now.
    pub async fn transfer(
        &self,
        internship: &Internship,
        new_holder: UserId,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let transferred = self
            .repo
            .transfer_reservation(internship.id, new_holder)
            .await
            .map_err(storage_failure)?;

        if transferred {
            tracing::info!(
                internship_id = %internship.id,
                from = ?internship.reservation_holder_id,
                to = %new_holder,
                actor = %actor,
                "reservation transferred"
            );
            return Ok(());
        }

        let current = self
            .repo
            .get_internship(internship.id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("internship", internship.id))?;
        tracing::debug!(internship_id = %internship.id, state = %current.state, "reservation transfer refused");
        Err(WorkflowError::InternshipClosed {
            internship_id: current.id.to_string(),
            state: current.state,
        })
    }
}
