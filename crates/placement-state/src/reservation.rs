//! # Reservation Predicates
//!
//! The reservation itself is a single nullable column on the internship row.
//! Mutual exclusion is the job of the storage layer's conditional writes;
//! this module holds the predicates those writes encode, so that every
//! backend applies exactly the same rule, and the classification of a write
//! that lost its race.

use placement_core::UserId;

use crate::error::WorkflowError;
use crate::lifecycle::InternshipState;
use crate::record::Internship;

/// Whether a claim may take the reservation: nobody holds it and the
/// internship is still open.
///
/// This is the predicate of the claim's compare-and-swap. It must only be
/// evaluated inside the same atomic unit as the write.
pub fn can_claim(internship: &Internship) -> bool {
    internship.reservation_holder_id.is_none() && !internship.is_terminal()
}

/// Whether the reservation may be reassigned: the internship is still open.
pub fn can_transfer(internship: &Internship) -> bool {
    !internship.is_terminal()
}

/// The holder a row carries after moving to `target`. Entering a terminal
/// state drops the reservation.
pub fn holder_after_transition(target: InternshipState, holder: Option<UserId>) -> Option<UserId> {
    if target.is_terminal() {
        None
    } else {
        holder
    }
}

/// Explain why a claim's conditional write matched no row, given a fresh
/// read of the internship.
///
/// A row that reads as claimable again (the winner released in between)
/// is still reported as `AlreadyReserved`: the caller lost the race it
/// entered.
pub fn classify_lost_claim(current: &Internship) -> WorkflowError {
    if current.is_terminal() {
        WorkflowError::InternshipClosed {
            internship_id: current.id.to_string(),
            state: current.state,
        }
    } else {
        WorkflowError::AlreadyReserved {
            internship_id: current.id.to_string(),
        }
    }
}
