//! # Role Authorization Gate
//!
//! A pure function answering "may this actor perform this operation on this
//! record". Consulted before every mutation and every personal read.
//!
//! ## Rules (in priority order)
//!
//! 1. Admin: every operation.
//! 2. Teacher: every reservation and inspection operation, every transition,
//!    highlighting, and reads on any internship. Corrections only on
//!    inspections the teacher recorded. No set management.
//! 3. Student: transitions, reads and internship creation on their own
//!    record only. Which edge a student may take is decided by
//!    [`can_transition`](crate::lifecycle::can_transition), so a wrong edge
//!    surfaces as `InvalidTransition` rather than `Forbidden`.
//! 4. Guest: reading the bare state only.
//!
//! Anything else is refused with [`WorkflowError::Forbidden`].

use placement_core::{Actor, Role, UserId};

use crate::error::WorkflowError;
use crate::record::Internship;

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read the lifecycle state.
    ReadState,
    /// Read the full record, including the owner and reservation holder.
    ReadRecord,
    /// Create an internship for the subject's owner.
    CreateInternship,
    /// Change the lifecycle state.
    Transition,
    /// Toggle the highlight flag.
    Highlight,
    /// Claim the reservation.
    Claim,
    /// Release the reservation.
    Release,
    /// Reassign the reservation.
    Transfer,
    /// Append an inspection.
    RecordInspection,
    /// List inspections.
    ReadInspections,
    /// Correct a recorded inspection.
    CorrectInspection,
    /// Create or lock internship sets.
    ManageSets,
}

impl Operation {
    /// Human-readable phrase used in `Forbidden` messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ReadState => "read the internship state",
            Self::ReadRecord => "read the internship",
            Self::CreateInternship => "create the internship",
            Self::Transition => "change the internship state",
            Self::Highlight => "highlight the internship",
            Self::Claim => "claim the reservation",
            Self::Release => "release the reservation",
            Self::Transfer => "transfer the reservation",
            Self::RecordInspection => "record an inspection",
            Self::ReadInspections => "list inspections",
            Self::CorrectInspection => "correct the inspection",
            Self::ManageSets => "manage internship sets",
        }
    }
}

/// The facts about the target record the gate needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Subject {
    /// Student owning the internship.
    pub owner: Option<UserId>,
    /// Current reservation holder.
    pub holder: Option<UserId>,
    /// Inspector who recorded the inspection being corrected.
    pub inspector: Option<UserId>,
}

impl Subject {
    /// No record: set management.
    pub fn none() -> Self {
        Self::default()
    }

    /// An internship about to be created for `owner`.
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// An existing internship.
    pub fn internship(internship: &Internship) -> Self {
        Self {
            owner: Some(internship.owner_id),
            holder: internship.reservation_holder_id,
            inspector: None,
        }
    }

    /// An inspection recorded by `inspector`.
    pub fn inspection(inspector: UserId) -> Self {
        Self {
            inspector: Some(inspector),
            ..Self::default()
        }
    }
}

/// Whether `actor` may perform `op` on `subject`.
pub fn allow(actor: &Actor, op: Operation, subject: &Subject) -> bool {
    let owns = subject.owner.is_some_and(|owner| actor.is_user(&owner));

    match actor.role {
        Role::Admin => true,
        Role::Teacher => match op {
            Operation::ManageSets => false,
            Operation::CorrectInspection => {
                subject.inspector.is_some_and(|inspector| actor.is_user(&inspector))
            }
            _ => actor.user_id.is_some(),
        },
        Role::Student => match op {
            Operation::ReadState
            | Operation::ReadRecord
            | Operation::ReadInspections
            | Operation::CreateInternship
            | Operation::Transition => owns,
            Operation::RecordInspection => {
                subject.holder.is_some_and(|holder| actor.is_user(&holder))
            }
            _ => false,
        },
        Role::Guest => op == Operation::ReadState,
    }
}

/// [`allow`], surfacing a refusal as `Forbidden`.
pub fn require(actor: &Actor, op: Operation, subject: &Subject) -> Result<(), WorkflowError> {
    if allow(actor, op, subject) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden {
            actor: actor.to_string(),
            operation: op.describe(),
        })
    }
}
