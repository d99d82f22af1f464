//! # Workflow Records
//!
//! The internship row the workflow mutates, and the set row it only reads.

use serde::{Deserialize, Serialize};

use placement_core::{Actor, InternshipId, Role, SetId, Timestamp, UserId};

use crate::lifecycle::InternshipState;

/// An internship set (cohort). Read-only context for the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipSet {
    pub id: SetId,
    pub name: String,
    /// Whether the set is the current cohort.
    pub active: bool,
    /// When `false`, only administrators may mutate internships in the set.
    pub editable: bool,
}

impl InternshipSet {
    /// A new, active and editable set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SetId::new(),
            name: name.into(),
            active: true,
            editable: true,
        }
    }

    /// Whether mutations by `actor` must be refused with `SetLocked`.
    pub fn is_locked_for(&self, actor: &Actor) -> bool {
        !self.editable && actor.role != Role::Admin
    }
}

/// The workflow subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
    pub id: InternshipId,
    pub set_id: SetId,
    /// The student the internship belongs to. Never changes.
    pub owner_id: UserId,
    pub state: InternshipState,
    /// Principal currently holding the inspection reservation.
    /// Only ever `Some` while `state` is non-terminal.
    pub reservation_holder_id: Option<UserId>,
    pub highlighted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Internship {
    /// A freshly created internship: `Founded`, unreserved, not highlighted.
    pub fn found(set_id: SetId, owner_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: InternshipId::new(),
            set_id,
            owner_id,
            state: InternshipState::Founded,
            reservation_holder_id: None,
            highlighted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the internship is in a sink state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the reservation invariant holds for this row.
    pub fn reservation_consistent(&self) -> bool {
        self.reservation_holder_id.is_none() || !self.is_terminal()
    }
}
