//! # Internship Lifecycle State Machine
//!
//! ## States
//!
//! ```text
//! Founded(0) ──▶ Approved(1) ──▶ Confirmed(2) ──▶ InProgress(3) ──▶ Completed(6)
//!
//! any non-terminal ──▶ Denied(4) | Cancelled(5)
//! ```
//!
//! `Denied`, `Cancelled` and `Completed` are sinks. Only an administrator
//! may move an internship out of them, and only an administrator may move
//! an internship back to `Founded`.
//!
//! ## Role gating
//!
//! | Role    | Edges                                                   |
//! |---------|---------------------------------------------------------|
//! | Admin   | any distinct pair of states                             |
//! | Teacher | forward-progress edges and non-terminal → Denied/Cancelled |
//! | Student | Founded → Cancelled                                     |
//! | Guest   | none                                                    |
//!
//! Ownership (a student may only withdraw their *own* request) is checked
//! by the [`gate`](crate::gate), not here.

use serde::{Deserialize, Serialize};

use placement_core::Role;

/// Lifecycle state of an internship.
///
/// The discriminants are the numeric codes exchanged on the wire and stored
/// in the `state` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum InternshipState {
    /// Request created, awaiting approval.
    Founded = 0,
    /// Approved by the school.
    Approved = 1,
    /// Confirmed by the host company.
    Confirmed = 2,
    /// Placement underway.
    InProgress = 3,
    /// Rejected (terminal).
    Denied = 4,
    /// Withdrawn (terminal).
    Cancelled = 5,
    /// Finished (terminal).
    Completed = 6,
}

impl InternshipState {
    /// All states in code order.
    pub const ALL: [InternshipState; 7] = [
        Self::Founded,
        Self::Approved,
        Self::Confirmed,
        Self::InProgress,
        Self::Denied,
        Self::Cancelled,
        Self::Completed,
    ];

    /// The non-terminal states, the only ones that may carry a reservation
    /// or receive inspections.
    pub const OPEN: [InternshipState; 4] = [
        Self::Founded,
        Self::Approved,
        Self::Confirmed,
        Self::InProgress,
    ];

    /// Numeric wire/storage code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Decode a numeric code. Returns `None` for anything outside 0..=6.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Founded),
            1 => Some(Self::Approved),
            2 => Some(Self::Confirmed),
            3 => Some(Self::InProgress),
            4 => Some(Self::Denied),
            5 => Some(Self::Cancelled),
            6 => Some(Self::Completed),
            _ => None,
        }
    }

    /// Canonical state name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Founded => "FOUNDED",
            Self::Approved => "APPROVED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Denied => "DENIED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether this state is a sink.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Denied | Self::Cancelled | Self::Completed)
    }

    /// The next state along the forward-progress path, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Founded => Some(Self::Approved),
            Self::Approved => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Denied | Self::Cancelled | Self::Completed => None,
        }
    }

    /// States reachable from `self` for the given role.
    pub fn valid_transitions(&self, role: Role) -> Vec<InternshipState> {
        Self::ALL
            .into_iter()
            .filter(|target| can_transition(*self, *target, role))
            .collect()
    }
}

impl std::fmt::Display for InternshipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Membership test against the seven defined state codes.
pub fn is_valid_state(code: i64) -> bool {
    InternshipState::from_code(code).is_some()
}

/// Whether `role` may move an internship from `current` to `target`.
///
/// A transition to the current state is never valid, not even for an
/// administrator.
pub fn can_transition(current: InternshipState, target: InternshipState, role: Role) -> bool {
    if current == target {
        return false;
    }
    match role {
        Role::Admin => true,
        Role::Teacher => is_forward_edge(current, target) || is_escape_edge(current, target),
        Role::Student => {
            current == InternshipState::Founded && target == InternshipState::Cancelled
        }
        Role::Guest => false,
    }
}

fn is_forward_edge(current: InternshipState, target: InternshipState) -> bool {
    current.next() == Some(target)
}

fn is_escape_edge(current: InternshipState, target: InternshipState) -> bool {
    !current.is_terminal()
        && matches!(target, InternshipState::Denied | InternshipState::Cancelled)
}
