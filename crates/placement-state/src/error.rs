//! # Workflow Errors
//!
//! Every refusal the workflow can produce is a distinct variant so that the
//! caller can explain *why* an operation was refused. None of these are
//! collapsed into one another, and none is downgraded to a silent no-op.
//!
//! Only [`WorkflowError::Storage`] represents an infrastructure failure; all
//! other variants are expected outcomes of a well-formed request.

use thiserror::Error;

use crate::lifecycle::InternshipState;

/// Errors returned by workflow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Subject record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind ("internship", "inspection", "set").
        kind: &'static str,
        /// Identifier as displayed.
        id: String,
    },

    /// Target state code is not one of the seven defined states.
    #[error("invalid state value {0}: expected a code between 0 and 6")]
    InvalidStateValue(i64),

    /// Target state is valid but not reachable for this actor.
    #[error("cannot transition from {from} to {to} as {role}")]
    InvalidTransition {
        /// Current state.
        from: InternshipState,
        /// Requested state.
        to: InternshipState,
        /// Role of the acting principal.
        role: String,
    },

    /// Enclosing set is not editable and the actor is not an administrator.
    #[error("set {set_id} is locked for editing")]
    SetLocked {
        /// The locked set.
        set_id: String,
    },

    /// Role or ownership check failed.
    #[error("{actor} may not {operation}")]
    Forbidden {
        /// The refused principal, as displayed.
        actor: String,
        /// The refused operation.
        operation: &'static str,
    },

    /// Claim attempted on an internship someone already holds.
    #[error("internship {internship_id} is already reserved")]
    AlreadyReserved {
        /// The contended internship.
        internship_id: String,
    },

    /// Inspection or reservation attempted on a terminal internship.
    #[error("internship {internship_id} is closed ({state})")]
    InternshipClosed {
        /// The closed internship.
        internship_id: String,
        /// Its terminal state.
        state: InternshipState,
    },

    /// A concurrent writer changed the state between read and conditional write.
    #[error("internship {internship_id} is no longer in state {expected}")]
    StaleState {
        /// The contended internship.
        internship_id: String,
        /// The state the caller acted on.
        expected: InternshipState,
    },

    /// Storage backend unavailable. Safe to retry.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidStateValue(_) => "INVALID_STATE_VALUE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::SetLocked { .. } => "SET_LOCKED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::AlreadyReserved { .. } => "ALREADY_RESERVED",
            Self::InternshipClosed { .. } => "INTERNSHIP_CLOSED",
            Self::StaleState { .. } => "STALE_STATE",
            Self::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Whether this error is an infrastructure failure rather than a refusal.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Shorthand for a `NotFound` on a record kind.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            WorkflowError::not_found("internship", "x"),
            WorkflowError::InvalidStateValue(9),
            WorkflowError::InvalidTransition {
                from: InternshipState::Approved,
                to: InternshipState::Founded,
                role: "teacher".into(),
            },
            WorkflowError::SetLocked { set_id: "s".into() },
            WorkflowError::Forbidden {
                actor: "guest".into(),
                operation: "claim a reservation",
            },
            WorkflowError::AlreadyReserved {
                internship_id: "x".into(),
            },
            WorkflowError::InternshipClosed {
                internship_id: "x".into(),
                state: InternshipState::Completed,
            },
            WorkflowError::StaleState {
                internship_id: "x".into(),
                expected: InternshipState::Founded,
            },
            WorkflowError::Storage("down".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(WorkflowError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_storage_is_infrastructure() {
        assert!(WorkflowError::Storage("pool timed out".into()).is_infrastructure());
        assert!(!WorkflowError::InvalidStateValue(-1).is_infrastructure());
    }

    #[test]
    fn messages_name_the_states() {
        let err = WorkflowError::InvalidTransition {
            from: InternshipState::Approved,
            to: InternshipState::Cancelled,
            role: "student".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot transition from APPROVED to CANCELLED as student"
        );
    }
}
