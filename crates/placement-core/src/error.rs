//! # Validation Errors
//!
//! Errors raised while constructing core values from untrusted input
//! (bearer tokens, identifiers).

use thiserror::Error;

/// A value supplied by a caller could not be turned into a core type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is not a UUID.
    #[error("invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Which identifier namespace was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Role name is not one of the known roles.
    #[error("unknown role: {0:?}")]
    UnknownRole(String),
}
