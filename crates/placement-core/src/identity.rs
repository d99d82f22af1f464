//! # Identifier Newtypes
//!
//! Every record kind in the workflow gets its own identifier type so that
//! ids from different tables cannot be confused at call sites.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Generates a UUID-backed identifier newtype with the shared surface:
/// random construction, UUID access, a prefixed `Display`, and `FromStr`.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|e| ValidationError::InvalidIdentifier {
                        kind: $prefix,
                        value: s.to_string(),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of an internship record (the workflow subject).
    InternshipId,
    "internship"
);

uuid_identifier!(
    /// Identifier of a user: students, teachers and administrators alike.
    UserId,
    "user"
);

uuid_identifier!(
    /// Identifier of an internship set (a cohort sharing term dates and editability).
    SetId,
    "set"
);

uuid_identifier!(
    /// Identifier of an inspection event.
    InspectionId,
    "inspection"
);
