//! # Acting Principal
//!
//! The caller of a workflow operation: a role plus, for every role except
//! `Guest`, the user the caller is acting as.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::UserId;

/// Roles ordered by privilege level.
///
/// The `Ord` derivation follows declaration order:
/// `Guest < Student < Teacher < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unauthenticated visitor.
    Guest,
    /// Student owning internships.
    Student,
    /// Teacher supervising and inspecting internships.
    Teacher,
    /// Administrator with override rights.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// The principal performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's role.
    pub role: Role,
    /// The user the caller acts as. `None` only for guests.
    pub user_id: Option<UserId>,
}

impl Actor {
    /// An anonymous visitor.
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            user_id: None,
        }
    }

    /// A student acting as `id`.
    pub fn student(id: UserId) -> Self {
        Self {
            role: Role::Student,
            user_id: Some(id),
        }
    }

    /// A teacher acting as `id`.
    pub fn teacher(id: UserId) -> Self {
        Self {
            role: Role::Teacher,
            user_id: Some(id),
        }
    }

    /// An administrator acting as `id`.
    pub fn admin(id: UserId) -> Self {
        Self {
            role: Role::Admin,
            user_id: Some(id),
        }
    }

    /// Whether the caller is the given user.
    pub fn is_user(&self, id: &UserId) -> bool {
        self.user_id.as_ref() == Some(id)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.user_id {
            Some(id) => write!(f, "{}({})", self.role, id),
            None => f.write_str(self.role.as_str()),
        }
    }
}
