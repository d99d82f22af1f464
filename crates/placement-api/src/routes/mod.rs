//! # API Route Modules
//!
//! - `sets`: seeding and locking internship sets (administrators only).
//! - `internships`: creation, record and state reads, state transitions,
//!   and the highlight flag.
//! - `reservations`: claim, release, transfer and peek of the inspection
//!   reservation.
//! - `inspections`: recording, listing and correcting inspections.
//!
//! Every handler resolves the caller through [`crate::auth::Caller`] and
//! hands it to the [`crate::workflow::Workflow`] facade; no handler makes
//! an authorization decision of its own.

pub mod inspections;
pub mod internships;
pub mod reservations;
pub mod sets;
