//! # placement-state: Internship Lifecycle Rules
//!
//! Pure decision logic for the internship workflow. Nothing in this crate
//! performs I/O; the storage boundary and the HTTP surface live in
//! `placement-api` and call into these rules.
//!
//! ## Components
//!
//! - **Lifecycle** (`lifecycle.rs`): the seven internship states and the
//!   role-gated transition graph.
//!
//!   ```text
//!   Founded ──▶ Approved ──▶ Confirmed ──▶ InProgress ──▶ Completed
//!      │           │            │              │
//!      └───────────┴────────────┴──────────────┴──▶ Denied | Cancelled
//!   ```
//!
//! - **Gate** (`gate.rs`): the role authorization gate consulted before
//!   every mutation.
//!
//! - **Reservation** (`reservation.rs`): predicates shared by every storage
//!   backend's conditional writes, and classification of lost races.
//!
//! - **Inspection** (`inspection.rs`): the immutable inspection event and the
//!   ordered admissibility check (existence, lifecycle, authorization).
//!
//! - **Records** (`record.rs`): `Internship` and `InternshipSet`.
//!
//! ## Design
//!
//! States are a runtime enum rather than typestates: the current state is
//! always loaded from storage, and the facade must report *why* a transition
//! was refused, so every check returns a distinct [`WorkflowError`] variant.

pub mod error;
pub mod gate;
pub mod inspection;
pub mod lifecycle;
pub mod record;
pub mod reservation;

pub use error::WorkflowError;
pub use gate::{allow, require, Operation, Subject};
pub use inspection::{admit_inspection, Inspection, InspectionDraft, InspectionPatch};
pub use lifecycle::{can_transition, is_valid_state, InternshipState};
pub use record::{Internship, InternshipSet};
pub use reservation::{can_claim, can_transfer, classify_lost_claim, holder_after_transition};
