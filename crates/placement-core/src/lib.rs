//! # placement-core: Foundational Types for the Placement Workflow
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! shares: identifier newtypes, the acting principal, and UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `InternshipId`, `UserId`, `SetId`,
//!    `InspectionId` are distinct types. An inspection id cannot be passed
//!    where an internship id is expected.
//!
//! 2. **Explicit principal.** The caller's identity and role travel as an
//!    [`Actor`] argument into every workflow operation. Nothing reads the
//!    acting user from ambient request state.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is always UTC with seconds
//!    precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `placement-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod actor;
pub mod error;
pub mod identity;
pub mod temporal;

pub use actor::{Actor, Role};
pub use error::ValidationError;
pub use identity::{InspectionId, InternshipId, SetId, UserId};
pub use temporal::Timestamp;
