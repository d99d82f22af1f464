//! # Inspection Events
//!
//! An inspection is an immutable record of one visit or contact. It is
//! appended against an internship and never changes the internship itself.
//!
//! ## Admissibility
//!
//! [`admit_inspection`] checks, in this order:
//!
//! 1. the internship exists (`NotFound`);
//! 2. the internship is not terminal (`InternshipClosed`);
//! 3. the actor is the reservation holder, a teacher or an admin (`Forbidden`).
//!
//! The order is part of the contract: a closed internship reports
//! `InternshipClosed` even to an administrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use placement_core::{Actor, InspectionId, InternshipId, Timestamp, UserId};

use crate::error::WorkflowError;
use crate::gate::{require, Operation, Subject};
use crate::record::Internship;

/// A recorded inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: InspectionId,
    pub internship_id: InternshipId,
    /// Who performed the inspection.
    pub inspector_id: UserId,
    /// Day the inspection took place.
    pub date: NaiveDate,
    /// Kind of contact (visit, phone call, ...), from the school's vocabulary.
    pub kind: String,
    /// Outcome, from the school's vocabulary.
    pub result: String,
    pub note: String,
    pub recorded_at: Timestamp,
}

/// Caller-supplied content of a new inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionDraft {
    pub kind: String,
    pub result: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
}

/// Correction of a recorded inspection. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionPatch {
    pub kind: Option<String>,
    pub result: Option<String>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl Inspection {
    /// Build the event for `draft`, recorded now by `inspector`.
    pub fn record(internship_id: InternshipId, inspector_id: UserId, draft: InspectionDraft) -> Self {
        Self {
            id: InspectionId::new(),
            internship_id,
            inspector_id,
            date: draft.date,
            kind: draft.kind,
            result: draft.result,
            note: draft.note,
            recorded_at: Timestamp::now(),
        }
    }

    /// Apply a correction in place.
    pub fn apply(&mut self, patch: InspectionPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(result) = patch.result {
            self.result = result;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
    }
}

impl InspectionPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.result.is_none() && self.date.is_none() && self.note.is_none()
    }
}

/// Ordered admissibility check for a new inspection.
///
/// Returns the internship on success so the caller can use it without
/// another read.
pub fn admit_inspection<'a>(
    id: &InternshipId,
    internship: Option<&'a Internship>,
    actor: &Actor,
) -> Result<&'a Internship, WorkflowError> {
    let internship = internship.ok_or_else(|| WorkflowError::not_found("internship", id))?;

    if internship.is_terminal() {
        return Err(WorkflowError::InternshipClosed {
            internship_id: internship.id.to_string(),
            state: internship.state,
        });
    }

    require(
        actor,
        Operation::RecordInspection,
        &Subject::internship(internship),
    )?;

    Ok(internship)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::InternshipState;
    use placement_core::SetId;

    fn draft() -> InspectionDraft {
        InspectionDraft {
            kind: "visit".into(),
            result: "satisfactory".into(),
            date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
            note: "Met the mentor on site.".into(),
        }
    }

    fn internship_in(state: InternshipState) -> Internship {
        let mut i = Internship::found(SetId::new(), UserId::new());
        i.state = state;
        i
    }

    #[test]
    fn missing_internship_is_not_found() {
        let id = InternshipId::new();
        let err = admit_inspection(&id, None, &Actor::admin(UserId::new())).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn completed_internship_is_closed_even_for_admin_holder() {
        let admin_id = UserId::new();
        let mut i = internship_in(InternshipState::Completed);
        i.reservation_holder_id = Some(admin_id);
        let err = admit_inspection(&i.id, Some(&i), &Actor::admin(admin_id)).unwrap_err();
        assert_eq!(err.code(), "INTERNSHIP_CLOSED");
    }

    #[test]
    fn closed_is_reported_before_forbidden() {
        let i = internship_in(InternshipState::Cancelled);
        let err = admit_inspection(&i.id, Some(&i), &Actor::guest()).unwrap_err();
        assert_eq!(err.code(), "INTERNSHIP_CLOSED");
    }

    #[test]
    fn open_internship_forbids_non_holder_student() {
        let i = internship_in(InternshipState::InProgress);
        let err = admit_inspection(&i.id, Some(&i), &Actor::student(i.owner_id)).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn teacher_and_holder_are_admitted() {
        let holder = UserId::new();
        let mut i = internship_in(InternshipState::Confirmed);
        assert!(admit_inspection(&i.id, Some(&i), &Actor::teacher(UserId::new())).is_ok());

        i.reservation_holder_id = Some(holder);
        assert!(admit_inspection(&i.id, Some(&i), &Actor::teacher(holder)).is_ok());
    }

    #[test]
    fn record_copies_draft() {
        let inspector = UserId::new();
        let internship_id = InternshipId::new();
        let inspection = Inspection::record(internship_id, inspector, draft());
        assert_eq!(inspection.internship_id, internship_id);
        assert_eq!(inspection.inspector_id, inspector);
        assert_eq!(inspection.kind, "visit");
        assert_eq!(inspection.note, "Met the mentor on site.");
    }

    #[test]
    fn patch_changes_only_present_fields() {
        let mut inspection = Inspection::record(InternshipId::new(), UserId::new(), draft());
        let before = inspection.clone();
        inspection.apply(InspectionPatch {
            note: Some("Mentor on leave, met the deputy.".into()),
            ..InspectionPatch::default()
        });
        assert_eq!(inspection.note, "Mentor on leave, met the deputy.");
        assert_eq!(inspection.kind, before.kind);
        assert_eq!(inspection.date, before.date);
        assert!(InspectionPatch::default().is_empty());
    }
}
