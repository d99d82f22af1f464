//! Inspection recorder.
//!
//! Admissibility is checked in a fixed order (existence, lifecycle,
//! authorization) against a fresh read, and the append itself is
//! conditional on the internship still being open. A transition into a
//! terminal state that races the append either lands first, and the
//! append is refused, or lands after it.

use std::sync::Arc;

use placement_core::{Actor, InspectionId, InternshipId, UserId};
use placement_state::{
    admit_inspection, require, Inspection, InspectionDraft, InspectionPatch, Operation, Subject,
    WorkflowError,
};

use super::storage_failure;
use crate::store::WorkflowRepository;

#[derive(Debug, Clone)]
pub struct InspectionRecorder {
    repo: Arc<dyn WorkflowRepository>,
}

impl InspectionRecorder {
    pub fn new(repo: Arc<dyn WorkflowRepository>) -> Self {
        Self { repo }
    }

    /// Append a new inspection for `internship_id`, performed by `actor`.
    pub async fn record(
        &self,
        internship_id: InternshipId,
        draft: InspectionDraft,
        actor: &Actor,
    ) -> Result<Inspection, WorkflowError> {
        let loaded = self
            .repo
            .get_internship(internship_id)
            .await
            .map_err(storage_failure)?;
        let internship = admit_inspection(&internship_id, loaded.as_ref(), actor)?;

        let inspector = inspector_of(actor)?;
        let inspection = Inspection::record(internship.id, inspector, draft);

        let inserted = self
            .repo
            .insert_inspection_if_open(&inspection)
            .await
            .map_err(storage_failure)?;

        if inserted {
            tracing::info!(
                inspection_id = %inspection.id,
                internship_id = %internship_id,
                actor = %actor,
                "inspection recorded"
            );
            return Ok(inspection);
        }

        let current = self
            .repo
            .get_internship(internship_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("internship", internship_id))?;
        tracing::debug!(internship_id = %internship_id, state = %current.state, "inspection lost a race with a transition");
        if current.is_terminal() {
            Err(WorkflowError::InternshipClosed {
                internship_id: internship_id.to_string(),
                state: current.state,
            })
        } else {
            Err(WorkflowError::StaleState {
                internship_id: internship_id.to_string(),
                expected: internship.state,
            })
        }
    }

    /// Correct a recorded inspection. Only its inspector or an administrator
    /// may do so; the internship is never touched.
    pub async fn correct(
        &self,
        id: InspectionId,
        patch: InspectionPatch,
        actor: &Actor,
    ) -> Result<Inspection, WorkflowError> {
        let mut inspection = self
            .repo
            .get_inspection(id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| WorkflowError::not_found("inspection", id))?;

        require(
            actor,
            Operation::CorrectInspection,
            &Subject::inspection(inspection.inspector_id),
        )?;

        if patch.is_empty() {
            return Ok(inspection);
        }
        inspection.apply(patch);

        let updated = self
            .repo
            .update_inspection(&inspection)
            .await
            .map_err(storage_failure)?;
        if !updated {
            return Err(WorkflowError::not_found("inspection", id));
        }

        tracing::info!(inspection_id = %id, actor = %actor, "inspection corrected");
        Ok(inspection)
    }
}

fn inspector_of(actor: &Actor) -> Result<UserId, WorkflowError> {
    actor.user_id.ok_or_else(|| WorkflowError::Forbidden {
        actor: actor.to_string(),
        operation: Operation::RecordInspection.describe(),
    })
}
