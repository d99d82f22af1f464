//! State machine service.
//!
//! Validates a requested target against the lifecycle rules, then commits
//! it with a compare-and-swap on the state the caller loaded. A concurrent
//! writer that got there first turns the swap into `StaleState` instead of
//! a lost update.

use std::sync::Arc;

use placement_core::Actor;
use placement_state::{can_transition, Internship, InternshipState, WorkflowError};

use super::storage_failure;
use crate::store::WorkflowRepository;

#[derive(Debug, Clone)]
pub struct StateMachine {
    repo: Arc<dyn WorkflowRepository>,
}

impl StateMachine {
    pub fn new(repo: Arc<dyn WorkflowRepository>) -> Self {
        Self { repo }
    }

    /// Check and apply the transition of `current` to the state coded `target`.
    ///
    /// Gate and set-lock checks happen before this is called.
    pub async fn transition(
        &self,
        current: &Internship,
        target: i64,
        actor: &Actor,
    ) -> Result<Internship, WorkflowError> {
        let target =
            InternshipState::from_code(target).ok_or(WorkflowError::InvalidStateValue(target))?;

        if !can_transition(current.state, target, actor.role) {
            return Err(WorkflowError::InvalidTransition {
                from: current.state,
                to: target,
                role: actor.role.to_string(),
            });
        }

        let updated = self
            .repo
            .compare_and_set_state(current.id, current.state, target)
            .await
            .map_err(storage_failure)?;

        match updated {
            Some(internship) => {
                tracing::info!(
                    internship_id = %internship.id,
                    from = %current.state,
                    to = %target,
                    actor = %actor,
                    "internship state changed"
                );
                Ok(internship)
            }
            None => Err(self.explain_lost_swap(current).await),
        }
    }

    async fn explain_lost_swap(&self, expected: &Internship) -> WorkflowError {
        match self.repo.get_internship(expected.id).await {
            Ok(Some(now)) => {
                tracing::debug!(
                    internship_id = %expected.id,
                    expected = %expected.state,
                    found = %now.state,
                    "state transition lost a concurrent race"
                );
                WorkflowError::StaleState {
                    internship_id: expected.id.to_string(),
                    expected: expected.state,
                }
            }
            Ok(None) => WorkflowError::not_found("internship", expected.id),
            Err(e) => storage_failure(e),
        }
    }
}
