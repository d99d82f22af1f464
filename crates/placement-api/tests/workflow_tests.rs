//! # Workflow Facade Tests
//!
//! Exercises the facade against the in-memory repository: the lifecycle
//! scenarios, reservation races, inspection admissibility ordering, and
//! the propagation of storage failures.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use placement_api::store::{MemoryRepository, StoreError, WorkflowRepository};
use placement_api::workflow::{StateMachine, Workflow};
use placement_core::{Actor, InspectionId, InternshipId, SetId, UserId};
use placement_state::{
    Inspection, InspectionDraft, InspectionPatch, Internship, InternshipSet, InternshipState,
    WorkflowError,
};

// -- Fixtures -----------------------------------------------------------------

struct Fixture {
    workflow: Workflow,
    set: SetId,
    internship: InternshipId,
    owner: Actor,
    teacher: Actor,
    admin: Actor,
}

async fn fixture() -> Fixture {
    let workflow = Workflow::new(Arc::new(MemoryRepository::new()));
    let admin = Actor::admin(UserId::new());
    let teacher = Actor::teacher(UserId::new());
    let owner_id = UserId::new();

    let set = workflow
        .create_set("2026 spring".into(), true, &admin)
        .await
        .unwrap();
    let internship = workflow
        .create_internship(set.id, owner_id, &teacher)
        .await
        .unwrap();

    Fixture {
        workflow,
        set: set.id,
        internship: internship.id,
        owner: Actor::student(owner_id),
        teacher,
        admin,
    }
}

fn draft() -> InspectionDraft {
    InspectionDraft {
        kind: "visit".into(),
        result: "satisfactory".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
        note: "Met the mentor on site.".into(),
    }
}

fn code(state: InternshipState) -> i64 {
    i64::from(state.code())
}

// -- Lifecycle scenarios ------------------------------------------------------

#[tokio::test]
async fn test_teacher_progress_then_owner_cancel_refused_then_admin_cancels() {
    let f = fixture().await;

    let approved = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Approved), &f.teacher)
        .await
        .unwrap();
    assert_eq!(approved.state, InternshipState::Approved);

    let holder = f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap();
    assert_eq!(Some(holder), f.teacher.user_id);

    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Cancelled), &f.owner)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: InternshipState::Approved,
            to: InternshipState::Cancelled,
            ..
        }
    ));

    let cancelled = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Cancelled), &f.admin)
        .await
        .unwrap();
    assert_eq!(cancelled.state, InternshipState::Cancelled);
    assert_eq!(cancelled.reservation_holder_id, None);
}

#[tokio::test]
async fn test_locked_set_refuses_teacher_but_not_admin() {
    let f = fixture().await;
    f.workflow
        .transition_state(f.internship, code(InternshipState::Approved), &f.teacher)
        .await
        .unwrap();
    f.workflow
        .update_set(f.set, None, Some(false), &f.admin)
        .await
        .unwrap();

    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Confirmed), &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::SetLocked { .. }));

    let confirmed = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Confirmed), &f.admin)
        .await
        .unwrap();
    assert_eq!(confirmed.state, InternshipState::Confirmed);
}

#[tokio::test]
async fn test_owner_may_withdraw_founded_internship() {
    let f = fixture().await;
    let cancelled = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Cancelled), &f.owner)
        .await
        .unwrap();
    assert_eq!(cancelled.state, InternshipState::Cancelled);
}

#[tokio::test]
async fn test_other_student_is_forbidden_before_edge_check() {
    let f = fixture().await;
    let stranger = Actor::student(UserId::new());
    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Cancelled), &stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
}

#[tokio::test]
async fn test_invalid_state_value_is_distinct_from_invalid_transition() {
    let f = fixture().await;

    let err = f
        .workflow
        .transition_state(f.internship, 7, &f.teacher)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::InvalidStateValue(7));

    let err = f
        .workflow
        .transition_state(f.internship, -1, &f.admin)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::InvalidStateValue(-1));

    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Completed), &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_admin_same_state_is_invalid_transition() {
    let f = fixture().await;
    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Founded), &f.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_terminal_is_a_sink_for_teachers_but_not_admins() {
    let f = fixture().await;
    f.workflow
        .transition_state(f.internship, code(InternshipState::Denied), &f.teacher)
        .await
        .unwrap();

    let err = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Approved), &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    let reopened = f
        .workflow
        .transition_state(f.internship, code(InternshipState::Approved), &f.admin)
        .await
        .unwrap();
    assert_eq!(reopened.state, InternshipState::Approved);
}

#[tokio::test]
async fn test_missing_internship_is_not_found() {
    let f = fixture().await;
    let err = f
        .workflow
        .transition_state(InternshipId::new(), 1, &f.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { kind: "internship", .. }));
}

#[tokio::test]
async fn test_guest_reads_state_but_cannot_mutate() {
    let f = fixture().await;
    let guest = Actor::guest();

    let state = f.workflow.get_state(f.internship, &guest).await.unwrap();
    assert_eq!(state, InternshipState::Founded);

    let err = f.workflow.claim_reservation(f.internship, &guest).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
    let err = f.workflow.get_internship(f.internship, &guest).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transitions_have_one_winner() {
    let f = fixture().await;
    let workflow = f.workflow.clone();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let workflow = workflow.clone();
            let teacher = Actor::teacher(UserId::new());
            let id = f.internship;
            tokio::spawn(async move {
                workflow
                    .transition_state(id, code(InternshipState::Approved), &teacher)
                    .await
            })
        })
        .collect();

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(WorkflowError::StaleState { .. } | WorkflowError::InvalidTransition { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn test_transition_from_outdated_snapshot_is_stale_state() {
    let repo = Arc::new(MemoryRepository::new());
    let snapshot = Internship::found(SetId::new(), UserId::new());
    repo.insert_internship(&snapshot).await.unwrap();

    // Another writer approves after the snapshot was read.
    repo.compare_and_set_state(snapshot.id, InternshipState::Founded, InternshipState::Approved)
        .await
        .unwrap()
        .unwrap();

    let machine = StateMachine::new(repo.clone());
    let err = machine
        .transition(
            &snapshot,
            code(InternshipState::Denied),
            &Actor::teacher(UserId::new()),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WorkflowError::StaleState {
            internship_id: snapshot.id.to_string(),
            expected: InternshipState::Founded,
        }
    );

    let stored = repo.get_internship(snapshot.id).await.unwrap().unwrap();
    assert_eq!(stored.state, InternshipState::Approved);
}

#[tokio::test]
async fn test_transition_of_vanished_internship_is_not_found() {
    let repo = Arc::new(MemoryRepository::new());
    let snapshot = Internship::found(SetId::new(), UserId::new());

    let machine = StateMachine::new(repo);
    let err = machine
        .transition(&snapshot, code(InternshipState::Approved), &Actor::admin(UserId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { kind: "internship", .. }));
}

// -- Reservation ledger -------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_have_exactly_one_winner() {
    let f = fixture().await;
    let contenders: Vec<Actor> = (0..32).map(|_| Actor::teacher(UserId::new())).collect();

    let handles: Vec<_> = contenders
        .iter()
        .copied()
        .map(|actor| {
            let workflow = f.workflow.clone();
            let id = f.internship;
            tokio::spawn(async move { (actor, workflow.claim_reservation(id, &actor).await) })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        let (actor, outcome) = handle.await.unwrap();
        match outcome {
            Ok(holder) => {
                assert_eq!(Some(holder), actor.user_id);
                winners.push(holder);
            }
            Err(err) => assert!(
                matches!(err, WorkflowError::AlreadyReserved { .. }),
                "loser got {err}"
            ),
        }
    }

    assert_eq!(winners.len(), 1);
    let peeked = f.workflow.peek_reservation(f.internship, &f.admin).await.unwrap();
    assert_eq!(peeked, Some(winners[0]));
}

#[tokio::test]
async fn test_retried_claim_reports_already_reserved() {
    let f = fixture().await;
    f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap();
    let err = f
        .workflow
        .claim_reservation(f.internship, &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyReserved { .. }));
}

#[tokio::test]
async fn test_release_then_claim_by_other_actor_succeeds() {
    let f = fixture().await;
    let other = Actor::teacher(UserId::new());

    f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap();
    f.workflow.release_reservation(f.internship, &f.teacher).await.unwrap();
    let holder = f.workflow.claim_reservation(f.internship, &other).await.unwrap();

    assert_eq!(Some(holder), other.user_id);
    assert_eq!(
        f.workflow.peek_reservation(f.internship, &f.teacher).await.unwrap(),
        other.user_id
    );
}

#[tokio::test]
async fn test_release_of_unheld_reservation_is_ok() {
    let f = fixture().await;
    f.workflow.release_reservation(f.internship, &f.admin).await.unwrap();
    assert_eq!(
        f.workflow.peek_reservation(f.internship, &f.admin).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_students_never_touch_the_ledger() {
    let f = fixture().await;
    for err in [
        f.workflow.claim_reservation(f.internship, &f.owner).await.unwrap_err(),
        f.workflow.release_reservation(f.internship, &f.owner).await.unwrap_err(),
        f.workflow
            .transfer_reservation(f.internship, UserId::new(), &f.owner)
            .await
            .unwrap_err(),
    ] {
        assert!(matches!(err, WorkflowError::Forbidden { .. }));
    }
}

#[tokio::test]
async fn test_owner_may_peek_own_reservation() {
    let f = fixture().await;
    f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap();
    assert_eq!(
        f.workflow.peek_reservation(f.internship, &f.owner).await.unwrap(),
        f.teacher.user_id
    );
    let stranger = Actor::student(UserId::new());
    assert!(f.workflow.peek_reservation(f.internship, &stranger).await.is_err());
}

#[tokio::test]
async fn test_transfer_overwrites_holder() {
    let f = fixture().await;
    let successor = UserId::new();
    f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap();
    f.workflow
        .transfer_reservation(f.internship, successor, &f.teacher)
        .await
        .unwrap();
    assert_eq!(
        f.workflow.peek_reservation(f.internship, &f.admin).await.unwrap(),
        Some(successor)
    );
}

#[tokio::test]
async fn test_terminal_internship_refuses_claim_and_transfer() {
    let f = fixture().await;
    f.workflow
        .transition_state(f.internship, code(InternshipState::Denied), &f.teacher)
        .await
        .unwrap();

    let err = f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InternshipClosed { .. }));

    let err = f
        .workflow
        .transfer_reservation(f.internship, UserId::new(), &f.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InternshipClosed { .. }));
}

#[tokio::test]
async fn test_locked_set_refuses_teacher_claim() {
    let f = fixture().await;
    f.workflow
        .update_set(f.set, None, Some(false), &f.admin)
        .await
        .unwrap();
    let err = f.workflow.claim_reservation(f.internship, &f.teacher).await.unwrap_err();
    assert!(matches!(err, WorkflowError::SetLocked { .. }));
    f.workflow.claim_reservation(f.internship, &f.admin).await.unwrap();
}

// -- Inspections --------------------------------------------------------------

#[tokio::test]
async fn test_completed_internship_closed_even_for_admin_holder() {
    let f = fixture().await;
    f.workflow.claim_reservation(f.internship, &f.admin).await.unwrap();
    f.workflow
        .transition_state(f.internship, code(InternshipState::Completed), &f.admin)
        .await
        .unwrap();

    let err = f
        .workflow
        .record_inspection(f.internship, draft(), &f.admin)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InternshipClosed {
            state: InternshipState::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_closed_is_reported_before_forbidden() {
    let f = fixture().await;
    f.workflow
        .transition_state(f.internship, code(InternshipState::Cancelled), &f.owner)
        .await
        .unwrap();
    let stranger = Actor::student(UserId::new());
    let err = f
        .workflow
        .record_inspection(f.internship, draft(), &stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InternshipClosed { .. }));
}

#[tokio::test]
async fn test_open_internship_forbids_non_holder_student() {
    let f = fixture().await;
    let err = f
        .workflow
        .record_inspection(f.internship, draft(), &f.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
}

#[tokio::test]
async fn test_missing_internship_reported_first() {
    let f = fixture().await;
    let err = f
        .workflow
        .record_inspection(InternshipId::new(), draft(), &f.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { .. }));
}

#[tokio::test]
async fn test_holder_records_and_owner_lists() {
    let f = fixture().await;
    let inspector = Actor::student(UserId::new());
    f.workflow
        .transfer_reservation(f.internship, inspector.user_id.unwrap(), &f.teacher)
        .await
        .unwrap();

    let recorded = f
        .workflow
        .record_inspection(f.internship, draft(), &inspector)
        .await
        .unwrap();
    assert_eq!(Some(recorded.inspector_id), inspector.user_id);

    let listed = f.workflow.list_inspections(f.internship, &f.owner).await.unwrap();
    assert_eq!(listed, vec![recorded]);

    let stored = f.workflow.get_internship(f.internship, &f.owner).await.unwrap();
    assert_eq!(stored.state, InternshipState::Founded);
}

#[tokio::test]
async fn test_only_inspector_or_admin_corrects() {
    let f = fixture().await;
    let recorded = f
        .workflow
        .record_inspection(f.internship, draft(), &f.teacher)
        .await
        .unwrap();
    let patch = InspectionPatch {
        result: Some("needs follow-up".into()),
        ..InspectionPatch::default()
    };

    let colleague = Actor::teacher(UserId::new());
    let err = f
        .workflow
        .correct_inspection(recorded.id, patch.clone(), &colleague)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));

    let corrected = f
        .workflow
        .correct_inspection(recorded.id, patch, &f.teacher)
        .await
        .unwrap();
    assert_eq!(corrected.result, "needs follow-up");
    assert_eq!(corrected.kind, recorded.kind);

    let err = f
        .workflow
        .correct_inspection(InspectionId::new(), InspectionPatch::default(), &f.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { kind: "inspection", .. }));
}

// -- Records and sets ---------------------------------------------------------

#[tokio::test]
async fn test_student_creates_only_own_internship() {
    let f = fixture().await;
    let me = UserId::new();
    let student = Actor::student(me);

    let created = f.workflow.create_internship(f.set, me, &student).await.unwrap();
    assert_eq!(created.state, InternshipState::Founded);
    assert_eq!(created.reservation_holder_id, None);
    assert!(!created.highlighted);

    let err = f
        .workflow
        .create_internship(f.set, UserId::new(), &student)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
}

#[tokio::test]
async fn test_create_in_missing_or_locked_set() {
    let f = fixture().await;
    let err = f
        .workflow
        .create_internship(SetId::new(), UserId::new(), &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { kind: "set", .. }));

    f.workflow
        .update_set(f.set, None, Some(false), &f.admin)
        .await
        .unwrap();
    let err = f
        .workflow
        .create_internship(f.set, UserId::new(), &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::SetLocked { .. }));
    f.workflow
        .create_internship(f.set, UserId::new(), &f.admin)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_highlight_is_staff_only() {
    let f = fixture().await;
    let err = f
        .workflow
        .set_highlighted(f.internship, true, &f.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));

    let updated = f
        .workflow
        .set_highlighted(f.internship, true, &f.teacher)
        .await
        .unwrap();
    assert!(updated.highlighted);
}

#[tokio::test]
async fn test_only_admin_manages_sets() {
    let f = fixture().await;
    let err = f
        .workflow
        .create_set("autumn".into(), true, &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
    let err = f
        .workflow
        .update_set(f.set, Some(false), None, &f.teacher)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden { .. }));
}

// -- Storage failures ---------------------------------------------------------

/// Repository whose every call fails, as an unreachable database would.
#[derive(Debug)]
struct Unavailable;

fn down<T>() -> Result<T, StoreError> {
    Err(StoreError::Corrupt("connection reset".into()))
}

#[async_trait]
impl WorkflowRepository for Unavailable {
    async fn insert_set(&self, _: &InternshipSet) -> Result<(), StoreError> {
        down()
    }
    async fn get_set(&self, _: SetId) -> Result<Option<InternshipSet>, StoreError> {
        down()
    }
    async fn update_set_flags(
        &self,
        _: SetId,
        _: Option<bool>,
        _: Option<bool>,
    ) -> Result<Option<InternshipSet>, StoreError> {
        down()
    }
    async fn insert_internship(&self, _: &Internship) -> Result<(), StoreError> {
        down()
    }
    async fn get_internship(&self, _: InternshipId) -> Result<Option<Internship>, StoreError> {
        down()
    }
    async fn compare_and_set_state(
        &self,
        _: InternshipId,
        _: InternshipState,
        _: InternshipState,
    ) -> Result<Option<Internship>, StoreError> {
        down()
    }
    async fn claim_reservation(&self, _: InternshipId, _: UserId) -> Result<bool, StoreError> {
        down()
    }
    async fn release_reservation(&self, _: InternshipId) -> Result<bool, StoreError> {
        down()
    }
    async fn transfer_reservation(&self, _: InternshipId, _: UserId) -> Result<bool, StoreError> {
        down()
    }
    async fn set_highlighted(
        &self,
        _: InternshipId,
        _: bool,
    ) -> Result<Option<Internship>, StoreError> {
        down()
    }
    async fn insert_inspection_if_open(&self, _: &Inspection) -> Result<bool, StoreError> {
        down()
    }
    async fn get_inspection(&self, _: InspectionId) -> Result<Option<Inspection>, StoreError> {
        down()
    }
    async fn list_inspections(&self, _: InternshipId) -> Result<Vec<Inspection>, StoreError> {
        down()
    }
    async fn update_inspection(&self, _: &Inspection) -> Result<bool, StoreError> {
        down()
    }
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_retryable_error() {
    let workflow = Workflow::new(Arc::new(Unavailable));
    let err = workflow
        .claim_reservation(InternshipId::new(), &Actor::teacher(UserId::new()))
        .await
        .unwrap_err();
    assert!(err.is_infrastructure());
    assert_eq!(err.code(), "STORAGE_UNAVAILABLE");
}
