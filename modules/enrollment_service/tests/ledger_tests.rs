//! Enrollment ledger integration tests against SQLite

mod common;

use common::{date, print_test_header, TestAssociation};
use enrollment_service::config::Config;
use enrollment_service::contract::*;
use enrollment_service::domain::{EventPublisher, LedgerEvent, Repositories, Service};
use enrollment_service::infra::storage::entity::schedule_slot;
use enrollment_service::infra::storage::repositories::*;
use futures::future::join_all;
use parking_lot::RwLock;
use sea_orm::{prelude::Expr, ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_danca_scenario_single_seat() {
    print_test_header(
        "test_danca_scenario_single_seat",
        &[
            "One slot with one seat is handed over through a cancellation",
            "A enrolls, B is refused, A cancels, B enrolls",
        ],
    );

    let assoc = TestAssociation::new().await;
    let danca = assoc.activity("Dança", 8000).await;
    let slot = assoc.slot(danca.id, 1).await;
    let ana = assoc.student("Ana").await;
    let bia = assoc.student("Bia").await;

    println!("📝 Stage 1: A enrolls");
    let a = assoc.enroll(ana.id, danca.id, Some(slot.id)).await.unwrap();
    assert_eq!(a.status, EnrollmentStatus::Active);
    assert_eq!(assoc.available(slot.id).await, 0);

    println!("📝 Stage 2: B is refused");
    let refused = assoc.enroll(bia.id, danca.id, Some(slot.id)).await;
    assert_eq!(
        refused,
        Err(EnrollmentError::CapacityExceeded { slot_id: slot.id })
    );
    assert_eq!(assoc.available(slot.id).await, 0);

    println!("📝 Stage 3: A cancels");
    let cancelled = assoc
        .service
        .ledger
        .cancel(a.id, Some("moved away".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("moved away"));
    assert!(cancelled.end_date.is_some());
    assert_eq!(assoc.available(slot.id).await, 1);

    println!("📝 Stage 4: B enrolls");
    assoc.enroll(bia.id, danca.id, Some(slot.id)).await.unwrap();
    assert_eq!(assoc.available(slot.id).await, 0);
    assoc.assert_seat_invariant(slot.id).await;

    println!("✅ Seat handed over without ever going negative");
}

/// Spawn one enrollment task per student against the same slot
async fn race_for_slot(
    assoc: &TestAssociation,
    activity_id: Uuid,
    slot_id: Uuid,
    students: &[Student],
) -> Vec<Result<Enrollment, EnrollmentError>> {
    let tasks = students.iter().map(|student| {
        let service = assoc.service.clone();
        let student_id = student.id;
        tokio::spawn(async move {
            service
                .ledger
                .enroll(NewEnrollment {
                    student_id,
                    activity_id,
                    slot_id: Some(slot_id),
                    start_date: date(2025, 3, 1),
                })
                .await
        })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_for_last_seat() {
    print_test_header(
        "test_concurrent_enrollments_for_last_seat",
        &[
            "Simultaneous requests for one seat on separate connections",
            "Exactly one wins, every other caller gets CapacityExceeded",
        ],
    );

    let assoc = TestAssociation::on_file(10).await;
    let activity = assoc.activity("Capoeira", 5000).await;

    for round in 0..10 {
        let slot = assoc.slot(activity.id, 1).await;
        let mut students = Vec::new();
        for i in 0..4 {
            students.push(assoc.student(&format!("Aluno {}-{}", round, i)).await);
        }

        let results = race_for_slot(&assoc, activity.id, slot.id, &students).await;
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(EnrollmentError::CapacityExceeded { .. })))
            .count();

        assert_eq!(winners, 1, "round {}: {:?}", round, results);
        assert_eq!(refused, 3, "round {}: {:?}", round, results);
        assert_eq!(assoc.available(slot.id).await, 0);
        assoc.assert_seat_invariant(slot.id).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_burst_of_enrollments_never_oversells() {
    let assoc = TestAssociation::on_file(10).await;
    let activity = assoc.activity("Futsal", 3000).await;
    let slot = assoc.slot(activity.id, 3).await;

    let mut students = Vec::new();
    for i in 0..10 {
        students.push(assoc.student(&format!("Aluno {}", i)).await);
    }

    let results = race_for_slot(&assoc, activity.id, slot.id, &students).await;

    let enrolled = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(enrolled, 3);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(EnrollmentError::CapacityExceeded { .. }))),
        "{:?}",
        results
    );
    assert_eq!(assoc.available(slot.id).await, 0);
    assoc.assert_seat_invariant(slot.id).await;
}

#[tokio::test]
async fn test_reenroll_after_cancel_restores_seat_first() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Violão", 6000).await;
    let slot = assoc.slot(activity.id, 2).await;
    let student = assoc.student("Eva").await;

    let first = assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();
    assert_eq!(assoc.available(slot.id).await, 1);

    assoc.service.ledger.cancel(first.id, None).await.unwrap();
    assert_eq!(assoc.available(slot.id).await, 2);

    let second = assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(assoc.available(slot.id).await, 1);
    assoc.assert_seat_invariant(slot.id).await;
}

#[tokio::test]
async fn test_duplicate_active_enrollment_is_conflict() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Teatro", 4000).await;
    let slot = assoc.slot(activity.id, 5).await;
    let student = assoc.student("Fábio").await;

    assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();
    let again = assoc.enroll(student.id, activity.id, Some(slot.id)).await;

    assert!(matches!(again, Err(EnrollmentError::Conflict { .. })));
    assert_eq!(assoc.available(slot.id).await, 4);
}

#[tokio::test]
async fn test_enroll_reference_checks() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Xadrez", 0).await;
    let other = assoc.activity("Judô", 0).await;
    let slot = assoc.slot(activity.id, 5).await;
    let other_slot = assoc.slot(other.id, 5).await;
    let student = assoc.student("Gabi").await;

    // Unknown student
    let missing = assoc.enroll(Uuid::new_v4(), activity.id, Some(slot.id)).await;
    assert!(matches!(missing, Err(EnrollmentError::NotFound { resource, .. }) if resource == "student"));

    // Unknown slot
    let missing = assoc.enroll(student.id, activity.id, Some(Uuid::new_v4())).await;
    assert!(matches!(missing, Err(EnrollmentError::NotFound { resource, .. }) if resource == "schedule slot"));

    // Slot of another activity
    let wrong = assoc.enroll(student.id, activity.id, Some(other_slot.id)).await;
    assert!(matches!(wrong, Err(EnrollmentError::Validation { .. })));

    // Activity has slots, none chosen
    let slotless = assoc.enroll(student.id, activity.id, None).await;
    assert!(matches!(slotless, Err(EnrollmentError::Validation { .. })));

    // Inactive student
    assoc.service.catalog.deactivate_student(student.id).await.unwrap();
    let inactive = assoc.enroll(student.id, activity.id, Some(slot.id)).await;
    assert!(matches!(inactive, Err(EnrollmentError::NotFound { .. })));

    assert_eq!(assoc.available(slot.id).await, 5);
}

#[tokio::test]
async fn test_slotless_enrollment_when_not_required() {
    let config = Config {
        require_slot_when_scheduled: false,
        ..Config::default()
    };
    let assoc = TestAssociation::with_config(config).await;
    let activity = assoc.activity("Coral", 0).await;
    let slot = assoc.slot(activity.id, 1).await;
    let student = assoc.student("Hugo").await;

    let enrollment = assoc.enroll(student.id, activity.id, None).await.unwrap();
    assert_eq!(enrollment.slot_id, None);
    assert_eq!(assoc.available(slot.id).await, 1);
}

#[tokio::test]
async fn test_status_transitions_follow_table() {
    print_test_header(
        "test_status_transitions_follow_table",
        &[
            "active -> inactive releases, inactive -> active re-acquires",
            "cancelled is terminal",
        ],
    );

    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Ballet", 9000).await;
    let slot = assoc.slot(activity.id, 1).await;
    let ines = assoc.student("Inês").await;
    let joao = assoc.student("João").await;

    let e = assoc.enroll(ines.id, activity.id, Some(slot.id)).await.unwrap();

    println!("📝 Stage 1: active -> inactive");
    let inactive = assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(inactive.status, EnrollmentStatus::Inactive);
    assert!(inactive.end_date.is_some());
    assert_eq!(assoc.available(slot.id).await, 1);

    println!("📝 Stage 2: seat taken by someone else, reactivation refused");
    assoc.enroll(joao.id, activity.id, Some(slot.id)).await.unwrap();
    let refused = assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Active)
        .await;
    assert_eq!(
        refused,
        Err(EnrollmentError::CapacityExceeded { slot_id: slot.id })
    );
    assert_eq!(
        assoc.service.ledger.get(e.id).await.unwrap().status,
        EnrollmentStatus::Inactive
    );

    println!("📝 Stage 3: inactive -> cancelled keeps capacity");
    let cancelled = assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);
    assert_eq!(assoc.available(slot.id).await, 0);

    println!("📝 Stage 4: cancelled is terminal");
    let terminal = assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Active)
        .await;
    assert!(matches!(terminal, Err(EnrollmentError::InvalidTransition { .. })));

    let twice = assoc.service.ledger.cancel(e.id, None).await;
    assert!(matches!(twice, Err(EnrollmentError::NotFound { .. })));

    assoc.assert_seat_invariant(slot.id).await;
}

#[tokio::test]
async fn test_reactivation_with_free_seat() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Yoga", 7000).await;
    let slot = assoc.slot(activity.id, 2).await;
    let student = assoc.student("Karla").await;

    let e = assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();
    assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(assoc.available(slot.id).await, 2);

    let active = assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Active)
        .await
        .unwrap();
    assert_eq!(active.status, EnrollmentStatus::Active);
    assert_eq!(active.end_date, None);
    assert_eq!(assoc.available(slot.id).await, 1);

    // Same status is a no-op
    assoc
        .service
        .ledger
        .set_status(e.id, EnrollmentStatus::Active)
        .await
        .unwrap();
    assert_eq!(assoc.available(slot.id).await, 1);
    assoc.assert_seat_invariant(slot.id).await;
}

#[tokio::test]
async fn test_move_slot_swaps_seats() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Natação", 12000).await;
    let tuesday = assoc.slot(activity.id, 2).await;
    let thursday = assoc
        .service
        .catalog
        .create_slot(activity.id, common::slot_input(4, 1))
        .await
        .unwrap();
    let lucas = assoc.student("Lucas").await;
    let maya = assoc.student("Maya").await;

    let e = assoc.enroll(lucas.id, activity.id, Some(tuesday.id)).await.unwrap();

    let moved = assoc.service.ledger.move_slot(e.id, thursday.id).await.unwrap();
    assert_eq!(moved.slot_id, Some(thursday.id));
    assert_eq!(assoc.available(tuesday.id).await, 2);
    assert_eq!(assoc.available(thursday.id).await, 0);

    // Thursday is now full
    let other = assoc.enroll(maya.id, activity.id, Some(tuesday.id)).await.unwrap();
    let full = assoc.service.ledger.move_slot(other.id, thursday.id).await;
    assert_eq!(
        full,
        Err(EnrollmentError::CapacityExceeded {
            slot_id: thursday.id
        })
    );
    assert_eq!(
        assoc.service.ledger.get(other.id).await.unwrap().slot_id,
        Some(tuesday.id)
    );

    assoc.assert_seat_invariant(tuesday.id).await;
    assoc.assert_seat_invariant(thursday.id).await;
}

#[tokio::test]
async fn test_move_slot_rejections() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Pintura", 0).await;
    let other = assoc.activity("Robótica", 0).await;
    let slot = assoc.slot(activity.id, 3).await;
    let foreign = assoc.slot(other.id, 3).await;
    let student = assoc.student("Nina").await;

    let e = assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();

    let wrong = assoc.service.ledger.move_slot(e.id, foreign.id).await;
    assert!(matches!(wrong, Err(EnrollmentError::Validation { .. })));

    let missing = assoc.service.ledger.move_slot(Uuid::new_v4(), slot.id).await;
    assert!(matches!(missing, Err(EnrollmentError::NotFound { .. })));

    assoc.service.ledger.cancel(e.id, None).await.unwrap();
    let terminal = assoc.service.ledger.move_slot(e.id, slot.id).await;
    assert!(matches!(terminal, Err(EnrollmentError::Conflict { .. })));
}

#[tokio::test]
async fn test_import_reports_each_row() {
    print_test_header(
        "test_import_reports_each_row",
        &["Bulk import enrolls rows independently and reports per row"],
    );

    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Música", 5000).await;
    let slot = assoc.slot(activity.id, 2).await;
    let a = assoc.student("Otávio").await;
    let b = assoc.student("Paula").await;
    let c = assoc.student("Quésia").await;

    let row = |student_id| NewEnrollment {
        student_id,
        activity_id: activity.id,
        slot_id: Some(slot.id),
        start_date: date(2025, 3, 1),
    };

    let outcomes = assoc
        .service
        .ledger
        .import(vec![row(a.id), row(a.id), row(b.id), row(c.id)])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(EnrollmentError::Conflict { .. })));
    assert!(outcomes[2].result.is_ok());
    assert!(matches!(
        outcomes[3].result,
        Err(EnrollmentError::CapacityExceeded { .. })
    ));
    assert_eq!(
        outcomes.iter().map(|o| o.row).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
    assoc.assert_seat_invariant(slot.id).await;
}

#[tokio::test]
async fn test_import_limit() {
    let config = Config {
        max_import_rows: 1,
        ..Config::default()
    };
    let assoc = TestAssociation::with_config(config).await;
    let row = NewEnrollment {
        student_id: Uuid::new_v4(),
        activity_id: Uuid::new_v4(),
        slot_id: None,
        start_date: date(2025, 3, 1),
    };

    let result = assoc.service.ledger.import(vec![row.clone(), row]).await;
    assert!(matches!(result, Err(EnrollmentError::Validation { .. })));
}

#[tokio::test]
async fn test_reconcile_corrects_drift() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Circo", 0).await;
    let slot = assoc.slot(activity.id, 4).await;
    let student = assoc.student("Rafa").await;
    assoc.enroll(student.id, activity.id, Some(slot.id)).await.unwrap();

    // Corrupt the counter behind the ledger's back
    schedule_slot::Entity::update_many()
        .col_expr(schedule_slot::Column::AvailableSeats, Expr::value(1))
        .filter(schedule_slot::Column::Id.eq(slot.id))
        .exec(&*assoc.db)
        .await
        .unwrap();

    let report = assoc.service.ledger.reconcile(slot.id).await.unwrap();
    assert_eq!(report.previous_available, 1);
    assert_eq!(report.available_seats, 3);
    assert_eq!(report.drift(), -2);
    assoc.assert_seat_invariant(slot.id).await;

    let clean = assoc.service.ledger.reconcile(slot.id).await.unwrap();
    assert_eq!(clean.drift(), 0);

    let missing = assoc.service.ledger.reconcile(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(EnrollmentError::NotFound { .. })));
}

#[tokio::test]
async fn test_list_enrollments_filters() {
    let assoc = TestAssociation::new().await;
    let activity = assoc.activity("Dança", 8000).await;
    let slot = assoc.slot(activity.id, 5).await;
    let s1 = assoc.student("Sara").await;
    let s2 = assoc.student("Téo").await;

    let e1 = assoc.enroll(s1.id, activity.id, Some(slot.id)).await.unwrap();
    assoc.enroll(s2.id, activity.id, Some(slot.id)).await.unwrap();
    assoc.service.ledger.cancel(e1.id, None).await.unwrap();

    let active = assoc
        .service
        .ledger
        .list(
            EnrollmentFilter {
                activity_id: Some(activity.id),
                status: Some(EnrollmentStatus::Active),
                ..Default::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].student_id, s2.id);

    let by_student = assoc
        .service
        .ledger
        .list(
            EnrollmentFilter {
                student_id: Some(s1.id),
                ..Default::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_student.len(), 1);
    assert_eq!(by_student[0].status, EnrollmentStatus::Cancelled);

    let page = assoc
        .service
        .ledger
        .list(
            EnrollmentFilter::default(),
            Page {
                limit: Some(1),
                offset: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}

// ===== Events =====

#[derive(Default)]
struct RecordingPublisher {
    events: RwLock<Vec<LedgerEvent>>,
}

#[async_trait::async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: LedgerEvent) -> anyhow::Result<()> {
        self.events.write().push(event);
        Ok(())
    }
}

struct FailingPublisher;

#[async_trait::async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: LedgerEvent) -> anyhow::Result<()> {
        anyhow::bail!("broker unreachable")
    }
}

async fn service_with_publisher(events: Arc<dyn EventPublisher>) -> Service {
    let db = Arc::new(common::memory_db().await);
    let repos = Repositories {
        students: Arc::new(SeaOrmStudentRepository::new(db.clone())),
        activities: Arc::new(SeaOrmActivityRepository::new(db.clone())),
        slots: Arc::new(SeaOrmSlotRepository::new(db.clone())),
        enrollments: Arc::new(SeaOrmEnrollmentRepository::new(db.clone())),
        attendance: Arc::new(SeaOrmAttendanceRepository::new(db.clone())),
        fees: Arc::new(SeaOrmFeeRepository::new(db)),
    };
    Service::new(repos, events, Config::default())
}

async fn seed(service: &Service) -> (Uuid, Uuid, Uuid, Uuid) {
    let student = service
        .catalog
        .create_student(StudentInput {
            full_name: "Ulisses".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let activity = service
        .catalog
        .create_activity(ActivityInput {
            name: "Dança".to_string(),
            kind: "dance".to_string(),
            description: None,
            monthly_fee_cents: 8000,
        })
        .await
        .unwrap();
    let a = service
        .catalog
        .create_slot(activity.id, common::slot_input(2, 3))
        .await
        .unwrap();
    let b = service
        .catalog
        .create_slot(activity.id, common::slot_input(5, 3))
        .await
        .unwrap();
    (student.id, activity.id, a.id, b.id)
}

#[tokio::test]
async fn test_committed_changes_publish_events() {
    let publisher = Arc::new(RecordingPublisher::default());
    let service = service_with_publisher(publisher.clone()).await;
    let (student_id, activity_id, slot_a, slot_b) = seed(&service).await;

    let e = service
        .ledger
        .enroll(NewEnrollment {
            student_id,
            activity_id,
            slot_id: Some(slot_a),
            start_date: date(2025, 3, 1),
        })
        .await
        .unwrap();
    service.ledger.move_slot(e.id, slot_b).await.unwrap();
    service.ledger.cancel(e.id, Some("done".into())).await.unwrap();

    // Rejected operations publish nothing
    let _ = service.ledger.cancel(e.id, None).await;

    let events = publisher.events.read();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], LedgerEvent::Enrolled(ev) if ev.enrollment_id == e.id));
    assert!(matches!(&events[1], LedgerEvent::SlotMoved(ev) if ev.to_slot_id == slot_b));
    assert!(matches!(
        &events[2],
        LedgerEvent::StatusChanged(ev) if ev.from == "active" && ev.to == "cancelled"
    ));
}

#[tokio::test]
async fn test_publisher_failure_does_not_fail_operation() {
    let service = service_with_publisher(Arc::new(FailingPublisher)).await;
    let (student_id, activity_id, slot_a, _) = seed(&service).await;

    let e = service
        .ledger
        .enroll(NewEnrollment {
            student_id,
            activity_id,
            slot_id: Some(slot_a),
            start_date: date(2025, 3, 1),
        })
        .await
        .unwrap();

    assert_eq!(service.ledger.get(e.id).await.unwrap().status, EnrollmentStatus::Active);
    assert_eq!(service.catalog.get_slot(slot_a).await.unwrap().available_seats, 2);
}
