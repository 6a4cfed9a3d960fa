//! Store failures surface as `Unavailable` from every component

mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{date, slot_input};
use enrollment_service::config::Config;
use enrollment_service::contract::*;
use enrollment_service::domain::repository::*;
use enrollment_service::domain::{NoOpEventPublisher, Repositories, Service};
use std::sync::Arc;
use uuid::Uuid;

/// Every call fails as if the database went away
struct FailingStore;

fn down<T>() -> anyhow::Result<T> {
    Err(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl StudentRepository for FailingStore {
    async fn create(&self, _student: &Student) -> anyhow::Result<Student> {
        down()
    }
    async fn update(&self, _id: Uuid, _input: &StudentInput) -> anyhow::Result<Option<Student>> {
        down()
    }
    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Student>> {
        down()
    }
    async fn list(
        &self,
        _filter: &StudentFilter,
        _limit: u64,
        _offset: u64,
    ) -> anyhow::Result<Vec<Student>> {
        down()
    }
    async fn set_active(&self, _id: Uuid, _active: bool) -> anyhow::Result<bool> {
        down()
    }
}

#[async_trait]
impl ActivityRepository for FailingStore {
    async fn create(&self, _activity: &Activity) -> anyhow::Result<Activity> {
        down()
    }
    async fn update(&self, _id: Uuid, _input: &ActivityInput) -> anyhow::Result<Option<Activity>> {
        down()
    }
    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Activity>> {
        down()
    }
    async fn list(
        &self,
        _filter: &ActivityFilter,
        _limit: u64,
        _offset: u64,
    ) -> anyhow::Result<Vec<Activity>> {
        down()
    }
    async fn set_active(&self, _id: Uuid, _active: bool) -> anyhow::Result<bool> {
        down()
    }
}

#[async_trait]
impl SlotRepository for FailingStore {
    async fn create(&self, _slot: &ScheduleSlot) -> anyhow::Result<ScheduleSlot> {
        down()
    }
    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<ScheduleSlot>> {
        down()
    }
    async fn list_by_activity(&self, _activity_id: Uuid) -> anyhow::Result<Vec<ScheduleSlot>> {
        down()
    }
    async fn update(&self, _id: Uuid, _input: &SlotInput) -> anyhow::Result<SlotUpdateOutcome> {
        down()
    }
    async fn delete(&self, _id: Uuid) -> anyhow::Result<SlotDeleteOutcome> {
        down()
    }
}

#[async_trait]
impl EnrollmentRepository for FailingStore {
    async fn enroll(&self, _command: &EnrollCommand) -> anyhow::Result<EnrollOutcome> {
        down()
    }
    async fn transition(
        &self,
        _id: Uuid,
        _change: &StatusChange,
    ) -> anyhow::Result<TransitionOutcome> {
        down()
    }
    async fn move_slot(&self, _id: Uuid, _slot_id: Uuid) -> anyhow::Result<MoveOutcome> {
        down()
    }
    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Enrollment>> {
        down()
    }
    async fn list(
        &self,
        _filter: &EnrollmentFilter,
        _limit: u64,
        _offset: u64,
    ) -> anyhow::Result<Vec<Enrollment>> {
        down()
    }
    async fn occupancy(&self, _slot_id: Uuid) -> anyhow::Result<Option<SlotOccupancy>> {
        down()
    }
    async fn reconcile(&self, _slot_id: Uuid) -> anyhow::Result<Option<SlotReconciliation>> {
        down()
    }
}

#[async_trait]
impl AttendanceRepository for FailingStore {
    async fn register_batch(
        &self,
        _activity_id: Uuid,
        _class_date: NaiveDate,
        _entries: &[AttendanceEntry],
    ) -> anyhow::Result<Vec<AttendanceOutcome>> {
        down()
    }
    async fn list_for_class(
        &self,
        _activity_id: Uuid,
        _class_date: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        down()
    }
    async fn list_for_student(
        &self,
        _student_id: Uuid,
        _activity_id: Uuid,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        down()
    }
}

#[async_trait]
impl FeeRepository for FailingStore {
    async fn generate(
        &self,
        _month: u32,
        _year: i32,
        _due_date: NaiveDate,
    ) -> anyhow::Result<Vec<Fee>> {
        down()
    }
    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Fee>> {
        down()
    }
    async fn list(&self, _filter: &FeeFilter, _limit: u64, _offset: u64) -> anyhow::Result<Vec<Fee>> {
        down()
    }
    async fn mark_paid(
        &self,
        _id: Uuid,
        _paid_date: NaiveDate,
        _method: PaymentMethod,
    ) -> anyhow::Result<PaymentOutcome> {
        down()
    }
    async fn cancel(&self, _id: Uuid) -> anyhow::Result<FeeCancelOutcome> {
        down()
    }
    async fn sweep_overdue(&self, _as_of: NaiveDate) -> anyhow::Result<u64> {
        down()
    }
}

fn failing_service() -> Service {
    let store = Arc::new(FailingStore);
    let repos = Repositories {
        students: store.clone(),
        activities: store.clone(),
        slots: store.clone(),
        enrollments: store.clone(),
        attendance: store.clone(),
        fees: store,
    };
    Service::new(repos, Arc::new(NoOpEventPublisher), Config::default())
}

#[tokio::test]
async fn test_catalog_reports_unavailable() {
    let service = failing_service();

    let created = service
        .catalog
        .create_student(StudentInput {
            full_name: "Ana".to_string(),
            ..Default::default()
        })
        .await;
    assert_eq!(created, Err(EnrollmentError::Unavailable));

    let slot = service
        .catalog
        .create_slot(Uuid::new_v4(), slot_input(2, 5))
        .await;
    assert_eq!(slot, Err(EnrollmentError::Unavailable));

    let resized = service
        .catalog
        .update_slot(Uuid::new_v4(), slot_input(2, 5))
        .await;
    assert_eq!(resized, Err(EnrollmentError::Unavailable));
}

#[tokio::test]
async fn test_validation_runs_before_the_store() {
    let service = failing_service();

    let blank = service
        .catalog
        .create_student(StudentInput::default())
        .await;
    assert!(matches!(blank, Err(EnrollmentError::Validation { .. })));

    let period = service.fees.generate_monthly(13, 2025).await;
    assert!(matches!(period, Err(EnrollmentError::Validation { .. })));

    let range = service
        .attendance
        .student_summary(Uuid::new_v4(), Uuid::new_v4(), date(2025, 4, 1), date(2025, 3, 1))
        .await;
    assert!(matches!(range, Err(EnrollmentError::Validation { .. })));
}

#[tokio::test]
async fn test_ledger_reports_unavailable() {
    let service = failing_service();

    let enrolled = service
        .ledger
        .enroll(NewEnrollment {
            student_id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            slot_id: Some(Uuid::new_v4()),
            start_date: date(2025, 3, 1),
        })
        .await;
    assert_eq!(enrolled, Err(EnrollmentError::Unavailable));

    let id = Uuid::new_v4();
    assert_eq!(
        service.ledger.cancel(id, None).await,
        Err(EnrollmentError::Unavailable)
    );
    assert_eq!(
        service
            .ledger
            .set_status(id, EnrollmentStatus::Inactive)
            .await,
        Err(EnrollmentError::Unavailable)
    );
    assert_eq!(
        service.ledger.move_slot(id, Uuid::new_v4()).await,
        Err(EnrollmentError::Unavailable)
    );
    assert_eq!(
        service.ledger.reconcile(id).await,
        Err(EnrollmentError::Unavailable)
    );

    // Import reports the failure per row instead of aborting
    let rows = service
        .ledger
        .import(vec![NewEnrollment {
            student_id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            slot_id: None,
            start_date: date(2025, 3, 1),
        }])
        .await
        .unwrap();
    assert_eq!(rows[0].result, Err(EnrollmentError::Unavailable));
}

#[tokio::test]
async fn test_attendance_and_fees_report_unavailable() {
    let service = failing_service();

    let batch = service
        .attendance
        .register_batch(
            Uuid::new_v4(),
            date(2025, 3, 4),
            vec![AttendanceEntry {
                student_id: Uuid::new_v4(),
                present: true,
                justification: None,
            }],
        )
        .await;
    assert_eq!(batch, Err(EnrollmentError::Unavailable));

    assert_eq!(
        service.fees.generate_monthly(6, 2025).await,
        Err(EnrollmentError::Unavailable)
    );
    assert_eq!(
        service
            .fees
            .register_payment(Uuid::new_v4(), date(2025, 6, 5), PaymentMethod::Pix)
            .await,
        Err(EnrollmentError::Unavailable)
    );
    assert_eq!(
        service.fees.sweep_overdue(date(2025, 7, 1)).await,
        Err(EnrollmentError::Unavailable)
    );
}
