//! Common test utilities: an in-memory association database and catalog seeds

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use enrollment_service::config::Config;
use enrollment_service::contract::*;
use enrollment_service::domain::Service;
use enrollment_service::EnrollmentServiceModule;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Migrated SQLite database plus the service built over it
pub struct TestAssociation {
    pub db: Arc<DatabaseConnection>,
    pub module: EnrollmentServiceModule,
    pub service: Arc<Service>,
    _dir: Option<TempDir>,
}

impl TestAssociation {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        Self::build(memory_db().await, None, config)
    }

    /// File-backed database behind a pool of `connections`, so concurrent
    /// callers really run on separate connections
    pub async fn on_file(connections: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("association.db").display());

        let mut options = ConnectOptions::new(url);
        options.max_connections(connections).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        EnrollmentServiceModule::migrate(&db).await.unwrap();

        Self::build(db, Some(dir), Config::default())
    }

    fn build(db: DatabaseConnection, dir: Option<TempDir>, config: Config) -> Self {
        let db = Arc::new(db);
        let module = EnrollmentServiceModule::new(config);
        let service = module.init(db.clone()).unwrap();
        Self {
            db,
            module,
            service,
            _dir: dir,
        }
    }

    pub async fn student(&self, name: &str) -> Student {
        self.service
            .catalog
            .create_student(StudentInput {
                full_name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn activity(&self, name: &str, monthly_fee_cents: i64) -> Activity {
        self.service
            .catalog
            .create_activity(ActivityInput {
                name: name.to_string(),
                kind: "course".to_string(),
                description: None,
                monthly_fee_cents,
            })
            .await
            .unwrap()
    }

    pub async fn slot(&self, activity_id: Uuid, seats: i32) -> ScheduleSlot {
        self.service
            .catalog
            .create_slot(activity_id, slot_input(2, seats))
            .await
            .unwrap()
    }

    pub async fn enroll(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        slot_id: Option<Uuid>,
    ) -> Result<Enrollment, EnrollmentError> {
        self.service
            .ledger
            .enroll(NewEnrollment {
                student_id,
                activity_id,
                slot_id,
                start_date: date(2025, 3, 1),
            })
            .await
    }

    pub async fn available(&self, slot_id: Uuid) -> i32 {
        self.service
            .catalog
            .get_slot(slot_id)
            .await
            .unwrap()
            .available_seats
    }

    /// availableSeats + active enrollments == totalSeats
    pub async fn assert_seat_invariant(&self, slot_id: Uuid) {
        let occupancy = self.service.ledger.occupancy(slot_id).await.unwrap();
        assert_eq!(
            i64::from(occupancy.available_seats) + occupancy.active_enrollments,
            i64::from(occupancy.total_seats),
            "seat invariant broken for slot {}: {:?}",
            slot_id,
            occupancy
        );
    }
}

/// Single-connection pool so the in-memory database is shared
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    EnrollmentServiceModule::migrate(&db).await.unwrap();
    db
}

pub fn slot_input(weekday: u8, seats: i32) -> SlotInput {
    SlotInput {
        weekday,
        start_time: time(18, 0),
        end_time: time(19, 0),
        total_seats: seats,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}
