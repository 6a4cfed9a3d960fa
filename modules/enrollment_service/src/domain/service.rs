//! Domain service - wires the four components over one set of repositories

use super::attendance::AttendanceRegistrar;
use super::catalog::CatalogService;
use super::events::EventPublisher;
use super::fees::FeeGenerator;
use super::ledger::EnrollmentLedger;
use super::repository::{
    ActivityRepository, AttendanceRepository, EnrollmentRepository, FeeRepository,
    SlotRepository, StudentRepository,
};
use crate::config::Config;
use crate::contract::EnrollmentError;
use std::sync::Arc;

/// Store handles the components are built from
#[derive(Clone)]
pub struct Repositories {
    pub students: Arc<dyn StudentRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub slots: Arc<dyn SlotRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub fees: Arc<dyn FeeRepository>,
}

/// Domain service for the association records core
pub struct Service {
    pub catalog: CatalogService,
    pub ledger: EnrollmentLedger,
    pub attendance: AttendanceRegistrar,
    pub fees: FeeGenerator,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, events: Arc<dyn EventPublisher>, config: Config) -> Self {
        Self {
            catalog: CatalogService::new(
                repos.students,
                repos.activities.clone(),
                repos.slots,
                config.clone(),
            ),
            ledger: EnrollmentLedger::new(repos.enrollments, events, config.clone()),
            attendance: AttendanceRegistrar::new(repos.attendance, repos.activities, config.clone()),
            fees: FeeGenerator::new(repos.fees, config),
        }
    }
}

/// Log a store failure and hide it behind `Unavailable`
pub(crate) fn store_failure(error: anyhow::Error) -> EnrollmentError {
    tracing::error!(error = ?error, "store operation failed");
    EnrollmentError::Unavailable
}
