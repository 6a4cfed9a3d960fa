//! Domain layer - business logic and services

pub mod attendance;
pub mod catalog;
pub mod events;
pub mod fees;
pub mod ledger;
pub mod repository;
pub mod service;
pub mod transitions;
pub mod validation;

pub use attendance::AttendanceRegistrar;
pub use catalog::CatalogService;
pub use events::{EventPublisher, LedgerEvent, NoOpEventPublisher, TracingEventPublisher};
pub use fees::FeeGenerator;
pub use ledger::EnrollmentLedger;
pub use service::{Repositories, Service};
