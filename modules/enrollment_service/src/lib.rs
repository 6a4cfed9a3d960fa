//! Enrollment Service Module
//!
//! Records core of a community association: activity catalog, a
//! seat-capacity enrollment ledger, batch attendance and monthly fees.

// Public exports
pub mod contract;
pub use contract::{client::AssociationApi, error::EnrollmentError};

pub mod module;
pub use module::EnrollmentServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
