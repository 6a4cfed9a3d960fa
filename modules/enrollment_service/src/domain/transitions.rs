//! Enrollment status transition table
//!
//! Every ledger mutation that changes an enrollment's status asks [`plan`]
//! what happens to the seat it holds. `cancelled` is terminal.

use crate::contract::{EnrollmentError, EnrollmentStatus};

/// Effect of a status change on the enrollment's slot counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatEffect {
    /// Take one seat (fails when the slot is full)
    Acquire,
    /// Give the held seat back
    Release,
    /// Persist the status without touching capacity
    Keep,
}

/// A transition the table does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub from: EnrollmentStatus,
    pub to: EnrollmentStatus,
}

impl From<Rejected> for EnrollmentError {
    fn from(r: Rejected) -> Self {
        EnrollmentError::InvalidTransition {
            from: r.from.to_string(),
            to: r.to.to_string(),
        }
    }
}

pub fn plan(from: EnrollmentStatus, to: EnrollmentStatus) -> Result<SeatEffect, Rejected> {
    use EnrollmentStatus::*;

    match (from, to) {
        (Cancelled, _) => Err(Rejected { from, to }),
        (Active, Inactive) | (Active, Cancelled) => Ok(SeatEffect::Release),
        (Inactive, Active) => Ok(SeatEffect::Acquire),
        (Active, Active) | (Inactive, Inactive) | (Inactive, Cancelled) => Ok(SeatEffect::Keep),
    }
}
