//! Contract error types for the enrollment service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use uuid::Uuid;

/// Enrollment service domain errors
///
/// Every variant except `Unavailable` is a recoverable, user-facing outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    /// Referenced entity absent or soft-deleted
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Duplicate active enrollment, slot still in use, etc.
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// No free seat on the schedule slot
    #[error("No seats available on schedule slot {slot_id}")]
    CapacityExceeded { slot_id: Uuid },

    /// Fee already settled
    #[error("Fee {fee_id} is already paid")]
    AlreadyPaid { fee_id: Uuid },

    /// Unsupported status change
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Malformed input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Store unreachable or transaction aborted; nothing was persisted
    #[error("Store unavailable")]
    Unavailable,
}

impl EnrollmentError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used in per-row import results
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::AlreadyPaid { .. } => "already_paid",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Validation { .. } => "validation",
            Self::Unavailable => "unavailable",
        }
    }
}
