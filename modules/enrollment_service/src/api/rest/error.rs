//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::EnrollmentError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: EnrollmentError) -> Problem {
    match error {
        EnrollmentError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found")
                .with_detail(format!("{} with id '{}' was not found", resource, id))
        }

        EnrollmentError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        EnrollmentError::CapacityExceeded { slot_id } => Problem::new(
            StatusCode::CONFLICT,
            "Capacity Exceeded",
        )
        .with_detail(format!("Schedule slot '{}' has no seats available", slot_id)),

        EnrollmentError::AlreadyPaid { fee_id } => Problem::new(
            StatusCode::CONFLICT,
            "Fee Already Paid",
        )
        .with_detail(format!("Fee '{}' is already paid", fee_id)),

        EnrollmentError::InvalidTransition { from, to } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid Status Transition",
        )
        .with_detail(format!("Cannot change status from '{}' to '{}'", from, to)),

        EnrollmentError::Validation { message } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
        )
        .with_detail(message),

        EnrollmentError::Unavailable => Problem::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
        )
        .with_detail("The records store is unavailable; nothing was changed"),
    }
}
