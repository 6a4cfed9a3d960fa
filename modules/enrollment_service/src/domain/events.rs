//! Domain events for the enrollment ledger
//!
//! Every committed seat-affecting mutation produces one event. Publishing
//! happens after commit and never fails the operation that produced it.

use crate::contract::model::{Enrollment, EnrollmentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new active enrollment took a seat
    Enrolled(EnrolledEvent),
    /// Status changed (includes cancellation)
    StatusChanged(StatusChangedEvent),
    /// Enrollment moved to another slot
    SlotMoved(SlotMovedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledEvent {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub enrollment_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMovedEvent {
    pub enrollment_id: Uuid,
    pub from_slot_id: Option<Uuid>,
    pub to_slot_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Event publisher seam; the default deployment only logs
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: LedgerEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes every event to the `enrollment_service::events` tracing target
pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: LedgerEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(target: "enrollment_service::events", %payload, "ledger event");
        Ok(())
    }
}

impl LedgerEvent {
    pub fn enrolled(enrollment: &Enrollment) -> Self {
        LedgerEvent::Enrolled(EnrolledEvent {
            enrollment_id: enrollment.id,
            student_id: enrollment.student_id,
            activity_id: enrollment.activity_id,
            slot_id: enrollment.slot_id,
            timestamp: Utc::now(),
        })
    }

    pub fn status_changed(enrollment: &Enrollment, from: EnrollmentStatus) -> Self {
        LedgerEvent::StatusChanged(StatusChangedEvent {
            enrollment_id: enrollment.id,
            slot_id: enrollment.slot_id,
            from: from.to_string(),
            to: enrollment.status.to_string(),
            reason: enrollment.cancellation_reason.clone(),
            timestamp: Utc::now(),
        })
    }

    pub fn slot_moved(enrollment: &Enrollment, from_slot_id: Option<Uuid>, to_slot_id: Uuid) -> Self {
        LedgerEvent::SlotMoved(SlotMovedEvent {
            enrollment_id: enrollment.id,
            from_slot_id,
            to_slot_id,
            timestamp: Utc::now(),
        })
    }

    pub fn enrollment_id(&self) -> Uuid {
        match self {
            LedgerEvent::Enrolled(e) => e.enrollment_id,
            LedgerEvent::StatusChanged(e) => e.enrollment_id,
            LedgerEvent::SlotMoved(e) => e.enrollment_id,
        }
    }
}
