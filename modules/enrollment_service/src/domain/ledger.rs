//! Enrollment ledger - the only writer of schedule slot seat counters
//!
//! Seat bookkeeping itself happens inside the repository transaction; this
//! layer validates requests, maps store outcomes to contract errors and
//! publishes ledger events once a change has committed.

use super::events::{EventPublisher, LedgerEvent};
use super::repository::{
    EnrollCommand, EnrollOutcome, EnrollmentRepository, MoveOutcome, StatusChange,
    TransitionOutcome,
};
use super::service::store_failure;
use super::validation::resolve_page;
use crate::config::Config;
use crate::contract::{
    Enrollment, EnrollmentError, EnrollmentFilter, EnrollmentStatus, ImportOutcome,
    NewEnrollment, Page, SlotOccupancy, SlotReconciliation,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct EnrollmentLedger {
    enrollments: Arc<dyn EnrollmentRepository>,
    events: Arc<dyn EventPublisher>,
    config: Config,
}

impl EnrollmentLedger {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        events: Arc<dyn EventPublisher>,
        config: Config,
    ) -> Self {
        Self {
            enrollments,
            events,
            config,
        }
    }

    /// Enroll a student, taking one seat on the slot if one is given
    #[tracing::instrument(skip(self), fields(student_id = %request.student_id, activity_id = %request.activity_id))]
    pub async fn enroll(&self, request: NewEnrollment) -> Result<Enrollment, EnrollmentError> {
        let command = EnrollCommand {
            enrollment: request.clone(),
            require_slot_when_scheduled: self.config.require_slot_when_scheduled,
        };

        let outcome = self
            .enrollments
            .enroll(&command)
            .await
            .map_err(store_failure)?;

        let enrollment = match outcome {
            EnrollOutcome::Enrolled(enrollment) => enrollment,
            EnrollOutcome::StudentUnavailable => {
                return Err(EnrollmentError::not_found("student", request.student_id))
            }
            EnrollOutcome::ActivityUnavailable => {
                return Err(EnrollmentError::not_found("activity", request.activity_id))
            }
            EnrollOutcome::SlotNotFound => {
                return Err(EnrollmentError::not_found(
                    "schedule slot",
                    request.slot_id.map(|id| id.to_string()).unwrap_or_default(),
                ))
            }
            EnrollOutcome::SlotOfOtherActivity => {
                return Err(EnrollmentError::validation(format!(
                    "schedule slot does not belong to activity {}",
                    request.activity_id
                )))
            }
            EnrollOutcome::SlotRequired => {
                return Err(EnrollmentError::validation(format!(
                    "activity {} has schedule slots; a slot must be chosen",
                    request.activity_id
                )))
            }
            EnrollOutcome::AlreadyEnrolled { existing_id } => {
                return Err(EnrollmentError::conflict(format!(
                    "student {} already has active enrollment {} in activity {}",
                    request.student_id, existing_id, request.activity_id
                )))
            }
            EnrollOutcome::NoSeats { slot_id } => {
                tracing::warn!(slot_id = %slot_id, "enrollment refused: slot is full");
                return Err(EnrollmentError::CapacityExceeded { slot_id });
            }
        };

        tracing::info!(enrollment_id = %enrollment.id, slot_id = ?enrollment.slot_id, "student enrolled");
        self.publish(LedgerEvent::enrolled(&enrollment)).await;
        Ok(enrollment)
    }

    /// Cancel an enrollment, releasing its seat if it was active
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Enrollment, EnrollmentError> {
        let change = StatusChange {
            target: EnrollmentStatus::Cancelled,
            reason,
            effective_date: today(),
        };

        match self.apply(id, change).await {
            // Cancelling twice reads as "no such cancellable enrollment"
            Err(EnrollmentError::InvalidTransition { .. }) => {
                Err(EnrollmentError::not_found("enrollment", id))
            }
            other => other,
        }
    }

    /// Move an enrollment to another status following the transition table
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: Uuid,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, EnrollmentError> {
        let change = StatusChange {
            target: status,
            reason: None,
            effective_date: today(),
        };
        self.apply(id, change).await
    }

    /// Move an enrollment to another slot of the same activity
    #[tracing::instrument(skip(self))]
    pub async fn move_slot(&self, id: Uuid, slot_id: Uuid) -> Result<Enrollment, EnrollmentError> {
        match self
            .enrollments
            .move_slot(id, slot_id)
            .await
            .map_err(store_failure)?
        {
            MoveOutcome::Moved {
                enrollment,
                previous_slot_id,
            } => {
                if previous_slot_id != Some(slot_id) {
                    tracing::info!(
                        enrollment_id = %id,
                        from = ?previous_slot_id,
                        to = %slot_id,
                        "enrollment moved"
                    );
                    self.publish(LedgerEvent::slot_moved(&enrollment, previous_slot_id, slot_id))
                        .await;
                }
                Ok(enrollment)
            }
            MoveOutcome::NotFound => Err(EnrollmentError::not_found("enrollment", id)),
            MoveOutcome::Terminal => Err(EnrollmentError::conflict(format!(
                "enrollment {} is cancelled and cannot change slot",
                id
            ))),
            MoveOutcome::SlotNotFound => Err(EnrollmentError::not_found("schedule slot", slot_id)),
            MoveOutcome::SlotOfOtherActivity => Err(EnrollmentError::validation(format!(
                "schedule slot {} belongs to another activity",
                slot_id
            ))),
            MoveOutcome::NoSeats { slot_id } => {
                tracing::warn!(slot_id = %slot_id, "move refused: slot is full");
                Err(EnrollmentError::CapacityExceeded { slot_id })
            }
        }
    }

    /// Enroll every row independently; one row failing never affects another
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import(
        &self,
        rows: Vec<NewEnrollment>,
    ) -> Result<Vec<ImportOutcome>, EnrollmentError> {
        if rows.len() > self.config.max_import_rows {
            return Err(EnrollmentError::validation(format!(
                "import has {} rows, limit is {}",
                rows.len(),
                self.config.max_import_rows
            )));
        }

        let mut outcomes = Vec::with_capacity(rows.len());
        for (row, request) in rows.into_iter().enumerate() {
            let result = self.enroll(request).await;
            if let Err(err) = &result {
                tracing::debug!(row, kind = err.kind(), "import row rejected");
            }
            outcomes.push(ImportOutcome { row, result });
        }

        let enrolled = outcomes.iter().filter(|o| o.result.is_ok()).count();
        tracing::info!(enrolled, rejected = outcomes.len() - enrolled, "enrollment import finished");
        Ok(outcomes)
    }

    pub async fn get(&self, id: Uuid) -> Result<Enrollment, EnrollmentError> {
        self.enrollments
            .find_by_id(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("enrollment", id))
    }

    pub async fn list(
        &self,
        filter: EnrollmentFilter,
        page: Page,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        let (limit, offset) = resolve_page(page, &self.config);
        self.enrollments
            .list(&filter, limit, offset)
            .await
            .map_err(store_failure)
    }

    pub async fn occupancy(&self, slot_id: Uuid) -> Result<SlotOccupancy, EnrollmentError> {
        self.enrollments
            .occupancy(slot_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("schedule slot", slot_id))
    }

    /// Recompute a slot's counter; a non-zero drift is logged as a warning
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self, slot_id: Uuid) -> Result<SlotReconciliation, EnrollmentError> {
        let report = self
            .enrollments
            .reconcile(slot_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("schedule slot", slot_id))?;

        if report.drift() != 0 {
            tracing::warn!(
                slot_id = %slot_id,
                drift = report.drift(),
                available = report.available_seats,
                "seat counter drift corrected"
            );
        }
        Ok(report)
    }

    async fn apply(&self, id: Uuid, change: StatusChange) -> Result<Enrollment, EnrollmentError> {
        let target = change.target;

        match self
            .enrollments
            .transition(id, &change)
            .await
            .map_err(store_failure)?
        {
            TransitionOutcome::Applied {
                enrollment,
                previous,
            } => {
                if previous != enrollment.status {
                    tracing::info!(
                        enrollment_id = %id,
                        from = %previous,
                        to = %enrollment.status,
                        "enrollment status changed"
                    );
                    self.publish(LedgerEvent::status_changed(&enrollment, previous))
                        .await;
                }
                Ok(enrollment)
            }
            TransitionOutcome::NotFound => Err(EnrollmentError::not_found("enrollment", id)),
            TransitionOutcome::Rejected(rejected) => Err(rejected.into()),
            TransitionOutcome::AlreadyEnrolled { existing_id } => {
                Err(EnrollmentError::conflict(format!(
                    "cannot set {} to {}: enrollment {} is already active for the same student and activity",
                    id, target, existing_id
                )))
            }
            TransitionOutcome::NoSeats { slot_id } => {
                tracing::warn!(slot_id = %slot_id, "reactivation refused: slot is full");
                Err(EnrollmentError::CapacityExceeded { slot_id })
            }
        }
    }

    async fn publish(&self, event: LedgerEvent) {
        let enrollment_id = event.enrollment_id();
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!(enrollment_id = %enrollment_id, error = %e, "failed to publish ledger event");
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
