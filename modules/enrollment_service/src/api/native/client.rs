//! Native client implementation - wraps domain service for in-process calls

use crate::contract::*;
use crate::domain::Service;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Native client implementation that directly calls the domain service
///
/// Used for in-process communication without HTTP overhead, e.g. by the
/// server's maintenance commands.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AssociationApi for NativeClient {
    async fn create_student(&self, input: StudentInput) -> Result<Student, EnrollmentError> {
        self.service.catalog.create_student(input).await
    }

    async fn get_student(&self, id: Uuid) -> Result<Student, EnrollmentError> {
        self.service.catalog.get_student(id).await
    }

    async fn create_activity(&self, input: ActivityInput) -> Result<Activity, EnrollmentError> {
        self.service.catalog.create_activity(input).await
    }

    async fn get_activity(&self, id: Uuid) -> Result<Activity, EnrollmentError> {
        self.service.catalog.get_activity(id).await
    }

    async fn create_slot(
        &self,
        activity_id: Uuid,
        input: SlotInput,
    ) -> Result<ScheduleSlot, EnrollmentError> {
        self.service.catalog.create_slot(activity_id, input).await
    }

    async fn list_slots(&self, activity_id: Uuid) -> Result<Vec<ScheduleSlot>, EnrollmentError> {
        self.service.catalog.list_slots(activity_id).await
    }

    async fn enroll(&self, request: NewEnrollment) -> Result<Enrollment, EnrollmentError> {
        self.service.ledger.enroll(request).await
    }

    async fn cancel_enrollment(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Enrollment, EnrollmentError> {
        self.service.ledger.cancel(id, reason).await
    }

    async fn set_enrollment_status(
        &self,
        id: Uuid,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, EnrollmentError> {
        self.service.ledger.set_status(id, status).await
    }

    async fn move_enrollment(&self, id: Uuid, slot_id: Uuid) -> Result<Enrollment, EnrollmentError> {
        self.service.ledger.move_slot(id, slot_id).await
    }

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
        page: Page,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        self.service.ledger.list(filter, page).await
    }

    async fn slot_occupancy(&self, slot_id: Uuid) -> Result<SlotOccupancy, EnrollmentError> {
        self.service.ledger.occupancy(slot_id).await
    }

    async fn register_attendance(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
        entries: Vec<AttendanceEntry>,
    ) -> Result<Vec<AttendanceOutcome>, EnrollmentError> {
        self.service
            .attendance
            .register_batch(activity_id, class_date, entries)
            .await
    }

    async fn attendance_summary(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AttendanceSummary, EnrollmentError> {
        self.service
            .attendance
            .student_summary(student_id, activity_id, from, to)
            .await
    }

    async fn generate_monthly_fees(&self, month: u32, year: i32) -> Result<Vec<Fee>, EnrollmentError> {
        self.service.fees.generate_monthly(month, year).await
    }

    async fn register_payment(
        &self,
        fee_id: Uuid,
        paid_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Fee, EnrollmentError> {
        self.service
            .fees
            .register_payment(fee_id, paid_date, method)
            .await
    }

    async fn list_fees(&self, filter: FeeFilter, page: Page) -> Result<Vec<Fee>, EnrollmentError> {
        self.service.fees.list(filter, page).await
    }
}
