//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with the
//! association records core. NO HTTP - direct function calls.

use super::{error::EnrollmentError, model::*};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Association records API for in-process callers
#[async_trait]
pub trait AssociationApi: Send + Sync {
    // ===== Catalog =====

    async fn create_student(&self, input: StudentInput) -> Result<Student, EnrollmentError>;

    async fn get_student(&self, id: Uuid) -> Result<Student, EnrollmentError>;

    async fn create_activity(&self, input: ActivityInput) -> Result<Activity, EnrollmentError>;

    async fn get_activity(&self, id: Uuid) -> Result<Activity, EnrollmentError>;

    async fn create_slot(
        &self,
        activity_id: Uuid,
        input: SlotInput,
    ) -> Result<ScheduleSlot, EnrollmentError>;

    async fn list_slots(&self, activity_id: Uuid) -> Result<Vec<ScheduleSlot>, EnrollmentError>;

    // ===== Enrollment ledger =====

    /// Enroll a student, taking one seat on the chosen slot
    async fn enroll(&self, request: NewEnrollment) -> Result<Enrollment, EnrollmentError>;

    /// Cancel an enrollment, releasing its seat
    async fn cancel_enrollment(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Enrollment, EnrollmentError>;

    async fn set_enrollment_status(
        &self,
        id: Uuid,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, EnrollmentError>;

    async fn move_enrollment(&self, id: Uuid, slot_id: Uuid) -> Result<Enrollment, EnrollmentError>;

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
        page: Page,
    ) -> Result<Vec<Enrollment>, EnrollmentError>;

    async fn slot_occupancy(&self, slot_id: Uuid) -> Result<SlotOccupancy, EnrollmentError>;

    // ===== Attendance =====

    /// Register a class in one batch; one outcome per entry
    async fn register_attendance(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
        entries: Vec<AttendanceEntry>,
    ) -> Result<Vec<AttendanceOutcome>, EnrollmentError>;

    async fn attendance_summary(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AttendanceSummary, EnrollmentError>;

    // ===== Fees =====

    /// Create the missing fees of a period; returns only new rows
    async fn generate_monthly_fees(&self, month: u32, year: i32) -> Result<Vec<Fee>, EnrollmentError>;

    async fn register_payment(
        &self,
        fee_id: Uuid,
        paid_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Fee, EnrollmentError>;

    async fn list_fees(&self, filter: FeeFilter, page: Page) -> Result<Vec<Fee>, EnrollmentError>;
}
