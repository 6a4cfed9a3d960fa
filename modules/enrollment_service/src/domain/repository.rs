//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories/.
//!
//! Methods that move seats run as one store transaction each and report
//! expected business outcomes through the `*Outcome` enums; `Err` is reserved
//! for store failures, after which nothing has been persisted.

use crate::contract::{
    Activity, ActivityFilter, ActivityInput, AttendanceEntry, AttendanceOutcome,
    AttendanceRecord, Enrollment, EnrollmentFilter, EnrollmentStatus, Fee, FeeFilter,
    NewEnrollment, PaymentMethod, ScheduleSlot, SlotInput, SlotOccupancy, SlotReconciliation,
    Student, StudentFilter, StudentInput,
};
use crate::domain::transitions::Rejected;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

// ===== Catalog =====

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn create(&self, student: &Student) -> Result<Student>;

    /// Returns `None` when the student does not exist
    async fn update(&self, id: Uuid, input: &StudentInput) -> Result<Option<Student>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>>;

    async fn list(&self, filter: &StudentFilter, limit: u64, offset: u64) -> Result<Vec<Student>>;

    /// Soft delete / restore; returns `false` when the student does not exist
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, activity: &Activity) -> Result<Activity>;

    async fn update(&self, id: Uuid, input: &ActivityInput) -> Result<Option<Activity>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Activity>>;

    async fn list(&self, filter: &ActivityFilter, limit: u64, offset: u64)
        -> Result<Vec<Activity>>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool>;
}

/// Outcome of editing a slot (which may resize it)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotUpdateOutcome {
    Updated(ScheduleSlot),
    NotFound,
    /// Requested capacity is below the number of seats currently held
    BelowActiveCount { active: i64 },
}

/// Outcome of deleting a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDeleteOutcome {
    Deleted,
    NotFound,
    InUse { active: i64 },
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create(&self, slot: &ScheduleSlot) -> Result<ScheduleSlot>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduleSlot>>;

    async fn list_by_activity(&self, activity_id: Uuid) -> Result<Vec<ScheduleSlot>>;

    /// Edit the slot under its row lock, recomputing the seat counter
    async fn update(&self, id: Uuid, input: &SlotInput) -> Result<SlotUpdateOutcome>;

    /// Delete unless an active enrollment holds a seat on it
    async fn delete(&self, id: Uuid) -> Result<SlotDeleteOutcome>;
}

// ===== Enrollment ledger =====

/// Enrollment request as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollCommand {
    pub enrollment: NewEnrollment,
    /// Refuse slot-less enrollments for activities that have slots
    pub require_slot_when_scheduled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled(Enrollment),
    /// Student missing or inactive
    StudentUnavailable,
    /// Activity missing or inactive
    ActivityUnavailable,
    SlotNotFound,
    SlotOfOtherActivity,
    SlotRequired,
    /// An active enrollment for the pair already exists
    AlreadyEnrolled { existing_id: Uuid },
    NoSeats { slot_id: Uuid },
}

/// Status change request as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub target: EnrollmentStatus,
    /// Stored when the target is `cancelled`
    pub reason: Option<String>,
    /// End date written when the enrollment stops being active, if none set
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied {
        enrollment: Enrollment,
        previous: EnrollmentStatus,
    },
    NotFound,
    Rejected(Rejected),
    /// Reactivation blocked by another active enrollment for the pair
    AlreadyEnrolled { existing_id: Uuid },
    NoSeats { slot_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        enrollment: Enrollment,
        previous_slot_id: Option<Uuid>,
    },
    NotFound,
    /// Cancelled enrollments keep their last slot reference
    Terminal,
    SlotNotFound,
    SlotOfOtherActivity,
    NoSeats { slot_id: Uuid },
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert an active enrollment and take its seat in one transaction
    async fn enroll(&self, command: &EnrollCommand) -> Result<EnrollOutcome>;

    /// Apply a status change and its seat effect in one transaction
    async fn transition(&self, id: Uuid, change: &StatusChange) -> Result<TransitionOutcome>;

    /// Move to another slot of the same activity, swapping seats atomically
    async fn move_slot(&self, id: Uuid, slot_id: Uuid) -> Result<MoveOutcome>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>>;

    async fn list(
        &self,
        filter: &EnrollmentFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Enrollment>>;

    async fn occupancy(&self, slot_id: Uuid) -> Result<Option<SlotOccupancy>>;

    /// Recompute the slot's seat counter from its active enrollments
    async fn reconcile(&self, slot_id: Uuid) -> Result<Option<SlotReconciliation>>;
}

// ===== Attendance =====

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Validate and upsert a whole class in one transaction; one outcome per
    /// entry, in input order
    async fn register_batch(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
        entries: &[AttendanceEntry],
    ) -> Result<Vec<AttendanceOutcome>>;

    async fn list_for_class(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>>;

    async fn list_for_student(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>>;
}

// ===== Fees =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid(Fee),
    NotFound,
    AlreadyPaid,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeCancelOutcome {
    Cancelled(Fee),
    NotFound,
    AlreadyPaid,
}

#[async_trait]
pub trait FeeRepository: Send + Sync {
    /// Insert the missing fees of the period for every active enrollment;
    /// returns only the rows this call created
    async fn generate(&self, month: u32, year: i32, due_date: NaiveDate) -> Result<Vec<Fee>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Fee>>;

    async fn list(&self, filter: &FeeFilter, limit: u64, offset: u64) -> Result<Vec<Fee>>;

    /// Conditional pending/overdue -> paid
    async fn mark_paid(
        &self,
        id: Uuid,
        paid_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome>;

    async fn cancel(&self, id: Uuid) -> Result<FeeCancelOutcome>;

    /// pending fees due before `as_of` -> overdue; returns the count
    async fn sweep_overdue(&self, as_of: NaiveDate) -> Result<u64>;
}
