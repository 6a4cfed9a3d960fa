//! Contract models for the enrollment service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use uuid::Uuid;

use super::error::EnrollmentError;

// ===== Catalog =====

/// A registered student of the association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    /// Parent or guardian responsible for minors
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
    /// Soft delete flag
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a student
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentInput {
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
}

/// An activity offered by the association (dance class, football, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    /// Free-text activity type, e.g. "dança", "esporte"
    pub kind: String,
    pub description: Option<String>,
    /// Monthly fee in cents
    pub monthly_fee_cents: i64,
    /// Soft delete flag
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating an activity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityInput {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub monthly_fee_cents: i64,
}

/// A weekly offering of an activity with its own seat capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub id: Uuid,
    pub activity_id: Uuid,
    /// ISO weekday, 1 = Monday .. 7 = Sunday
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_seats: i32,
    /// Live counter, always `total_seats - active enrollments on this slot`
    pub available_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a schedule slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInput {
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_seats: i32,
}

// ===== Enrollment ledger =====

/// Enrollment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentStatus {
    /// Holds a seat on its slot
    Active,
    /// Paused; no seat held, may be reactivated
    Inactive,
    /// Terminal
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EnrollmentError> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EnrollmentError::Validation {
                message: format!("unknown enrollment status '{}'", other),
            }),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrollment of a student into an activity, optionally pinned to a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub status: EnrollmentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Whether this enrollment counts as active on the given class date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.status == EnrollmentStatus::Active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| end >= date)
    }
}

/// Enrollment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub start_date: NaiveDate,
}

/// Per-row result of a bulk enrollment import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Zero-based position of the row in the import
    pub row: usize,
    pub result: Result<Enrollment, EnrollmentError>,
}

/// Seat accounting snapshot of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOccupancy {
    pub slot_id: Uuid,
    pub total_seats: i32,
    pub available_seats: i32,
    pub active_enrollments: i64,
}

/// Result of recomputing a slot's seat counter from its active enrollments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReconciliation {
    pub slot_id: Uuid,
    pub previous_available: i32,
    pub available_seats: i32,
}

impl SlotReconciliation {
    /// How far the stored counter was off (0 for a healthy slot)
    pub fn drift(&self) -> i32 {
        self.previous_available - self.available_seats
    }
}

// ===== Attendance =====

/// One line of an attendance batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub student_id: Uuid,
    pub present: bool,
    pub justification: Option<String>,
}

/// Stored attendance for one student in one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub class_date: NaiveDate,
    pub present: bool,
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-row result of an attendance batch, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceOutcome {
    Recorded {
        record: AttendanceRecord,
        /// `false` when an existing record was overwritten
        created: bool,
    },
    NotEnrolled {
        student_id: Uuid,
    },
}

impl AttendanceOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Presence totals for a student in an activity over a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub present: u32,
    pub absent: u32,
    /// Absences carrying a justification (subset of `absent`)
    pub justified: u32,
}

// ===== Fees =====

/// Monthly fee status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EnrollmentError> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EnrollmentError::Validation {
                message: format!("unknown fee status '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a fee was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Pix,
    Card,
    Transfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Pix => "pix",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }
}

/// One monthly fee of one enrollment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub amount_cents: i64,
    pub status: FeeStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Queries =====

/// Offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// `None` uses the configured default page size
    pub limit: Option<u64>,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentFilter {
    pub active: Option<bool>,
    pub name_contains: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFilter {
    pub active: Option<bool>,
    pub kind: Option<String>,
    pub name_contains: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnrollmentFilter {
    pub student_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    pub status: Option<EnrollmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeFilter {
    pub student_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub status: Option<FeeStatus>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}
