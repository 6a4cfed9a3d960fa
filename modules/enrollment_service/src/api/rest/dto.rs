//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Generic list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

// ===== Catalog DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentDto {
    pub id: Uuid,
    #[schema(example = "Ana Souza")]
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create / update student request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentRequest {
    pub full_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub guardian_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: Uuid,
    #[schema(example = "Dança")]
    pub name: String,
    /// Category, e.g. "dance", "sport", "course"
    #[schema(example = "dance")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Monthly fee in cents
    #[schema(example = 8000)]
    pub monthly_fee_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create / update activity request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ActivityRequest {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub monthly_fee_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub id: Uuid,
    pub activity_id: Uuid,
    /// ISO weekday, 1 = Monday
    #[schema(example = 2)]
    pub weekday: u8,
    #[schema(value_type = String, example = "18:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:00:00")]
    pub end_time: NaiveTime,
    pub total_seats: i32,
    pub available_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create / update (resize) slot request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SlotRequest {
    pub weekday: u8,
    #[schema(value_type = String, example = "18:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:00:00")]
    pub end_time: NaiveTime,
    pub total_seats: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OccupancyDto {
    pub slot_id: Uuid,
    pub total_seats: i32,
    pub available_seats: i32,
    pub active_enrollments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReconciliationDto {
    pub slot_id: Uuid,
    pub previous_available: i32,
    pub available_seats: i32,
    /// Seats the counter was off by before the fix
    pub drift: i32,
}

// ===== Enrollment DTOs =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatusDto {
    Active,
    Inactive,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentDto {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<Uuid>,
    pub status: EnrollmentStatusDto,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment request; `start_date` defaults to today
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub student_id: Uuid,
    pub activity_id: Uuid,
    #[serde(default)]
    pub slot_id: Option<Uuid>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CancelEnrollmentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: EnrollmentStatusDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveSlotRequest {
    pub slot_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportRequest {
    pub rows: Vec<EnrollRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RowErrorDto {
    /// Machine-readable error kind, e.g. "capacity_exceeded"
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportRowDto {
    /// Zero-based index into the request rows
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowErrorDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub enrolled: usize,
    pub rejected: usize,
    pub rows: Vec<ImportRowDto>,
}

// ===== Attendance DTOs =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceEntryDto {
    pub student_id: Uuid,
    pub present: bool,
    #[serde(default)]
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceBatchRequest {
    pub activity_id: Uuid,
    pub class_date: NaiveDate,
    pub entries: Vec<AttendanceEntryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordDto {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub class_date: NaiveDate,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceRowStatus {
    Recorded,
    NotEnrolled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRowDto {
    pub student_id: Uuid,
    pub status: AttendanceRowStatus,
    /// `false` when an existing record for the class was updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecordDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceBatchResponse {
    pub recorded: usize,
    pub not_enrolled: usize,
    pub rows: Vec<AttendanceRowDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummaryDto {
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub present: u32,
    pub absent: u32,
    pub justified: u32,
}

// ===== Fee DTOs =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatusDto {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodDto {
    Cash,
    Pix,
    Card,
    Transfer,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeeDto {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub amount_cents: i64,
    pub status: FeeStatusDto,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateFeesRequest {
    #[schema(example = 6)]
    pub month: u32,
    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateFeesResponse {
    /// Rows created by this call; zero on a re-run
    pub created: usize,
    pub fees: Vec<FeeDto>,
}

/// Payment request; `paid_date` defaults to today
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    pub method: PaymentMethodDto,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SweepRequest {
    /// Defaults to today
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    pub swept: u64,
}
