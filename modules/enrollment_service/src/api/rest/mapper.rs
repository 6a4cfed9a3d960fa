//! Mapper implementations for converting between DTOs and contract models
//!
//! This module contains all From/Into implementations for bidirectional
//! conversion between REST DTOs and transport-agnostic contract models.

use super::dto::*;
use crate::contract;
use chrono::NaiveDate;

// ===== Catalog conversions =====

impl From<contract::Student> for StudentDto {
    fn from(student: contract::Student) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name,
            birth_date: student.birth_date,
            guardian_name: student.guardian_name,
            phone: student.phone,
            active: student.active,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

impl From<StudentRequest> for contract::StudentInput {
    fn from(req: StudentRequest) -> Self {
        Self {
            full_name: req.full_name,
            birth_date: req.birth_date,
            guardian_name: req.guardian_name,
            phone: req.phone,
        }
    }
}

impl From<contract::Activity> for ActivityDto {
    fn from(activity: contract::Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name,
            kind: activity.kind,
            description: activity.description,
            monthly_fee_cents: activity.monthly_fee_cents,
            active: activity.active,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        }
    }
}

impl From<ActivityRequest> for contract::ActivityInput {
    fn from(req: ActivityRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            description: req.description,
            monthly_fee_cents: req.monthly_fee_cents,
        }
    }
}

impl From<contract::ScheduleSlot> for SlotDto {
    fn from(slot: contract::ScheduleSlot) -> Self {
        Self {
            id: slot.id,
            activity_id: slot.activity_id,
            weekday: slot.weekday,
            start_time: slot.start_time,
            end_time: slot.end_time,
            total_seats: slot.total_seats,
            available_seats: slot.available_seats,
            created_at: slot.created_at,
            updated_at: slot.updated_at,
        }
    }
}

impl From<SlotRequest> for contract::SlotInput {
    fn from(req: SlotRequest) -> Self {
        Self {
            weekday: req.weekday,
            start_time: req.start_time,
            end_time: req.end_time,
            total_seats: req.total_seats,
        }
    }
}

impl From<contract::SlotOccupancy> for OccupancyDto {
    fn from(o: contract::SlotOccupancy) -> Self {
        Self {
            slot_id: o.slot_id,
            total_seats: o.total_seats,
            available_seats: o.available_seats,
            active_enrollments: o.active_enrollments,
        }
    }
}

impl From<contract::SlotReconciliation> for ReconciliationDto {
    fn from(r: contract::SlotReconciliation) -> Self {
        Self {
            slot_id: r.slot_id,
            previous_available: r.previous_available,
            available_seats: r.available_seats,
            drift: r.drift(),
        }
    }
}

// ===== Enrollment conversions =====

impl From<contract::EnrollmentStatus> for EnrollmentStatusDto {
    fn from(status: contract::EnrollmentStatus) -> Self {
        match status {
            contract::EnrollmentStatus::Active => Self::Active,
            contract::EnrollmentStatus::Inactive => Self::Inactive,
            contract::EnrollmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<EnrollmentStatusDto> for contract::EnrollmentStatus {
    fn from(status: EnrollmentStatusDto) -> Self {
        match status {
            EnrollmentStatusDto::Active => Self::Active,
            EnrollmentStatusDto::Inactive => Self::Inactive,
            EnrollmentStatusDto::Cancelled => Self::Cancelled,
        }
    }
}

impl From<contract::Enrollment> for EnrollmentDto {
    fn from(e: contract::Enrollment) -> Self {
        Self {
            id: e.id,
            student_id: e.student_id,
            activity_id: e.activity_id,
            slot_id: e.slot_id,
            status: e.status.into(),
            start_date: e.start_date,
            end_date: e.end_date,
            cancellation_reason: e.cancellation_reason,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl EnrollRequest {
    pub fn into_contract(self, today: NaiveDate) -> contract::NewEnrollment {
        contract::NewEnrollment {
            student_id: self.student_id,
            activity_id: self.activity_id,
            slot_id: self.slot_id,
            start_date: self.start_date.unwrap_or(today),
        }
    }
}

impl From<contract::ImportOutcome> for ImportRowDto {
    fn from(outcome: contract::ImportOutcome) -> Self {
        match outcome.result {
            Ok(enrollment) => Self {
                row: outcome.row,
                enrollment: Some(enrollment.into()),
                error: None,
            },
            Err(err) => Self {
                row: outcome.row,
                enrollment: None,
                error: Some(RowErrorDto {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                }),
            },
        }
    }
}

// ===== Attendance conversions =====

impl From<AttendanceEntryDto> for contract::AttendanceEntry {
    fn from(entry: AttendanceEntryDto) -> Self {
        Self {
            student_id: entry.student_id,
            present: entry.present,
            justification: entry.justification,
        }
    }
}

impl From<contract::AttendanceRecord> for AttendanceRecordDto {
    fn from(r: contract::AttendanceRecord) -> Self {
        Self {
            id: r.id,
            student_id: r.student_id,
            activity_id: r.activity_id,
            class_date: r.class_date,
            present: r.present,
            justification: r.justification,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<contract::AttendanceOutcome> for AttendanceRowDto {
    fn from(outcome: contract::AttendanceOutcome) -> Self {
        match outcome {
            contract::AttendanceOutcome::Recorded { record, created } => Self {
                student_id: record.student_id,
                status: AttendanceRowStatus::Recorded,
                created: Some(created),
                record: Some(record.into()),
            },
            contract::AttendanceOutcome::NotEnrolled { student_id } => Self {
                student_id,
                status: AttendanceRowStatus::NotEnrolled,
                created: None,
                record: None,
            },
        }
    }
}

impl From<contract::AttendanceSummary> for AttendanceSummaryDto {
    fn from(s: contract::AttendanceSummary) -> Self {
        Self {
            student_id: s.student_id,
            activity_id: s.activity_id,
            from: s.from,
            to: s.to,
            present: s.present,
            absent: s.absent,
            justified: s.justified,
        }
    }
}

// ===== Fee conversions =====

impl From<contract::FeeStatus> for FeeStatusDto {
    fn from(status: contract::FeeStatus) -> Self {
        match status {
            contract::FeeStatus::Pending => Self::Pending,
            contract::FeeStatus::Paid => Self::Paid,
            contract::FeeStatus::Overdue => Self::Overdue,
            contract::FeeStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<FeeStatusDto> for contract::FeeStatus {
    fn from(status: FeeStatusDto) -> Self {
        match status {
            FeeStatusDto::Pending => Self::Pending,
            FeeStatusDto::Paid => Self::Paid,
            FeeStatusDto::Overdue => Self::Overdue,
            FeeStatusDto::Cancelled => Self::Cancelled,
        }
    }
}

impl From<contract::PaymentMethod> for PaymentMethodDto {
    fn from(method: contract::PaymentMethod) -> Self {
        match method {
            contract::PaymentMethod::Cash => Self::Cash,
            contract::PaymentMethod::Pix => Self::Pix,
            contract::PaymentMethod::Card => Self::Card,
            contract::PaymentMethod::Transfer => Self::Transfer,
            contract::PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<PaymentMethodDto> for contract::PaymentMethod {
    fn from(method: PaymentMethodDto) -> Self {
        match method {
            PaymentMethodDto::Cash => Self::Cash,
            PaymentMethodDto::Pix => Self::Pix,
            PaymentMethodDto::Card => Self::Card,
            PaymentMethodDto::Transfer => Self::Transfer,
            PaymentMethodDto::Other => Self::Other,
        }
    }
}

impl From<contract::Fee> for FeeDto {
    fn from(fee: contract::Fee) -> Self {
        Self {
            id: fee.id,
            enrollment_id: fee.enrollment_id,
            student_id: fee.student_id,
            activity_id: fee.activity_id,
            month: fee.month,
            year: fee.year,
            amount_cents: fee.amount_cents,
            status: fee.status.into(),
            due_date: fee.due_date,
            paid_date: fee.paid_date,
            payment_method: fee.payment_method.map(Into::into),
            created_at: fee.created_at,
            updated_at: fee.updated_at,
        }
    }
}
