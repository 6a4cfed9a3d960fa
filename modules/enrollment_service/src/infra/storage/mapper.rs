//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{activity, attendance_record, enrollment, fee, schedule_slot, student};
use crate::contract::{
    Activity, AttendanceRecord, Enrollment, EnrollmentStatus, Fee, FeeStatus, PaymentMethod,
    ScheduleSlot, Student,
};
use sea_orm::ActiveValue::Set;

// ===== Student Conversions =====

impl From<student::Model> for Student {
    fn from(entity: student::Model) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            birth_date: entity.birth_date,
            guardian_name: entity.guardian_name,
            phone: entity.phone,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Student> for student::ActiveModel {
    fn from(model: &Student) -> Self {
        Self {
            id: Set(model.id),
            full_name: Set(model.full_name.clone()),
            birth_date: Set(model.birth_date),
            guardian_name: Set(model.guardian_name.clone()),
            phone: Set(model.phone.clone()),
            active: Set(model.active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Activity Conversions =====

impl From<activity::Model> for Activity {
    fn from(entity: activity::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            kind: entity.kind,
            description: entity.description,
            monthly_fee_cents: entity.monthly_fee_cents,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Activity> for activity::ActiveModel {
    fn from(model: &Activity) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            kind: Set(model.kind.clone()),
            description: Set(model.description.clone()),
            monthly_fee_cents: Set(model.monthly_fee_cents),
            active: Set(model.active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Schedule Slot Conversions =====

impl From<schedule_slot::Model> for ScheduleSlot {
    fn from(entity: schedule_slot::Model) -> Self {
        Self {
            id: entity.id,
            activity_id: entity.activity_id,
            // Column is only ever written from a validated 1..=7 value
            weekday: u8::try_from(entity.weekday).unwrap_or_default(),
            start_time: entity.start_time,
            end_time: entity.end_time,
            total_seats: entity.total_seats,
            available_seats: entity.available_seats,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&ScheduleSlot> for schedule_slot::ActiveModel {
    fn from(model: &ScheduleSlot) -> Self {
        Self {
            id: Set(model.id),
            activity_id: Set(model.activity_id),
            weekday: Set(i16::from(model.weekday)),
            start_time: Set(model.start_time),
            end_time: Set(model.end_time),
            total_seats: Set(model.total_seats),
            available_seats: Set(model.available_seats),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Enrollment Conversions =====

impl From<enrollment::Status> for EnrollmentStatus {
    fn from(status: enrollment::Status) -> Self {
        match status {
            enrollment::Status::Active => Self::Active,
            enrollment::Status::Inactive => Self::Inactive,
            enrollment::Status::Cancelled => Self::Cancelled,
        }
    }
}

impl From<EnrollmentStatus> for enrollment::Status {
    fn from(status: EnrollmentStatus) -> Self {
        match status {
            EnrollmentStatus::Active => Self::Active,
            EnrollmentStatus::Inactive => Self::Inactive,
            EnrollmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<enrollment::Model> for Enrollment {
    fn from(entity: enrollment::Model) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            activity_id: entity.activity_id,
            slot_id: entity.slot_id,
            status: entity.status.into(),
            start_date: entity.start_date,
            end_date: entity.end_date,
            cancellation_reason: entity.cancellation_reason,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Enrollment> for enrollment::ActiveModel {
    fn from(model: &Enrollment) -> Self {
        Self {
            id: Set(model.id),
            student_id: Set(model.student_id),
            activity_id: Set(model.activity_id),
            slot_id: Set(model.slot_id),
            status: Set(model.status.into()),
            start_date: Set(model.start_date),
            end_date: Set(model.end_date),
            cancellation_reason: Set(model.cancellation_reason.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Attendance Conversions =====

impl From<attendance_record::Model> for AttendanceRecord {
    fn from(entity: attendance_record::Model) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            activity_id: entity.activity_id,
            class_date: entity.class_date,
            present: entity.present,
            justification: entity.justification,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

// ===== Fee Conversions =====

impl From<fee::Status> for FeeStatus {
    fn from(status: fee::Status) -> Self {
        match status {
            fee::Status::Pending => Self::Pending,
            fee::Status::Paid => Self::Paid,
            fee::Status::Overdue => Self::Overdue,
            fee::Status::Cancelled => Self::Cancelled,
        }
    }
}

impl From<FeeStatus> for fee::Status {
    fn from(status: FeeStatus) -> Self {
        match status {
            FeeStatus::Pending => Self::Pending,
            FeeStatus::Paid => Self::Paid,
            FeeStatus::Overdue => Self::Overdue,
            FeeStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<fee::Method> for PaymentMethod {
    fn from(method: fee::Method) -> Self {
        match method {
            fee::Method::Cash => Self::Cash,
            fee::Method::Pix => Self::Pix,
            fee::Method::Card => Self::Card,
            fee::Method::Transfer => Self::Transfer,
            fee::Method::Other => Self::Other,
        }
    }
}

impl From<PaymentMethod> for fee::Method {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Pix => Self::Pix,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<fee::Model> for Fee {
    fn from(entity: fee::Model) -> Self {
        Self {
            id: entity.id,
            enrollment_id: entity.enrollment_id,
            student_id: entity.student_id,
            activity_id: entity.activity_id,
            month: u32::try_from(entity.month).unwrap_or_default(),
            year: entity.year,
            amount_cents: entity.amount_cents,
            status: entity.status.into(),
            due_date: entity.due_date,
            paid_date: entity.paid_date,
            payment_method: entity.payment_method.map(Into::into),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Fee> for fee::ActiveModel {
    fn from(model: &Fee) -> Self {
        Self {
            id: Set(model.id),
            enrollment_id: Set(model.enrollment_id),
            student_id: Set(model.student_id),
            activity_id: Set(model.activity_id),
            month: Set(model.month as i32),
            year: Set(model.year),
            amount_cents: Set(model.amount_cents),
            status: Set(model.status.into()),
            due_date: Set(model.due_date),
            paid_date: Set(model.paid_date),
            payment_method: Set(model.payment_method.map(Into::into)),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}
