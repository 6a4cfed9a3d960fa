//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::contract::{ActivityFilter, EnrollmentFilter, FeeFilter, Page, StudentFilter};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

type Svc = Extension<Arc<Service>>;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ===== Students =====

#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsQuery {
    pub active: Option<bool>,
    pub name: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

pub async fn list_students(
    Extension(service): Svc,
    Query(query): Query<ListStudentsQuery>,
) -> Result<Json<ListResponse<StudentDto>>, Problem> {
    let filter = StudentFilter {
        active: query.active,
        name_contains: query.name,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let students = service
        .catalog
        .list_students(filter, page)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        students.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create_student(
    Extension(service): Svc,
    Json(req): Json<StudentRequest>,
) -> Result<(StatusCode, Json<StudentDto>), Problem> {
    let student = service
        .catalog
        .create_student(req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(student.into())))
}

pub async fn get_student(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentDto>, Problem> {
    let student = service
        .catalog
        .get_student(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(student.into()))
}

pub async fn update_student(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<StudentRequest>,
) -> Result<Json<StudentDto>, Problem> {
    let student = service
        .catalog
        .update_student(id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(student.into()))
}

/// Soft delete
pub async fn deactivate_student(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .catalog
        .deactivate_student(id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Activities =====

#[derive(Debug, Default, Deserialize)]
pub struct ListActivitiesQuery {
    pub active: Option<bool>,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

pub async fn list_activities(
    Extension(service): Svc,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<ListResponse<ActivityDto>>, Problem> {
    let filter = ActivityFilter {
        active: query.active,
        kind: query.kind,
        name_contains: query.name,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let activities = service
        .catalog
        .list_activities(filter, page)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        activities.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create_activity(
    Extension(service): Svc,
    Json(req): Json<ActivityRequest>,
) -> Result<(StatusCode, Json<ActivityDto>), Problem> {
    let activity = service
        .catalog
        .create_activity(req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(activity.into())))
}

pub async fn get_activity(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityDto>, Problem> {
    let activity = service
        .catalog
        .get_activity(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(activity.into()))
}

pub async fn update_activity(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<ActivityRequest>,
) -> Result<Json<ActivityDto>, Problem> {
    let activity = service
        .catalog
        .update_activity(id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(activity.into()))
}

pub async fn deactivate_activity(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .catalog
        .deactivate_activity(id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Schedule slots =====

pub async fn list_slots(
    Extension(service): Svc,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ListResponse<SlotDto>>, Problem> {
    let slots = service
        .catalog
        .list_slots(activity_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        slots.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create_slot(
    Extension(service): Svc,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<SlotRequest>,
) -> Result<(StatusCode, Json<SlotDto>), Problem> {
    let slot = service
        .catalog
        .create_slot(activity_id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(slot.into())))
}

pub async fn get_slot(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<SlotDto>, Problem> {
    let slot = service
        .catalog
        .get_slot(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(slot.into()))
}

pub async fn update_slot(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<SlotRequest>,
) -> Result<Json<SlotDto>, Problem> {
    let slot = service
        .catalog
        .update_slot(id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(slot.into()))
}

pub async fn delete_slot(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .catalog
        .delete_slot(id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn slot_occupancy(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<OccupancyDto>, Problem> {
    let occupancy = service
        .ledger
        .occupancy(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(occupancy.into()))
}

pub async fn reconcile_slot(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ReconciliationDto>, Problem> {
    let report = service
        .ledger
        .reconcile(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(report.into()))
}

// ===== Enrollments =====

#[derive(Debug, Default, Deserialize)]
pub struct ListEnrollmentsQuery {
    pub student_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    pub status: Option<EnrollmentStatusDto>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

pub async fn list_enrollments(
    Extension(service): Svc,
    Query(query): Query<ListEnrollmentsQuery>,
) -> Result<Json<ListResponse<EnrollmentDto>>, Problem> {
    let filter = EnrollmentFilter {
        student_id: query.student_id,
        activity_id: query.activity_id,
        slot_id: query.slot_id,
        status: query.status.map(Into::into),
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let enrollments = service
        .ledger
        .list(filter, page)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        enrollments.into_iter().map(Into::into).collect(),
    )))
}

pub async fn enroll(
    Extension(service): Svc,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentDto>), Problem> {
    let enrollment = service
        .ledger
        .enroll(req.into_contract(today()))
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

/// Per-row results; the request itself only fails on an oversized import
pub async fn import_enrollments(
    Extension(service): Svc,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, Problem> {
    let today = today();
    let rows = req
        .rows
        .into_iter()
        .map(|row| row.into_contract(today))
        .collect();

    let outcomes = service
        .ledger
        .import(rows)
        .await
        .map_err(map_domain_error)?;

    let rows: Vec<ImportRowDto> = outcomes.into_iter().map(Into::into).collect();
    let enrolled = rows.iter().filter(|r| r.error.is_none()).count();

    Ok(Json(ImportResponse {
        enrolled,
        rejected: rows.len() - enrolled,
        rows,
    }))
}

pub async fn get_enrollment(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentDto>, Problem> {
    let enrollment = service.ledger.get(id).await.map_err(map_domain_error)?;
    Ok(Json(enrollment.into()))
}

pub async fn cancel_enrollment(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelEnrollmentRequest>,
) -> Result<Json<EnrollmentDto>, Problem> {
    let enrollment = service
        .ledger
        .cancel(id, req.reason)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(enrollment.into()))
}

pub async fn set_enrollment_status(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<EnrollmentDto>, Problem> {
    let enrollment = service
        .ledger
        .set_status(id, req.status.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(enrollment.into()))
}

pub async fn move_enrollment(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveSlotRequest>,
) -> Result<Json<EnrollmentDto>, Problem> {
    let enrollment = service
        .ledger
        .move_slot(id, req.slot_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(enrollment.into()))
}

// ===== Attendance =====

pub async fn register_attendance(
    Extension(service): Svc,
    Json(req): Json<AttendanceBatchRequest>,
) -> Result<Json<AttendanceBatchResponse>, Problem> {
    let entries = req.entries.into_iter().map(Into::into).collect();

    let outcomes = service
        .attendance
        .register_batch(req.activity_id, req.class_date, entries)
        .await
        .map_err(map_domain_error)?;

    let rows: Vec<AttendanceRowDto> = outcomes.into_iter().map(Into::into).collect();
    let recorded = rows
        .iter()
        .filter(|r| r.status == AttendanceRowStatus::Recorded)
        .count();

    Ok(Json(AttendanceBatchResponse {
        recorded,
        not_enrolled: rows.len() - recorded,
        rows,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClassQuery {
    pub activity_id: Uuid,
    pub class_date: NaiveDate,
}

pub async fn list_attendance(
    Extension(service): Svc,
    Query(query): Query<ClassQuery>,
) -> Result<Json<ListResponse<AttendanceRecordDto>>, Problem> {
    let records = service
        .attendance
        .list_for_class(query.activity_id, query.class_date)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub student_id: Uuid,
    pub activity_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub async fn attendance_summary(
    Extension(service): Svc,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<AttendanceSummaryDto>, Problem> {
    let summary = service
        .attendance
        .student_summary(query.student_id, query.activity_id, query.from, query.to)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(summary.into()))
}

// ===== Fees =====

#[derive(Debug, Default, Deserialize)]
pub struct ListFeesQuery {
    pub student_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub status: Option<FeeStatusDto>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

pub async fn list_fees(
    Extension(service): Svc,
    Query(query): Query<ListFeesQuery>,
) -> Result<Json<ListResponse<FeeDto>>, Problem> {
    let filter = FeeFilter {
        student_id: query.student_id,
        activity_id: query.activity_id,
        status: query.status.map(Into::into),
        month: query.month,
        year: query.year,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let fees = service
        .fees
        .list(filter, page)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ListResponse::new(
        fees.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_fee(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeDto>, Problem> {
    let fee = service.fees.get(id).await.map_err(map_domain_error)?;
    Ok(Json(fee.into()))
}

pub async fn generate_fees(
    Extension(service): Svc,
    Json(req): Json<GenerateFeesRequest>,
) -> Result<Json<GenerateFeesResponse>, Problem> {
    let fees = service
        .fees
        .generate_monthly(req.month, req.year)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(GenerateFeesResponse {
        created: fees.len(),
        fees: fees.into_iter().map(Into::into).collect(),
    }))
}

pub async fn register_payment(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<FeeDto>, Problem> {
    let fee = service
        .fees
        .register_payment(id, req.paid_date.unwrap_or_else(today), req.method.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(fee.into()))
}

pub async fn cancel_fee(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeDto>, Problem> {
    let fee = service.fees.cancel(id).await.map_err(map_domain_error)?;
    Ok(Json(fee.into()))
}

pub async fn sweep_overdue(
    Extension(service): Svc,
    Json(req): Json<SweepRequest>,
) -> Result<Json<SweepResponse>, Problem> {
    let as_of = req.as_of.unwrap_or_else(today);

    let swept = service
        .fees
        .sweep_overdue(as_of)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(SweepResponse { swept }))
}
