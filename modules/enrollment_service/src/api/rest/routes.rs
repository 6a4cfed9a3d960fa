//! Route registration

use super::handlers;
use crate::domain::Service;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;

/// Register all REST routes on `router`
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        // Catalog
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{id}",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::deactivate_student),
        )
        .route(
            "/activities",
            get(handlers::list_activities).post(handlers::create_activity),
        )
        .route(
            "/activities/{id}",
            get(handlers::get_activity)
                .put(handlers::update_activity)
                .delete(handlers::deactivate_activity),
        )
        .route(
            "/activities/{id}/slots",
            get(handlers::list_slots).post(handlers::create_slot),
        )
        .route(
            "/slots/{id}",
            get(handlers::get_slot)
                .put(handlers::update_slot)
                .delete(handlers::delete_slot),
        )
        .route("/slots/{id}/occupancy", get(handlers::slot_occupancy))
        .route("/slots/{id}/reconcile", post(handlers::reconcile_slot))
        // Enrollment ledger
        .route(
            "/enrollments",
            get(handlers::list_enrollments).post(handlers::enroll),
        )
        .route("/enrollments/import", post(handlers::import_enrollments))
        .route("/enrollments/{id}", get(handlers::get_enrollment))
        .route("/enrollments/{id}/cancel", post(handlers::cancel_enrollment))
        .route("/enrollments/{id}/status", put(handlers::set_enrollment_status))
        .route("/enrollments/{id}/slot", put(handlers::move_enrollment))
        // Attendance
        .route("/attendance", get(handlers::list_attendance))
        .route("/attendance/batch", post(handlers::register_attendance))
        .route("/attendance/summary", get(handlers::attendance_summary))
        // Fees
        .route("/fees", get(handlers::list_fees))
        .route("/fees/generate", post(handlers::generate_fees))
        .route("/fees/sweep-overdue", post(handlers::sweep_overdue))
        .route("/fees/{id}", get(handlers::get_fee))
        .route("/fees/{id}/payment", post(handlers::register_payment))
        .route("/fees/{id}/cancel", post(handlers::cancel_fee))
        .layer(Extension(service))
}
