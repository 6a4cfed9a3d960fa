//! REST surface tests: routes, status codes and Problem Details bodies

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{print_test_header, TestAssociation};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn router() -> (TestAssociation, Router) {
    let assoc = TestAssociation::new().await;
    let router = assoc.module.register_rest(Router::new()).unwrap();
    (assoc, router)
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Creates an activity with one slot of `seats` seats, returns (activity, slot)
async fn seed_activity(router: &Router, seats: i32) -> (String, String) {
    let (status, activity) = call(
        router,
        Method::POST,
        "/activities",
        Some(json!({"name": "Dança", "kind": "dance", "monthly_fee_cents": 8000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let activity_id = id_of(&activity);

    let (status, slot) = call(
        router,
        Method::POST,
        &format!("/activities/{}/slots", activity_id),
        Some(json!({
            "weekday": 2,
            "start_time": "18:00:00",
            "end_time": "19:00:00",
            "total_seats": seats
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(slot["available_seats"], seats);
    (activity_id, id_of(&slot))
}

async fn seed_student(router: &Router, name: &str) -> String {
    let (status, student) = call(
        router,
        Method::POST,
        "/students",
        Some(json!({"full_name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["active"], true);
    id_of(&student)
}

fn enroll_body(student_id: &str, activity_id: &str, slot_id: &str) -> Value {
    json!({
        "student_id": student_id,
        "activity_id": activity_id,
        "slot_id": slot_id,
        "start_date": "2025-03-01"
    })
}

#[tokio::test]
async fn test_enrollment_flow_over_http() {
    print_test_header(
        "test_enrollment_flow_over_http",
        &[
            "201 on enrollment, 409 Problem when the slot is full",
            "cancel frees the seat for the next request",
        ],
    );

    let (_assoc, router) = router().await;
    let (activity_id, slot_id) = seed_activity(&router, 1).await;
    let ana = seed_student(&router, "Ana").await;
    let bia = seed_student(&router, "Bia").await;

    let (status, enrollment) = call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&ana, &activity_id, &slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(enrollment["status"], "active");
    let enrollment_id = id_of(&enrollment);

    let (status, problem) = call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&bia, &activity_id, &slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["title"], "Capacity Exceeded");
    assert_eq!(problem["status"], 409);
    assert_eq!(problem["type"], "https://httpstatuses.io/409");

    let (status, occupancy) =
        call(&router, Method::GET, &format!("/slots/{}/occupancy", slot_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(occupancy["available_seats"], 0);
    assert_eq!(occupancy["active_enrollments"], 1);

    let (status, cancelled) = call(
        &router,
        Method::POST,
        &format!("/enrollments/{}/cancel", enrollment_id),
        Some(json!({"reason": "mudou de cidade"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellation_reason"], "mudou de cidade");

    let (status, _) = call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&bia, &activity_id, &slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = call(
        &router,
        Method::GET,
        &format!("/enrollments?activity_id={}&status=active", activity_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["student_id"], bia.as_str());
}

#[tokio::test]
async fn test_error_statuses() {
    let (_assoc, router) = router().await;
    let (activity_id, slot_id) = seed_activity(&router, 2).await;
    let ana = seed_student(&router, "Ana").await;

    let (status, problem) = call(
        &router,
        Method::GET,
        &format!("/students/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["title"], "Not Found");

    let (status, problem) = call(
        &router,
        Method::POST,
        "/students",
        Some(json!({"full_name": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["title"], "Validation Error");

    let (_, enrollment) = call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&ana, &activity_id, &slot_id)),
    )
    .await;
    let enrollment_id = id_of(&enrollment);

    let (status, _) = call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&ana, &activity_id, &slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    call(
        &router,
        Method::POST,
        &format!("/enrollments/{}/cancel", enrollment_id),
        Some(json!({})),
    )
    .await;
    let (status, problem) = call(
        &router,
        Method::PUT,
        &format!("/enrollments/{}/status", enrollment_id),
        Some(json!({"status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem["title"], "Invalid Status Transition");

    let (status, _) = call(
        &router,
        Method::DELETE,
        &format!("/students/{}", ana),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_attendance_batch_over_http() {
    let (_assoc, router) = router().await;
    let (activity_id, slot_id) = seed_activity(&router, 5).await;
    let ana = seed_student(&router, "Ana").await;
    let outsider = seed_student(&router, "Bia").await;
    call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&ana, &activity_id, &slot_id)),
    )
    .await;

    let (status, response) = call(
        &router,
        Method::POST,
        "/attendance/batch",
        Some(json!({
            "activity_id": activity_id,
            "class_date": "2025-03-04",
            "entries": [
                {"student_id": ana, "present": true},
                {"student_id": outsider, "present": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["recorded"], 1);
    assert_eq!(response["not_enrolled"], 1);
    assert_eq!(response["rows"][0]["status"], "recorded");
    assert_eq!(response["rows"][0]["created"], true);
    assert_eq!(response["rows"][1]["status"], "not_enrolled");

    let (status, summary) = call(
        &router,
        Method::GET,
        &format!(
            "/attendance/summary?student_id={}&activity_id={}&from=2025-03-01&to=2025-03-31",
            ana, activity_id
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["present"], 1);
    assert_eq!(summary["absent"], 0);
}

#[tokio::test]
async fn test_fee_endpoints() {
    let (_assoc, router) = router().await;
    let (activity_id, slot_id) = seed_activity(&router, 5).await;
    let ana = seed_student(&router, "Ana").await;
    call(
        &router,
        Method::POST,
        "/enrollments",
        Some(enroll_body(&ana, &activity_id, &slot_id)),
    )
    .await;

    let (status, generated) = call(
        &router,
        Method::POST,
        "/fees/generate",
        Some(json!({"month": 6, "year": 2025})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["created"], 1);
    assert_eq!(generated["fees"][0]["due_date"], "2025-06-30");
    assert_eq!(generated["fees"][0]["amount_cents"], 8000);
    let fee_id = generated["fees"][0]["id"].as_str().unwrap().to_string();

    let (_, rerun) = call(
        &router,
        Method::POST,
        "/fees/generate",
        Some(json!({"month": 6, "year": 2025})),
    )
    .await;
    assert_eq!(rerun["created"], 0);

    let (status, paid) = call(
        &router,
        Method::POST,
        &format!("/fees/{}/payment", fee_id),
        Some(json!({"paid_date": "2025-06-05", "method": "pix"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");
    assert_eq!(paid["payment_method"], "pix");

    let (status, problem) = call(
        &router,
        Method::POST,
        &format!("/fees/{}/payment", fee_id),
        Some(json!({"method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["title"], "Fee Already Paid");

    let (status, problem) = call(
        &router,
        Method::POST,
        "/fees/generate",
        Some(json!({"month": 13, "year": 2025})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem["detail"].as_str().unwrap().contains("month"));

    let (status, swept) = call(
        &router,
        Method::POST,
        "/fees/sweep-overdue",
        Some(json!({"as_of": "2025-07-15"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(swept["swept"], 0);
}
