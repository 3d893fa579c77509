use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use scheduling_cell::router::appointment_routes;
use shared_database::store::SchedulingStore;
use shared_utils::test_utils::{seeded_store, SchedulingFixtures};

fn app(fixtures: &SchedulingFixtures) -> Router {
    let store: Arc<dyn SchedulingStore> = fixtures.store.clone();
    appointment_routes(store)
}

fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 2, 10, hour, minute, 0).unwrap()
}

fn booking_body(fixtures: &SchedulingFixtures, hour: u32, minute: u32) -> Value {
    json!({
        "doctor_id": fixtures.doctor_id,
        "patient_id": fixtures.patient_id,
        "clinic_id": fixtures.clinic_id,
        "start_time": at(hour, minute),
        "appointment_type": "in_person",
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn booking_returns_created_with_the_pending_row() {
    let fixtures = seeded_store();

    let response = app(&fixtures)
        .oneshot(post_json("/", &booking_body(&fixtures, 10, 0)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["appointment"]["status"], "pending");
    assert_eq!(body["appointment"]["duration_minutes"], 30);
}

#[tokio::test]
async fn conflicting_booking_maps_to_http_409() {
    let fixtures = seeded_store();

    let first = app(&fixtures)
        .oneshot(post_json("/", &booking_body(&fixtures, 10, 0)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app(&fixtures)
        .oneshot(post_json("/", &booking_body(&fixtures, 10, 15)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_appointment_maps_to_http_404() {
    let fixtures = seeded_store();

    let response = app(&fixtures)
        .oneshot(
            Request::builder()
                .uri(format!("/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_endpoint_reports_the_decision() {
    let fixtures = seeded_store();

    let uri = format!(
        "/availability?doctor_id={}&clinic_id={}&start_time={}&duration_minutes=30",
        fixtures.doctor_id,
        fixtures.clinic_id,
        urlencoded_instant(10, 0),
    );
    let response = app(&fixtures)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["decision"], "available");
}

#[tokio::test]
async fn invalid_duration_maps_to_http_400() {
    let fixtures = seeded_store();

    let uri = format!(
        "/availability?doctor_id={}&clinic_id={}&start_time={}&duration_minutes=0",
        fixtures.doctor_id,
        fixtures.clinic_id,
        urlencoded_instant(10, 0),
    );
    let response = app(&fixtures)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_endpoint_stamps_the_actor() {
    let fixtures = seeded_store();

    let booked = app(&fixtures)
        .oneshot(post_json("/", &booking_body(&fixtures, 10, 0)))
        .await
        .unwrap();
    let booked = response_json(booked).await;
    let id = booked["appointment"]["id"].as_str().unwrap().to_string();

    let response = app(&fixtures)
        .oneshot(post_json(
            &format!("/{}/cancel", id),
            &json!({ "cancelled_by": "patient", "reason": "travel" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["appointment"]["status"], "cancelled");
    assert_eq!(body["appointment"]["cancelled_by"], "patient");
}

fn urlencoded_instant(hour: u32, minute: u32) -> String {
    at(hour, minute)
        .to_rfc3339()
        .replace('+', "%2B")
        .replace(':', "%3A")
}
