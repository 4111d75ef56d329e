use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::{booking_routes, BookingState};

mod common;
use common::{booking_row, fee_config_row, monday_config_row, test_config};

const MONDAY: &str = "2024-06-10";

fn app(mock_server: &MockServer) -> Router {
    booking_routes(BookingState::new(Arc::new(test_config(mock_server))))
}

#[tokio::test]
async fn create_booking_returns_created_record() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let dispensary_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            monday_config_row(doctor_id, dispensary_id)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_overrides"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_dispensary_fees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            fee_config_row(doctor_id, dispensary_id, 0.0, 150.0)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            booking_row(Uuid::new_v4(), doctor_id, dispensary_id, MONDAY, 1, "scheduled")
        ])))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "booking_date": MONDAY,
        "patient_name": "Test Patient",
        "patient_phone": "+94770000001",
        "booked_by": "ONLINE",
        "booked_user_id": Uuid::new_v4()
    });

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn full_session_maps_to_conflict() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let dispensary_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            monday_config_row(doctor_id, dispensary_id)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_overrides"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_dispensary_fees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            fee_config_row(doctor_id, dispensary_id, 0.0, 150.0)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(Uuid::new_v4(), doctor_id, dispensary_id, MONDAY, 1, "scheduled"),
            booking_row(Uuid::new_v4(), doctor_id, dispensary_id, MONDAY, 2, "scheduled"),
            booking_row(Uuid::new_v4(), doctor_id, dispensary_id, MONDAY, 3, "scheduled"),
            booking_row(Uuid::new_v4(), doctor_id, dispensary_id, MONDAY, 4, "scheduled"),
        ])))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "booking_date": MONDAY,
        "patient_name": "Test Patient",
        "patient_phone": "+94770000001",
        "booked_by": "ONLINE",
        "booked_user_id": Uuid::new_v4()
    });

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_transition_maps_to_bad_request() {
    let mock_server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, Uuid::new_v4(), Uuid::new_v4(), MONDAY, 1, "completed")
        ])))
        .mount(&mock_server)
        .await;

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/check-in", booking_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_booking_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn absence_maps_to_bad_request() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let dispensary_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            monday_config_row(doctor_id, dispensary_id)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_overrides"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "dispensary_id": dispensary_id,
            "date": MONDAY,
            "is_modified_session": false,
            "start_time": null,
            "end_time": null,
            "max_patients": null,
            "minutes_per_patient": null,
            "reason": "Personal leave",
            "created_at": "2024-06-01T00:00:00Z",
            "updated_at": "2024-06-01T00:00:00Z"
        }])))
        .mount(&mock_server)
        .await;

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/available-slots?doctor_id={}&dispensary_id={}&date={}",
                    doctor_id, dispensary_id, MONDAY
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
