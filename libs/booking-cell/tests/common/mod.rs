// Shared fixtures for the booking-cell integration tests: a config
// pointing at the wiremock server and store-row builders matching the
// document shapes the services parse.
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

use shared_config::AppConfig;

pub fn test_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        store_url: mock_server.uri(),
        store_service_key: "test-service-key".to_string(),
        notification_service_url: String::new(),
        notification_api_key: String::new(),
    }
}

/// Weekly template row: Mondays 09:00-11:00, 4 patients at 30 minutes.
pub fn monday_config_row(doctor_id: Uuid, dispensary_id: Uuid) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "day_of_week": 1,
        "start_time": "09:00:00",
        "end_time": "11:00:00",
        "max_patients": 4,
        "minutes_per_patient": 30,
        "booking_cutover_minutes": 60,
        "created_at": "2024-06-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z"
    })
}

pub fn override_row(doctor_id: Uuid, dispensary_id: Uuid, date: &str, is_modified: bool, max_patients: Option<i32>) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "date": date,
        "is_modified_session": is_modified,
        "start_time": null,
        "end_time": null,
        "max_patients": max_patients,
        "minutes_per_patient": null,
        "reason": if is_modified { Value::Null } else { json!("Personal leave") },
        "created_at": "2024-06-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z"
    })
}

pub fn fee_config_row(doctor_id: Uuid, dispensary_id: Uuid, channel_partner_fee: f64, booking_commission: f64) -> Value {
    json!({
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "doctor_fee": 1500.0,
        "dispensary_fee": 300.0,
        "channel_partner_fee": channel_partner_fee,
        "booking_commission": booking_commission
    })
}

pub fn booking_row(
    id: Uuid,
    doctor_id: Uuid,
    dispensary_id: Uuid,
    date: &str,
    appointment_number: i32,
    status: &str,
) -> Value {
    json!({
        "id": id,
        "doctor_id": doctor_id,
        "dispensary_id": dispensary_id,
        "booking_date": date,
        "appointment_number": appointment_number,
        "estimated_time": "09:00",
        "time_slot": "09:00-09:30",
        "status": status,
        "patient_name": "Test Patient",
        "patient_phone": "+94770000001",
        "patient_email": null,
        "notes": null,
        "fees": {
            "doctor_fee": 1500.0,
            "dispensary_fee": 300.0,
            "channel_partner_fee": 0.0,
            "booking_commission": 150.0,
            "total_fee": 1950.0
        },
        "booked_by": "ONLINE",
        "booked_user_id": Uuid::new_v4(),
        "transaction_id": "TRX-1718000000000-042",
        "checked_in_time": null,
        "completed_time": null,
        "is_patient_visited": false,
        "created_at": "2024-06-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z"
    })
}
