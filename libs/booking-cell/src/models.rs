// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use schedule_cell::ScheduleError;
use shared_models::BookedBy;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// One day's bookable session for a doctor at a dispensary. The unit of
/// mutual exclusion for slot allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.doctor_id, self.dispensary_id, self.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub booking_date: NaiveDate,
    pub appointment_number: i32,
    pub estimated_time: String,
    pub time_slot: String,
    pub status: BookingStatus,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub notes: Option<String>,
    pub fees: FeeBreakdown,
    pub booked_by: BookedBy,
    pub booked_user_id: Uuid,
    pub transaction_id: String,
    pub checked_in_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
    pub is_patient_visited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn session_key(&self) -> SessionKey {
        SessionKey {
            doctor_id: self.doctor_id,
            dispensary_id: self.dispensary_id,
            date: self.booking_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    CheckedIn,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Scheduled => write!(f, "scheduled"),
            BookingStatus::CheckedIn => write!(f, "checked_in"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Final fee split written with the booking. `total_fee` is always
/// recomputed server-side from the four components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub doctor_fee: f64,
    pub dispensary_fee: f64,
    pub channel_partner_fee: f64,
    pub booking_commission: f64,
    pub total_fee: f64,
}

impl FeeBreakdown {
    pub fn zero() -> Self {
        Self {
            doctor_fee: 0.0,
            dispensary_fee: 0.0,
            channel_partner_fee: 0.0,
            booking_commission: 0.0,
            total_fee: 0.0,
        }
    }
}

/// Output of slot allocation: the assigned 1-based number and its
/// estimated time window within the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub appointment_number: i32,
    pub estimated_time: String,
    pub time_slot: String,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub booking_date: NaiveDate,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub notes: Option<String>,
    pub booked_by: BookedBy,
    pub booked_user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustBookingRequest {
    pub new_date: NaiveDate,
    pub new_doctor_id: Option<Uuid>,
    pub new_dispensary_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<SlotAssignment>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Session for doctor {doctor_id} at dispensary {dispensary_id} on {date} is full ({max_patients} patients)")]
    SessionFull {
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: NaiveDate,
        max_patients: i32,
    },

    #[error("Booking {booking_id} cannot {action} from status {from}")]
    InvalidTransition {
        booking_id: Uuid,
        from: BookingStatus,
        action: String,
    },

    #[error("Booking not found: {booking_id}")]
    BookingNotFound { booking_id: Uuid },

    #[error("Concurrent allocation conflict for doctor {doctor_id} at dispensary {dispensary_id} on {date}, appointment number {appointment_number}")]
    ConcurrentAllocationConflict {
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: NaiveDate,
        appointment_number: i32,
    },

    #[error("Store error: {0}")]
    StoreError(String),
}
