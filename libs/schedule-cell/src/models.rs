// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// SCHEDULE MODELS
// ==============================================================================

/// Recurring weekly session template for a doctor at a dispensary.
/// One row per (doctor, dispensary, day_of_week); day_of_week runs
/// 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
    pub minutes_per_patient: i32,
    pub booking_cutover_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Date-specific exception to the weekly template. At most one per
/// (doctor, dispensary, date). `is_modified_session == false` means the
/// doctor is absent that day; `true` means a modified session where any
/// unset field falls back to the weekly config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
    pub is_modified_session: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_patients: Option<i32>,
    pub minutes_per_patient: Option<i32>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved operating parameters for one (doctor, dispensary, date)
/// session after applying any override to the weekly config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSession {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
    pub minutes_per_patient: i32,
    pub booking_cutover_minutes: i32,
}

impl EffectiveSession {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            start_time: config.start_time,
            end_time: config.end_time,
            max_patients: config.max_patients,
            minutes_per_patient: config.minutes_per_patient,
            booking_cutover_minutes: config.booking_cutover_minutes,
        }
    }

    /// Field-wise merge for a modified session: the override wins where it
    /// is set, the weekly config fills the rest.
    pub fn merged(config: &ScheduleConfig, session_override: &ScheduleOverride) -> Self {
        Self {
            start_time: session_override.start_time.unwrap_or(config.start_time),
            end_time: session_override.end_time.unwrap_or(config.end_time),
            max_patients: session_override.max_patients.unwrap_or(config.max_patients),
            minutes_per_patient: session_override
                .minutes_per_patient
                .unwrap_or(config.minutes_per_patient),
            booking_cutover_minutes: config.booking_cutover_minutes,
        }
    }

    pub fn session_length_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

fn default_minutes_per_patient() -> i32 {
    15
}

fn default_booking_cutover_minutes() -> i32 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleConfigRequest {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
    #[serde(default = "default_minutes_per_patient")]
    pub minutes_per_patient: i32,
    #[serde(default = "default_booking_cutover_minutes")]
    pub booking_cutover_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleConfigRequest {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_patients: Option<i32>,
    pub minutes_per_patient: Option<i32>,
    pub booking_cutover_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleOverrideRequest {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
    pub is_modified_session: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_patients: Option<i32>,
    pub minutes_per_patient: Option<i32>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleOverrideRequest {
    pub is_modified_session: Option<bool>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_patients: Option<i32>,
    pub minutes_per_patient: Option<i32>,
    pub reason: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("No schedule configured for doctor {doctor_id} at dispensary {dispensary_id} on weekday {day_of_week}")]
    NoScheduleConfigured {
        doctor_id: Uuid,
        dispensary_id: Uuid,
        day_of_week: u8,
    },

    #[error("Doctor {doctor_id} is absent at dispensary {dispensary_id} on {date}")]
    DoctorAbsent {
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: NaiveDate,
        reason: Option<String>,
    },

    #[error("Schedule already exists for weekday {day_of_week}")]
    DuplicateConfig { day_of_week: u8 },

    #[error("Override already exists for {date}")]
    DuplicateOverride { date: NaiveDate },

    #[error("Schedule record not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),
}
