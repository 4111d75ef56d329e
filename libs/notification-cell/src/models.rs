// libs/notification-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message templates the delivery service knows how to render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    BookingConfirmed,
    BookingCheckedIn,
    BookingCancelled,
}

impl fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationTemplate::BookingConfirmed => write!(f, "booking_confirmed"),
            NotificationTemplate::BookingCheckedIn => write!(f, "booking_checked_in"),
            NotificationTemplate::BookingCancelled => write!(f, "booking_cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub template: NotificationTemplate,
    pub data: serde_json::Value,
}
