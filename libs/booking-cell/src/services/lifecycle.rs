// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{BookingError, BookingStatus};

/// Booking status state machine.
pub struct BookingLifecycleService;

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// All valid next statuses for a given current status. The
    /// cancelled → scheduled edge exists solely for the audited
    /// payment-reversal reinstatement.
    pub fn valid_transitions(&self, current: &BookingStatus) -> Vec<BookingStatus> {
        match current {
            BookingStatus::Scheduled => vec![
                BookingStatus::CheckedIn,
                BookingStatus::Cancelled,
                BookingStatus::NoShow,
            ],
            BookingStatus::CheckedIn => vec![BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Cancelled => vec![BookingStatus::Scheduled],
            // Terminal states
            BookingStatus::Completed => vec![],
            BookingStatus::NoShow => vec![],
        }
    }

    pub fn validate_transition(
        &self,
        booking_id: Uuid,
        current: &BookingStatus,
        next: &BookingStatus,
        action: &str,
    ) -> Result<(), BookingError> {
        debug!("Validating transition {} -> {} for booking {}", current, next, booking_id);

        if !self.valid_transitions(current).contains(next) {
            warn!(
                "Invalid transition attempted on booking {}: {} -> {}",
                booking_id, current, next
            );
            return Err(BookingError::InvalidTransition {
                booking_id,
                from: *current,
                action: action.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for BookingLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
