// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;
use crate::services::locks::SessionLockRegistry;

/// Shared state for the booking routes: configuration plus the
/// process-wide session lock registry. The registry must outlive any
/// single request, so it lives here rather than inside the per-request
/// service.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub locks: Arc<SessionLockRegistry>,
}

impl BookingState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            locks: Arc::new(SessionLockRegistry::new()),
        }
    }
}

pub fn booking_routes(state: BookingState) -> Router {
    Router::new()
        .route("/", post(handlers::create_booking))
        .route("/available-slots", get(handlers::list_available_slots))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/check-in", post(handlers::check_in_booking))
        .route("/{booking_id}/complete", post(handlers::complete_booking))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/{booking_id}/no-show", post(handlers::mark_booking_no_show))
        .route("/{booking_id}/adjust", patch(handlers::adjust_booking))
        .route("/{booking_id}/reinstate", post(handlers::reinstate_booking))
        .with_state(state)
}
