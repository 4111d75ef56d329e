use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::{booking_routes, BookingState};
use directory_cell::router::directory_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let booking_state = BookingState::new(state.clone());

    Router::new()
        .route("/", get(|| async { "MediBook API is running!" }))
        .nest("/schedules", schedule_routes(state.clone()))
        .nest("/directory", directory_routes(state.clone()))
        .nest("/bookings", booking_routes(booking_state))
}
