// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Weekly templates
        .route("/configs", post(handlers::create_schedule_config))
        .route("/configs", get(handlers::list_schedule_configs))
        .route("/configs/{config_id}", patch(handlers::update_schedule_config))
        .route("/configs/{config_id}", delete(handlers::delete_schedule_config))
        // Date-specific exceptions
        .route("/overrides", post(handlers::create_schedule_override))
        .route("/overrides", get(handlers::list_schedule_overrides))
        .route("/overrides/{override_id}", patch(handlers::update_schedule_override))
        .route("/overrides/{override_id}", delete(handlers::delete_schedule_override))
        // Resolution
        .route("/effective-session", get(handlers::get_effective_session))
        .with_state(state)
}
