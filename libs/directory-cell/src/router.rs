// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn directory_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/fees/{doctor_id}/{dispensary_id}", get(handlers::get_fee_config))
        .with_state(state)
}
