// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;
use shared_models::error::AppError;

use crate::models::DirectoryError;
use crate::services::fees::FeeConfigService;

#[axum::debug_handler]
pub async fn get_fee_config(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, dispensary_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = FeeConfigService::new(store);

    let config = service
        .require(doctor_id, dispensary_id)
        .await
        .map_err(|e| match e {
            DirectoryError::NotConfigured { .. } => AppError::NotFound(e.to_string()),
            DirectoryError::StoreError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "fee_config": config
    })))
}
