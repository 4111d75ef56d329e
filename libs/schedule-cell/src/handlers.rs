// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;
use shared_models::error::AppError;

use crate::models::{
    CreateScheduleConfigRequest, CreateScheduleOverrideRequest, ScheduleError,
    UpdateScheduleConfigRequest, UpdateScheduleOverrideRequest,
};
use crate::services::{ScheduleConfigService, ScheduleOverrideService, SessionResolver};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SchedulePairQuery {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EffectiveSessionQuery {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
}

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::NoScheduleConfigured { .. } => AppError::NotFound(e.to_string()),
        ScheduleError::DoctorAbsent { .. } => AppError::BadRequest(e.to_string()),
        ScheduleError::DuplicateConfig { .. } | ScheduleError::DuplicateOverride { .. } => {
            AppError::Conflict(e.to_string())
        }
        ScheduleError::NotFound(msg) => AppError::NotFound(msg),
        ScheduleError::ValidationError(msg) => AppError::ValidationError(msg),
        ScheduleError::StoreError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// SCHEDULE CONFIG HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_schedule_config(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateScheduleConfigRequest>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleConfigService::new(store);

    let config = service.create(request).await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_config": config
    })))
}

#[axum::debug_handler]
pub async fn list_schedule_configs(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SchedulePairQuery>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleConfigService::new(store);

    let configs = service
        .list_for_pair(query.doctor_id, query.dispensary_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_configs": configs
    })))
}

#[axum::debug_handler]
pub async fn update_schedule_config(
    State(state): State<Arc<AppConfig>>,
    Path(config_id): Path<Uuid>,
    Json(request): Json<UpdateScheduleConfigRequest>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleConfigService::new(store);

    let config = service
        .update(config_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_config": config
    })))
}

#[axum::debug_handler]
pub async fn delete_schedule_config(
    State(state): State<Arc<AppConfig>>,
    Path(config_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleConfigService::new(store);

    service.delete(config_id).await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Schedule config deleted"
    })))
}

// ==============================================================================
// SCHEDULE OVERRIDE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_schedule_override(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateScheduleOverrideRequest>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleOverrideService::new(store);

    let session_override = service.create(request).await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_override": session_override
    })))
}

#[axum::debug_handler]
pub async fn list_schedule_overrides(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SchedulePairQuery>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleOverrideService::new(store);

    let overrides = service
        .list_for_pair(query.doctor_id, query.dispensary_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_overrides": overrides
    })))
}

#[axum::debug_handler]
pub async fn update_schedule_override(
    State(state): State<Arc<AppConfig>>,
    Path(override_id): Path<Uuid>,
    Json(request): Json<UpdateScheduleOverrideRequest>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleOverrideService::new(store);

    let session_override = service
        .update(override_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule_override": session_override
    })))
}

#[axum::debug_handler]
pub async fn delete_schedule_override(
    State(state): State<Arc<AppConfig>>,
    Path(override_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let service = ScheduleOverrideService::new(store);

    service.delete(override_id).await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Schedule override deleted"
    })))
}

// ==============================================================================
// SESSION RESOLUTION HANDLER
// ==============================================================================

#[axum::debug_handler]
pub async fn get_effective_session(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<EffectiveSessionQuery>,
) -> Result<Json<Value>, AppError> {
    let store = Arc::new(StoreClient::new(&state));
    let resolver = SessionResolver::new(store);

    let session = resolver
        .resolve(query.doctor_id, query.dispensary_id, query.date)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "effective_session": session
    })))
}
