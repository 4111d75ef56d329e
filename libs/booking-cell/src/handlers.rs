// libs/booking-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use schedule_cell::ScheduleError;
use shared_models::error::AppError;

use crate::models::{AdjustBookingRequest, BookingError, CancelBookingRequest, CreateBookingRequest};
use crate::router::BookingState;
use crate::services::booking::BookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub date: NaiveDate,
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::Schedule(inner) => match &inner {
            ScheduleError::NoScheduleConfigured { .. } => AppError::NotFound(inner.to_string()),
            ScheduleError::DoctorAbsent { .. } => AppError::BadRequest(inner.to_string()),
            ScheduleError::StoreError(msg) => AppError::Database(msg.clone()),
            _ => AppError::BadRequest(inner.to_string()),
        },
        BookingError::SessionFull { .. } => AppError::Conflict(e.to_string()),
        BookingError::ConcurrentAllocationConflict { .. } => AppError::Conflict(e.to_string()),
        BookingError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
        BookingError::BookingNotFound { .. } => AppError::NotFound(e.to_string()),
        BookingError::StoreError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<BookingState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.create(request).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.get(booking_id).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn check_in_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.check_in(booking_id).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.complete(booking_id).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service
        .cancel(booking_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn mark_booking_no_show(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.mark_no_show(booking_id).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn adjust_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<AdjustBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service
        .adjust(booking_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn reinstate_booking(
    State(state): State<BookingState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let booking = service.reinstate(booking_id).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<BookingState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state.config, state.locks.clone());

    let response = service
        .list_available_slots(query.doctor_id, query.dispensary_id, query.date)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "available_slots": response
    })))
}
