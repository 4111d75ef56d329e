// libs/booking-cell/src/services/store.rs
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{Booking, BookingError, SessionKey};

/// Typed access to the bookings collection. Bookings are never
/// physically deleted through the public flows; `remove` exists only to
/// roll back a write that lost the allocation race.
pub struct BookingStore {
    store: Arc<StoreClient>,
}

impl BookingStore {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, booking: &Booking) -> Result<Booking, BookingError> {
        debug!("Inserting booking {} for session {}", booking.id, booking.session_key());

        let body = serde_json::to_value(booking)
            .map_err(|e| BookingError::StoreError(format!("Failed to serialize booking: {}", e)))?;

        let result: Vec<Value> = self
            .store
            .request_returning(Method::POST, "/rest/v1/bookings", Some(body))
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;

        let created = result
            .first()
            .ok_or_else(|| BookingError::StoreError("Failed to create booking".to_string()))?;

        parse_booking(created)
    }

    pub async fn get(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;

        let row = result
            .first()
            .ok_or(BookingError::BookingNotFound { booking_id })?;

        parse_booking(row)
    }

    pub async fn update(&self, booking_id: Uuid, fields: Value) -> Result<Booking, BookingError> {
        debug!("Updating booking {}", booking_id);

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let result: Vec<Value> = self
            .store
            .request_returning(Method::PATCH, &path, Some(fields))
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;

        let updated = result
            .first()
            .ok_or(BookingError::BookingNotFound { booking_id })?;

        parse_booking(updated)
    }

    /// Rollback of an insert that lost the allocation race. Not part of
    /// any public flow.
    pub async fn remove(&self, booking_id: Uuid) -> Result<(), BookingError> {
        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let _: Vec<Value> = self
            .store
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;
        Ok(())
    }

    /// All non-cancelled bookings for one session, the allocator's view
    /// of the occupied numbers.
    pub async fn active_for_session(&self, key: &SessionKey) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?doctor_id=eq.{}&dispensary_id=eq.{}&booking_date=eq.{}&status=neq.cancelled&order=appointment_number.asc",
            key.doctor_id,
            key.dispensary_id,
            key.date.format("%Y-%m-%d")
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;

        result.iter().map(parse_booking).collect()
    }

    /// Non-cancelled holders of one appointment number in one session.
    /// The post-write uniqueness probe; more than one holder means an
    /// allocation race slipped past serialization.
    pub async fn slot_holders(
        &self,
        key: &SessionKey,
        appointment_number: i32,
    ) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?doctor_id=eq.{}&dispensary_id=eq.{}&booking_date=eq.{}&appointment_number=eq.{}&status=neq.cancelled",
            key.doctor_id,
            key.dispensary_id,
            key.date.format("%Y-%m-%d"),
            appointment_number
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::StoreError(e.to_string()))?;

        result.iter().map(parse_booking).collect()
    }
}

fn parse_booking(row: &Value) -> Result<Booking, BookingError> {
    serde_json::from_value(row.clone())
        .map_err(|e| BookingError::StoreError(format!("Failed to parse booking: {}", e)))
}
