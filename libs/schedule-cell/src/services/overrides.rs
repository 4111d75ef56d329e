// libs/schedule-cell/src/services/overrides.rs
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{
    CreateScheduleOverrideRequest, ScheduleError, ScheduleOverride, UpdateScheduleOverrideRequest,
};

/// Store access and administrative CRUD for date-specific schedule
/// exceptions (absences and modified sessions).
pub struct ScheduleOverrideService {
    store: Arc<StoreClient>,
}

impl ScheduleOverrideService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateScheduleOverrideRequest,
    ) -> Result<ScheduleOverride, ScheduleError> {
        debug!(
            "Creating schedule override for doctor {} at dispensary {} on {}",
            request.doctor_id, request.dispensary_id, request.date
        );

        validate_override_shape(
            request.is_modified_session,
            request.start_time,
            request.end_time,
            request.max_patients,
            request.minutes_per_patient,
        )?;

        if self
            .get_for_date(request.doctor_id, request.dispensary_id, request.date)
            .await?
            .is_some()
        {
            return Err(ScheduleError::DuplicateOverride { date: request.date });
        }

        let now = Utc::now();
        let override_data = json!({
            "id": Uuid::new_v4(),
            "doctor_id": request.doctor_id,
            "dispensary_id": request.dispensary_id,
            "date": request.date.format("%Y-%m-%d").to_string(),
            "is_modified_session": request.is_modified_session,
            "start_time": request.start_time.map(|t| t.format("%H:%M:%S").to_string()),
            "end_time": request.end_time.map(|t| t.format("%H:%M:%S").to_string()),
            "max_patients": request.max_patients,
            "minutes_per_patient": request.minutes_per_patient,
            "reason": request.reason,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result: Vec<Value> = self
            .store
            .request_returning(Method::POST, "/rest/v1/schedule_overrides", Some(override_data))
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let created = result
            .first()
            .ok_or_else(|| ScheduleError::StoreError("Failed to create schedule override".to_string()))?;

        let session_override: ScheduleOverride = serde_json::from_value(created.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule override: {}", e)))?;

        info!(
            "Schedule override {} created for {} ({})",
            session_override.id,
            session_override.date,
            if session_override.is_modified_session {
                "modified session"
            } else {
                "absence"
            }
        );
        Ok(session_override)
    }

    pub async fn update(
        &self,
        override_id: Uuid,
        request: UpdateScheduleOverrideRequest,
    ) -> Result<ScheduleOverride, ScheduleError> {
        debug!("Updating schedule override {}", override_id);

        let current = self.get_by_id(override_id).await?;

        validate_override_shape(
            request.is_modified_session.unwrap_or(current.is_modified_session),
            request.start_time.or(current.start_time),
            request.end_time.or(current.end_time),
            request.max_patients.or(current.max_patients),
            request.minutes_per_patient.or(current.minutes_per_patient),
        )?;

        let mut update_data = serde_json::Map::new();
        if let Some(is_modified_session) = request.is_modified_session {
            update_data.insert("is_modified_session".to_string(), json!(is_modified_session));
        }
        if let Some(start_time) = request.start_time {
            update_data.insert(
                "start_time".to_string(),
                json!(start_time.format("%H:%M:%S").to_string()),
            );
        }
        if let Some(end_time) = request.end_time {
            update_data.insert(
                "end_time".to_string(),
                json!(end_time.format("%H:%M:%S").to_string()),
            );
        }
        if let Some(max_patients) = request.max_patients {
            update_data.insert("max_patients".to_string(), json!(max_patients));
        }
        if let Some(minutes_per_patient) = request.minutes_per_patient {
            update_data.insert("minutes_per_patient".to_string(), json!(minutes_per_patient));
        }
        if let Some(reason) = request.reason {
            update_data.insert("reason".to_string(), json!(reason));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/schedule_overrides?id=eq.{}", override_id);
        let result: Vec<Value> = self
            .store
            .request_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let updated = result
            .first()
            .ok_or_else(|| ScheduleError::NotFound(override_id.to_string()))?;

        serde_json::from_value(updated.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule override: {}", e)))
    }

    pub async fn delete(&self, override_id: Uuid) -> Result<(), ScheduleError> {
        debug!("Deleting schedule override {}", override_id);

        let path = format!("/rest/v1/schedule_overrides?id=eq.{}", override_id);
        let result: Vec<Value> = self
            .store
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        if result.is_empty() {
            return Err(ScheduleError::NotFound(override_id.to_string()));
        }

        info!("Schedule override {} deleted", override_id);
        Ok(())
    }

    pub async fn get_by_id(&self, override_id: Uuid) -> Result<ScheduleOverride, ScheduleError> {
        let path = format!("/rest/v1/schedule_overrides?id=eq.{}", override_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let row = result
            .first()
            .ok_or_else(|| ScheduleError::NotFound(override_id.to_string()))?;

        serde_json::from_value(row.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule override: {}", e)))
    }

    /// Exception for one (doctor, dispensary, date), if any.
    pub async fn get_for_date(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<ScheduleOverride>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_overrides?doctor_id=eq.{}&dispensary_id=eq.{}&date=eq.{}",
            doctor_id,
            dispensary_id,
            date.format("%Y-%m-%d")
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        match result.first() {
            Some(row) => {
                let session_override: ScheduleOverride =
                    serde_json::from_value(row.clone()).map_err(|e| {
                        ScheduleError::StoreError(format!("Failed to parse schedule override: {}", e))
                    })?;
                Ok(Some(session_override))
            }
            None => Ok(None),
        }
    }

    pub async fn list_for_pair(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
    ) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_overrides?doctor_id=eq.{}&dispensary_id=eq.{}&order=date.asc",
            doctor_id, dispensary_id
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    ScheduleError::StoreError(format!("Failed to parse schedule override: {}", e))
                })
            })
            .collect()
    }
}

fn validate_override_shape(
    is_modified_session: bool,
    start_time: Option<chrono::NaiveTime>,
    end_time: Option<chrono::NaiveTime>,
    max_patients: Option<i32>,
    minutes_per_patient: Option<i32>,
) -> Result<(), ScheduleError> {
    if !is_modified_session {
        // Full absence carries no session fields worth validating.
        return Ok(());
    }
    if let (Some(start), Some(end)) = (start_time, end_time) {
        if start >= end {
            return Err(ScheduleError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }
    }
    if let Some(max_patients) = max_patients {
        if max_patients <= 0 {
            return Err(ScheduleError::ValidationError(
                "Max patients must be positive".to_string(),
            ));
        }
    }
    if let Some(minutes_per_patient) = minutes_per_patient {
        if minutes_per_patient <= 0 {
            return Err(ScheduleError::ValidationError(
                "Minutes per patient must be positive".to_string(),
            ));
        }
    }
    Ok(())
}
