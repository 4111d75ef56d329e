// libs/schedule-cell/src/services/config.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{
    CreateScheduleConfigRequest, ScheduleConfig, ScheduleError, UpdateScheduleConfigRequest,
};

/// Store access and administrative CRUD for the recurring weekly
/// schedule templates. The booking core reads these through
/// `SessionResolver`; edits never touch already-issued bookings.
pub struct ScheduleConfigService {
    store: Arc<StoreClient>,
}

impl ScheduleConfigService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateScheduleConfigRequest,
    ) -> Result<ScheduleConfig, ScheduleError> {
        debug!(
            "Creating schedule config for doctor {} at dispensary {} on weekday {}",
            request.doctor_id, request.dispensary_id, request.day_of_week
        );

        validate_session_shape(
            request.day_of_week,
            request.start_time,
            request.end_time,
            request.max_patients,
            request.minutes_per_patient,
            request.booking_cutover_minutes,
        )?;

        if self
            .get_for_day(request.doctor_id, request.dispensary_id, request.day_of_week)
            .await?
            .is_some()
        {
            return Err(ScheduleError::DuplicateConfig {
                day_of_week: request.day_of_week,
            });
        }

        let now = Utc::now();
        let config_data = json!({
            "id": Uuid::new_v4(),
            "doctor_id": request.doctor_id,
            "dispensary_id": request.dispensary_id,
            "day_of_week": request.day_of_week,
            "start_time": request.start_time.format("%H:%M:%S").to_string(),
            "end_time": request.end_time.format("%H:%M:%S").to_string(),
            "max_patients": request.max_patients,
            "minutes_per_patient": request.minutes_per_patient,
            "booking_cutover_minutes": request.booking_cutover_minutes,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result: Vec<Value> = self
            .store
            .request_returning(Method::POST, "/rest/v1/schedule_configs", Some(config_data))
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let created = result
            .first()
            .ok_or_else(|| ScheduleError::StoreError("Failed to create schedule config".to_string()))?;

        let config: ScheduleConfig = serde_json::from_value(created.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule config: {}", e)))?;

        info!("Schedule config {} created", config.id);
        Ok(config)
    }

    pub async fn update(
        &self,
        config_id: Uuid,
        request: UpdateScheduleConfigRequest,
    ) -> Result<ScheduleConfig, ScheduleError> {
        debug!("Updating schedule config {}", config_id);

        let current = self.get_by_id(config_id).await?;

        let start_time = request.start_time.unwrap_or(current.start_time);
        let end_time = request.end_time.unwrap_or(current.end_time);
        validate_session_shape(
            current.day_of_week,
            start_time,
            end_time,
            request.max_patients.unwrap_or(current.max_patients),
            request.minutes_per_patient.unwrap_or(current.minutes_per_patient),
            request
                .booking_cutover_minutes
                .unwrap_or(current.booking_cutover_minutes),
        )?;

        let mut update_data = serde_json::Map::new();
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
        if let Some(cutover) = request.booking_cutover_minutes {
            update_data.insert("booking_cutover_minutes".to_string(), json!(cutover));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/schedule_configs?id=eq.{}", config_id);
        let result: Vec<Value> = self
            .store
            .request_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let updated = result
            .first()
            .ok_or_else(|| ScheduleError::NotFound(config_id.to_string()))?;

        serde_json::from_value(updated.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule config: {}", e)))
    }

    pub async fn delete(&self, config_id: Uuid) -> Result<(), ScheduleError> {
        debug!("Deleting schedule config {}", config_id);

        let path = format!("/rest/v1/schedule_configs?id=eq.{}", config_id);
        let result: Vec<Value> = self
            .store
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        if result.is_empty() {
            return Err(ScheduleError::NotFound(config_id.to_string()));
        }

        info!("Schedule config {} deleted", config_id);
        Ok(())
    }

    pub async fn get_by_id(&self, config_id: Uuid) -> Result<ScheduleConfig, ScheduleError> {
        let path = format!("/rest/v1/schedule_configs?id=eq.{}", config_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        let row = result
            .first()
            .ok_or_else(|| ScheduleError::NotFound(config_id.to_string()))?;

        serde_json::from_value(row.clone())
            .map_err(|e| ScheduleError::StoreError(format!("Failed to parse schedule config: {}", e)))
    }

    /// Weekly template for one (doctor, dispensary, day-of-week), if any.
    pub async fn get_for_day(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<ScheduleConfig>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_configs?doctor_id=eq.{}&dispensary_id=eq.{}&day_of_week=eq.{}",
            doctor_id, dispensary_id, day_of_week
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::StoreError(e.to_string()))?;

        match result.first() {
            Some(row) => {
                let config: ScheduleConfig = serde_json::from_value(row.clone()).map_err(|e| {
                    ScheduleError::StoreError(format!("Failed to parse schedule config: {}", e))
                })?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    pub async fn list_for_pair(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
    ) -> Result<Vec<ScheduleConfig>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_configs?doctor_id=eq.{}&dispensary_id=eq.{}&order=day_of_week.asc",
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
                    ScheduleError::StoreError(format!("Failed to parse schedule config: {}", e))
                })
            })
            .collect()
    }
}

fn validate_session_shape(
    day_of_week: u8,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
    max_patients: i32,
    minutes_per_patient: i32,
    booking_cutover_minutes: i32,
) -> Result<(), ScheduleError> {
    if day_of_week > 6 {
        return Err(ScheduleError::ValidationError(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }
    if start_time >= end_time {
        return Err(ScheduleError::ValidationError(
            "Start time must be before end time".to_string(),
        ));
    }
    if max_patients <= 0 {
        return Err(ScheduleError::ValidationError(
            "Max patients must be positive".to_string(),
        ));
    }
    if minutes_per_patient <= 0 {
        return Err(ScheduleError::ValidationError(
            "Minutes per patient must be positive".to_string(),
        ));
    }
    if booking_cutover_minutes < 0 {
        return Err(ScheduleError::ValidationError(
            "Booking cutover minutes cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn rejects_inverted_time_range() {
        let result = validate_session_shape(
            1,
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            4,
            30,
            60,
        );
        assert!(matches!(result, Err(ScheduleError::ValidationError(_))));
    }

    #[test]
    fn rejects_out_of_range_weekday() {
        let result = validate_session_shape(
            7,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            4,
            30,
            60,
        );
        assert!(matches!(result, Err(ScheduleError::ValidationError(_))));
    }

    #[test]
    fn rejects_non_positive_capacity() {
        let result = validate_session_shape(
            1,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            0,
            30,
            60,
        );
        assert!(matches!(result, Err(ScheduleError::ValidationError(_))));
    }
}
