// libs/schedule-cell/src/services/resolver.rs
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{EffectiveSession, ScheduleError};
use crate::services::config::ScheduleConfigService;
use crate::services::overrides::ScheduleOverrideService;

/// Resolves the operating parameters of one (doctor, dispensary, date)
/// session: weekly template, overridden by any date-specific exception.
/// Read-only and deterministic for a given snapshot of the two stores.
pub struct SessionResolver {
    configs: ScheduleConfigService,
    overrides: ScheduleOverrideService,
}

impl SessionResolver {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self {
            configs: ScheduleConfigService::new(Arc::clone(&store)),
            overrides: ScheduleOverrideService::new(store),
        }
    }

    pub async fn resolve(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: NaiveDate,
    ) -> Result<EffectiveSession, ScheduleError> {
        let day_of_week = date.weekday().num_days_from_sunday() as u8;
        debug!(
            "Resolving session for doctor {} at dispensary {} on {} (weekday {})",
            doctor_id, dispensary_id, date, day_of_week
        );

        let config = self
            .configs
            .get_for_day(doctor_id, dispensary_id, day_of_week)
            .await?
            .ok_or(ScheduleError::NoScheduleConfigured {
                doctor_id,
                dispensary_id,
                day_of_week,
            })?;

        match self
            .overrides
            .get_for_date(doctor_id, dispensary_id, date)
            .await?
        {
            Some(session_override) if !session_override.is_modified_session => {
                Err(ScheduleError::DoctorAbsent {
                    doctor_id,
                    dispensary_id,
                    date,
                    reason: session_override.reason,
                })
            }
            Some(session_override) => Ok(EffectiveSession::merged(&config, &session_override)),
            None => Ok(EffectiveSession::from_config(&config)),
        }
    }
}
