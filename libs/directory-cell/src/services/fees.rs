// libs/directory-cell/src/services/fees.rs
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{DirectoryError, FeeConfig};

/// Read-only lookup of the doctor–dispensary fee configuration.
/// "Not configured" (None) is distinct from a configuration of all-zero
/// fees; callers decide how to treat the former.
pub struct FeeConfigService {
    store: Arc<StoreClient>,
}

impl FeeConfigService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn lookup(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
    ) -> Result<Option<FeeConfig>, DirectoryError> {
        debug!(
            "Looking up fee config for doctor {} at dispensary {}",
            doctor_id, dispensary_id
        );

        let path = format!(
            "/rest/v1/doctor_dispensary_fees?doctor_id=eq.{}&dispensary_id=eq.{}",
            doctor_id, dispensary_id
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DirectoryError::StoreError(e.to_string()))?;

        match result.first() {
            Some(row) => {
                let config: FeeConfig = serde_json::from_value(row.clone())
                    .map_err(|e| DirectoryError::StoreError(format!("Failed to parse fee config: {}", e)))?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    /// Lookup that fails when no configuration exists, for callers that
    /// must distinguish the two cases at the API edge.
    pub async fn require(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
    ) -> Result<FeeConfig, DirectoryError> {
        self.lookup(doctor_id, dispensary_id)
            .await?
            .ok_or(DirectoryError::NotConfigured {
                doctor_id,
                dispensary_id,
            })
    }
}
