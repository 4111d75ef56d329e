// libs/directory-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fee configuration for one doctor–dispensary pairing, maintained by
/// dispensary administration. `channel_partner_fee` is the amount a
/// channel partner earns per booking; it is funded out of
/// `booking_commission`, never added to the patient's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub doctor_id: Uuid,
    pub dispensary_id: Uuid,
    pub doctor_fee: f64,
    pub dispensary_fee: f64,
    pub channel_partner_fee: f64,
    pub booking_commission: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("Fee configuration not found for doctor {doctor_id} at dispensary {dispensary_id}")]
    NotConfigured {
        doctor_id: Uuid,
        dispensary_id: Uuid,
    },

    #[error("Store error: {0}")]
    StoreError(String),
}
