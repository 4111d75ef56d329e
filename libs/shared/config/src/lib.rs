use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_service_key: String,
    pub notification_service_url: String,
    pub notification_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("STORE_URL not set, using empty value");
                    String::new()
                }),
            store_service_key: env::var("STORE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("STORE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            notification_service_url: env::var("NOTIFICATION_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("NOTIFICATION_SERVICE_URL not set, notifications disabled");
                    String::new()
                }),
            notification_api_key: env::var("NOTIFICATION_API_KEY")
                .unwrap_or_else(|_| String::new()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_service_key.is_empty()
    }

    pub fn is_notifications_configured(&self) -> bool {
        !self.notification_service_url.is_empty()
    }
}
