// libs/notification-cell/src/services/dispatcher.rs
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{NotificationRequest, NotificationTemplate};

/// Fire-and-forget glue to the outbound notification service. Delivery
/// failures are logged and never propagated; a booking that committed
/// stays committed whatever happens here.
pub struct NotificationDispatcher {
    client: Client,
    service_url: String,
    api_key: String,
}

impl NotificationDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            service_url: config.notification_service_url.clone(),
            api_key: config.notification_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.service_url.is_empty()
    }

    /// Send one notification, reporting failure only through the log.
    pub async fn dispatch(&self, recipient: &str, template: NotificationTemplate, data: Value) {
        if !self.is_configured() {
            debug!("Notification service not configured, skipping {} to {}", template, recipient);
            return;
        }

        let request = NotificationRequest {
            recipient: recipient.to_string(),
            template,
            data,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let url = format!("{}/v1/notifications", self.service_url);
        match self.client.post(&url).headers(headers).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Notification {} dispatched to {}", template, recipient);
            }
            Ok(response) => {
                warn!(
                    "Notification service rejected {} to {}: {}",
                    template,
                    recipient,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Failed to dispatch {} to {}: {}", template, recipient, e);
            }
        }
    }

    /// Dispatch on a background task so the caller never waits on the
    /// notification service.
    pub fn dispatch_detached(self: &Arc<Self>, recipient: String, template: NotificationTemplate, data: Value) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            dispatcher.dispatch(&recipient, template, data).await;
        });
    }
}
