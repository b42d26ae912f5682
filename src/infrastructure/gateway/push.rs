//! FCM-style push notification dispatcher

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::application::ports::NotificationDispatcher;
use crate::config::PushConfig;
use crate::shared::errors::GatewayError;

pub struct FcmPushDispatcher {
    client: Client,
    endpoint: String,
    server_key: String,
}

impl FcmPushDispatcher {
    pub fn new(cfg: &PushConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .expect("Failed to build push dispatcher HTTP client");

        Self {
            client,
            endpoint: cfg.endpoint.clone(),
            server_key: cfg.server_key.clone(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for FcmPushDispatcher {
    async fn send_notification_to_user(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<(), GatewayError> {
        let payload = json!({
            "to": token,
            "notification": {
                "title": title,
                "body": body,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(format!(
                "push endpoint responded {}",
                response.status()
            )));
        }

        debug!(title, "Push notification delivered");
        Ok(())
    }
}
