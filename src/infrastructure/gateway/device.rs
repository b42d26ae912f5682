//! HTTP implementation of the device gateway
//!
//! Edge servers expose a small REST endpoint on site; spot provisioning
//! and status changes are forwarded to them as JSON.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::DeviceGateway;
use crate::config::DeviceGatewayConfig;
use crate::domain::parking::{SpotStatus, SpotStatusChange};
use crate::shared::errors::GatewayError;

pub struct HttpDeviceGateway {
    client: Client,
    base_url: String,
}

impl HttpDeviceGateway {
    pub fn new(cfg: &DeviceGatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .expect("Failed to build device gateway HTTP client");

        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, edge_server_id: Uuid, path: &str) -> String {
        format!("{}/edge/{}/{}", self.base_url, edge_server_id, path)
    }

    async fn post(&self, url: String, body: serde_json::Value) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(format!(
                "{} responded {}",
                url,
                response.status()
            )));
        }

        debug!(url = %url, "Device gateway request delivered");
        Ok(())
    }
}

fn transport_err(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

#[async_trait]
impl DeviceGateway for HttpDeviceGateway {
    async fn create_device(
        &self,
        lot_id: i64,
        spot_id: Uuid,
        status: SpotStatus,
        label: &str,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(edge_server_id, "devices");
        let body = json!({
            "parking_id": lot_id,
            "spot_id": spot_id,
            "status": status.as_str(),
            "label": label,
        });
        self.post(url, body).await
    }

    async fn publish_spot_status(
        &self,
        lot_id: i64,
        change: &SpotStatusChange,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(edge_server_id, &format!("devices/{}/status", change.spot_id));
        let body = json!({
            "parking_id": lot_id,
            "label": change.label,
            "old_status": change.previous.as_str(),
            "new_status": change.current.as_str(),
        });
        self.post(url, body).await
    }
}
