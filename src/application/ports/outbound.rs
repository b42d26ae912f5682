//! Outbound ports: interfaces toward edge hardware and driver devices
//!
//! These traits are the architectural contract that decouples the
//! application services from the concrete delivery transports. Production
//! implementations live in [`crate::infrastructure::gateway`]; tests plug
//! in recording doubles.
//!
//! Both ports are best-effort: a failure is logged by the caller and never
//! rolls back committed domain state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::parking::{SpotStatus, SpotStatusChange};
use crate::shared::errors::GatewayError;

/// Port toward the edge servers that drive physical spot hardware.
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Announce a freshly registered spot to its lot's edge server so the
    /// matching device can be provisioned.
    async fn create_device(
        &self,
        lot_id: i64,
        spot_id: Uuid,
        status: SpotStatus,
        label: &str,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError>;

    /// Forward a spot status transition to the lot's edge server.
    async fn publish_spot_status(
        &self,
        lot_id: i64,
        change: &SpotStatusChange,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError>;
}

/// Port for delivering push notifications to a driver's device.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Send one notification to one registered device token.
    async fn send_notification_to_user(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<(), GatewayError>;
}
