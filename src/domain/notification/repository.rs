//! Device token repository interface

use async_trait::async_trait;

use super::model::DeviceToken;
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait DeviceTokenRepository: Send + Sync {
    /// Register a token for a user; re-registering the same token is a no-op
    async fn save(&self, token: DeviceToken) -> DomainResult<()>;

    /// All tokens registered by a user
    async fn find_by_user_id(&self, user_id: i64) -> DomainResult<Vec<DeviceToken>>;
}
