//! Profile repository interface

use async_trait::async_trait;

use super::model::{DriverProfile, OwnerProfile};
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn save_driver(&self, profile: DriverProfile) -> DomainResult<()>;

    async fn find_driver_by_user_id(&self, user_id: i64) -> DomainResult<Option<DriverProfile>>;

    async fn save_owner(&self, profile: OwnerProfile) -> DomainResult<()>;

    async fn find_owner_by_user_id(&self, user_id: i64) -> DomainResult<Option<OwnerProfile>>;
}
