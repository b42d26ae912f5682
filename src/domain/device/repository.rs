//! Edge server repository interface

use async_trait::async_trait;

use super::model::EdgeServer;
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait EdgeServerRepository: Send + Sync {
    async fn save(&self, server: EdgeServer) -> DomainResult<()>;

    /// Find the edge server provisioned for a parking lot
    async fn find_by_lot_id(&self, lot_id: i64) -> DomainResult<Option<EdgeServer>>;
}
