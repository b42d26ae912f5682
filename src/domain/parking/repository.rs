//! Parking lot repository interface

use async_trait::async_trait;

use super::model::ParkingLot;
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait ParkingLotRepository: Send + Sync {
    /// Save a new parking lot
    async fn save(&self, lot: ParkingLot) -> DomainResult<()>;

    /// Find a parking lot by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<ParkingLot>>;

    /// Update an existing parking lot
    async fn update(&self, lot: ParkingLot) -> DomainResult<()>;

    /// List all parking lots
    async fn find_all(&self) -> DomainResult<Vec<ParkingLot>>;

    /// Generate the next lot ID
    async fn next_id(&self) -> i64;
}
