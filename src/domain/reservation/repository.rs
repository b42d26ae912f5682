//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Reservation;
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Save a new reservation
    async fn save(&self, reservation: Reservation) -> DomainResult<()>;

    /// Find a reservation by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Reservation>>;

    /// Update an existing reservation
    async fn update(&self, reservation: Reservation) -> DomainResult<()>;

    /// Find all reservations made by a driver
    async fn find_by_driver(&self, driver_id: i64) -> DomainResult<Vec<Reservation>>;

    /// Find active reservations whose end time has passed
    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>>;

    /// Generate the next reservation ID
    async fn next_id(&self) -> i64;
}
