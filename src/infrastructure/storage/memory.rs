//! In-memory repository implementations
//!
//! Production-quality stores over `DashMap`, with atomic counters for id
//! generation. These back the services in deployments without an external
//! database and in every test.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    DeviceToken, DeviceTokenRepository, DomainError, DomainResult, DriverProfile, EdgeServer,
    EdgeServerRepository, OwnerProfile, ParkingLot, ParkingLotRepository, ProfileRepository,
    Reservation, ReservationRepository,
};

// ── Parking lots ───────────────────────────────────────────────

pub struct InMemoryParkingLotRepository {
    lots: DashMap<i64, ParkingLot>,
    counter: AtomicI64,
}

impl InMemoryParkingLotRepository {
    pub fn new() -> Self {
        Self {
            lots: DashMap::new(),
            counter: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryParkingLotRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParkingLotRepository for InMemoryParkingLotRepository {
    async fn save(&self, lot: ParkingLot) -> DomainResult<()> {
        if self.lots.contains_key(&lot.id) {
            return Err(DomainError::Conflict(format!("Parking {}", lot.id)));
        }
        self.lots.insert(lot.id, lot);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<ParkingLot>> {
        Ok(self.lots.get(&id).map(|l| l.clone()))
    }

    async fn update(&self, lot: ParkingLot) -> DomainResult<()> {
        if !self.lots.contains_key(&lot.id) {
            return Err(DomainError::NotFound {
                entity: "Parking",
                field: "id",
                value: lot.id.to_string(),
            });
        }
        self.lots.insert(lot.id, lot);
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingLot>> {
        Ok(self.lots.iter().map(|e| e.value().clone()).collect())
    }

    async fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

// ── Reservations ───────────────────────────────────────────────

pub struct InMemoryReservationRepository {
    reservations: DashMap<i64, Reservation>,
    counter: AtomicI64,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            counter: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn save(&self, reservation: Reservation) -> DomainResult<()> {
        if self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::Conflict(format!(
                "Reservation {}",
                reservation.id
            )));
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, reservation: Reservation) -> DomainResult<()> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::NotFound {
                entity: "Reservation",
                field: "id",
                value: reservation.id.to_string(),
            });
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn find_by_driver(&self, driver_id: i64) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.driver_id == driver_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.is_overdue(now))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

// ── Edge servers ───────────────────────────────────────────────

pub struct InMemoryEdgeServerRepository {
    /// Indexed by lot id; each lot has at most one edge server
    servers: DashMap<i64, EdgeServer>,
}

impl InMemoryEdgeServerRepository {
    pub fn new() -> Self {
        Self {
            servers: DashMap::new(),
        }
    }
}

impl Default for InMemoryEdgeServerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeServerRepository for InMemoryEdgeServerRepository {
    async fn save(&self, server: EdgeServer) -> DomainResult<()> {
        if self.servers.contains_key(&server.lot_id) {
            return Err(DomainError::Conflict(format!(
                "Edge server for parking {}",
                server.lot_id
            )));
        }
        self.servers.insert(server.lot_id, server);
        Ok(())
    }

    async fn find_by_lot_id(&self, lot_id: i64) -> DomainResult<Option<EdgeServer>> {
        Ok(self.servers.get(&lot_id).map(|s| s.clone()))
    }
}

// ── Profiles ───────────────────────────────────────────────────

pub struct InMemoryProfileRepository {
    drivers: DashMap<i64, DriverProfile>,
    owners: DashMap<i64, OwnerProfile>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            drivers: DashMap::new(),
            owners: DashMap::new(),
        }
    }
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn save_driver(&self, profile: DriverProfile) -> DomainResult<()> {
        self.drivers.insert(profile.user_id, profile);
        Ok(())
    }

    async fn find_driver_by_user_id(&self, user_id: i64) -> DomainResult<Option<DriverProfile>> {
        Ok(self.drivers.get(&user_id).map(|p| p.clone()))
    }

    async fn save_owner(&self, profile: OwnerProfile) -> DomainResult<()> {
        self.owners.insert(profile.user_id, profile);
        Ok(())
    }

    async fn find_owner_by_user_id(&self, user_id: i64) -> DomainResult<Option<OwnerProfile>> {
        Ok(self.owners.get(&user_id).map(|p| p.clone()))
    }
}

// ── Device tokens ──────────────────────────────────────────────

pub struct InMemoryDeviceTokenRepository {
    tokens: DashMap<i64, Vec<DeviceToken>>,
}

impl InMemoryDeviceTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }
}

impl Default for InMemoryDeviceTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceTokenRepository for InMemoryDeviceTokenRepository {
    async fn save(&self, token: DeviceToken) -> DomainResult<()> {
        let mut entry = self.tokens.entry(token.user_id).or_default();
        if !entry.iter().any(|t| t.token == token.token) {
            entry.push(token);
        }
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: i64) -> DomainResult<Vec<DeviceToken>> {
        Ok(self
            .tokens
            .get(&user_id)
            .map(|tokens| tokens.clone())
            .unwrap_or_default())
    }
}

// ── Tests ──────────────────────────────────────────────────────
