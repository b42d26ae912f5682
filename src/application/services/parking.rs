//! Parking lot business logic service
//!
//! Owns the spot registry and the per-lot available-spot counter. Every
//! mutation of a lot's spots or counter runs under that lot's lock, so the
//! counter invariant (`available_spots == count of Available spots`) holds
//! at every point observable by another task. Locks are per lot; operations
//! on distinct lots never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::ports::DeviceGateway;
use crate::domain::{
    CountDirection, CreateParkingCommand, DomainError, DomainResult, EdgeServer,
    EdgeServerRepository, ParkingLot, ParkingLotRepository, ParkingSpot, SpotStatus,
    SpotStatusChange,
};
use crate::notifications::events::{
    AvailableCountAdjustedEvent, Event, ParkingRegisteredEvent, SpotProvisionedEvent,
    SpotStatusChangedEvent,
};
use crate::notifications::SharedEventBus;

/// Service for parking lot and spot operations
pub struct ParkingService {
    lots: Arc<dyn ParkingLotRepository>,
    edge_servers: Arc<dyn EdgeServerRepository>,
    device_gateway: Arc<dyn DeviceGateway>,
    event_bus: SharedEventBus,
    /// One lock per lot; guards every spot/counter mutation of that lot
    lot_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ParkingService {
    pub fn new(
        lots: Arc<dyn ParkingLotRepository>,
        edge_servers: Arc<dyn EdgeServerRepository>,
        device_gateway: Arc<dyn DeviceGateway>,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            lots,
            edge_servers,
            device_gateway,
            event_bus,
            lot_locks: DashMap::new(),
        }
    }

    fn lot_lock(&self, lot_id: i64) -> Arc<Mutex<()>> {
        let entry = self
            .lot_locks
            .entry(lot_id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Register a new parking lot and provision its edge server.
    pub async fn create_parking(&self, cmd: CreateParkingCommand) -> DomainResult<ParkingLot> {
        let id = self.lots.next_id().await;
        let lot = ParkingLot::new(id, cmd);
        self.lots.save(lot.clone()).await?;

        let edge = EdgeServer::new(lot.id);
        self.edge_servers.save(edge.clone()).await?;

        info!(
            lot_id = lot.id,
            owner_id = lot.owner_id,
            edge_server_id = %edge.server_id,
            "Parking registered"
        );

        self.event_bus
            .publish(Event::ParkingRegistered(ParkingRegisteredEvent {
                lot_id: lot.id,
                owner_id: lot.owner_id,
                edge_server_id: edge.server_id,
                timestamp: chrono::Utc::now(),
            }));

        Ok(lot)
    }

    pub async fn get_parking(&self, lot_id: i64) -> DomainResult<Option<ParkingLot>> {
        self.lots.find_by_id(lot_id).await
    }

    pub async fn list_parkings(&self) -> DomainResult<Vec<ParkingLot>> {
        self.lots.find_all().await
    }

    /// Register a new spot on a lot and announce it to the lot's edge
    /// server.
    pub async fn add_parking_spot(
        &self,
        lot_id: i64,
        label: &str,
        initial_status: SpotStatus,
    ) -> DomainResult<ParkingSpot> {
        let lock = self.lot_lock(lot_id);
        let _guard = lock.lock().await;

        let mut lot = self
            .lots
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::Validation("Parking not found".to_string()))?;

        // Resolve the edge server before touching the lot so a missing
        // server aborts with no partial state.
        let edge = self
            .edge_servers
            .find_by_lot_id(lot_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "EdgeServer",
                field: "lot_id",
                value: lot_id.to_string(),
            })?;

        let spot = lot.add_spot(label, initial_status)?;
        self.lots.update(lot).await?;
        drop(_guard);

        if let Err(e) = self
            .device_gateway
            .create_device(lot_id, spot.id, initial_status, label, edge.server_id)
            .await
        {
            warn!(
                lot_id,
                spot_id = %spot.id,
                error = %e,
                "Device provisioning request failed"
            );
        }

        info!(lot_id, spot_id = %spot.id, label, status = %initial_status, "Spot registered");

        self.event_bus
            .publish(Event::SpotProvisioned(SpotProvisionedEvent {
                lot_id,
                spot_id: spot.id,
                label: spot.label.clone(),
                status: spot.status.as_str().to_string(),
                timestamp: chrono::Utc::now(),
            }));

        Ok(spot)
    }

    /// Get a single spot. Unknown lot or spot is a hard NotFound.
    pub async fn get_spot(&self, lot_id: i64, spot_id: uuid::Uuid) -> DomainResult<ParkingSpot> {
        let lot = self
            .lots
            .find_by_id(lot_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Parking",
                field: "id",
                value: lot_id.to_string(),
            })?;

        lot.spot(spot_id).cloned().ok_or(DomainError::NotFound {
            entity: "ParkingSpot",
            field: "id",
            value: spot_id.to_string(),
        })
    }

    pub async fn get_spot_label(&self, spot_id: uuid::Uuid, lot_id: i64) -> DomainResult<String> {
        Ok(self.get_spot(lot_id, spot_id).await?.label)
    }

    /// Hourly rate of a lot; `None` when the owner has not configured one.
    pub async fn get_rate_per_hour(&self, lot_id: i64) -> DomainResult<Option<f32>> {
        let lot = self
            .lots
            .find_by_id(lot_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Parking",
                field: "id",
                value: lot_id.to_string(),
            })?;
        Ok(lot.rate_per_hour)
    }

    /// Set a spot's status. The status write and the counter adjustment are
    /// applied in the same critical section; the edge server is notified
    /// after the lock is released.
    pub async fn update_spot_availability(
        &self,
        lot_id: i64,
        spot_id: uuid::Uuid,
        new_status: SpotStatus,
    ) -> DomainResult<SpotStatusChange> {
        let lock = self.lot_lock(lot_id);
        let (change, available) = {
            let _guard = lock.lock().await;

            let mut lot = self
                .lots
                .find_by_id(lot_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Parking",
                    field: "id",
                    value: lot_id.to_string(),
                })?;

            let change = lot.set_spot_status(spot_id, new_status)?;
            let available = lot.available_spots;
            self.lots.update(lot).await?;
            (change, available)
        };

        info!(
            lot_id,
            spot_id = %spot_id,
            from = %change.previous,
            to = %change.current,
            available,
            "Spot availability updated"
        );

        self.emit_spot_status(lot_id, &change, available).await;
        Ok(change)
    }

    /// Claim a spot for a booking.
    ///
    /// The spot must be `Available` at the moment of the claim; the check,
    /// the flip to `Reserved` and the counter decrement happen under one
    /// lock acquisition, so of two concurrent claims on the same spot
    /// exactly one succeeds.
    pub async fn reserve_spot(
        &self,
        lot_id: i64,
        spot_id: uuid::Uuid,
    ) -> DomainResult<SpotStatusChange> {
        let lock = self.lot_lock(lot_id);
        let (change, available) = {
            let _guard = lock.lock().await;

            let mut lot = self
                .lots
                .find_by_id(lot_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Parking",
                    field: "id",
                    value: lot_id.to_string(),
                })?;

            let change = lot.reserve_spot(spot_id)?;
            let available = lot.available_spots;
            self.lots.update(lot).await?;
            (change, available)
        };

        info!(lot_id, spot_id = %spot_id, available, "Spot reserved");

        self.emit_spot_status(lot_id, &change, available).await;
        Ok(change)
    }

    /// Release a spot back to `Available`.
    ///
    /// Idempotent: releasing an already-available spot changes nothing and
    /// returns `None`.
    pub async fn release_spot(
        &self,
        lot_id: i64,
        spot_id: uuid::Uuid,
    ) -> DomainResult<Option<SpotStatusChange>> {
        let lock = self.lot_lock(lot_id);
        let released = {
            let _guard = lock.lock().await;

            let mut lot = self
                .lots
                .find_by_id(lot_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Parking",
                    field: "id",
                    value: lot_id.to_string(),
                })?;

            match lot.release_spot(spot_id)? {
                Some(change) => {
                    let available = lot.available_spots;
                    self.lots.update(lot).await?;
                    Some((change, available))
                }
                None => None,
            }
        };

        let Some((change, available)) = released else {
            return Ok(None);
        };

        info!(lot_id, spot_id = %spot_id, available, "Spot released");

        self.emit_spot_status(lot_id, &change, available).await;
        Ok(Some(change))
    }

    /// Apply an explicit adjustment to a lot's available-spot counter.
    ///
    /// Direction and delta are folded into one signed delta before the
    /// counter is touched; the result must stay within
    /// `[0, total_spots]`.
    pub async fn update_available_spots_count(
        &self,
        lot_id: i64,
        delta: u32,
        direction: CountDirection,
    ) -> DomainResult<u32> {
        let lock = self.lot_lock(lot_id);
        let available = {
            let _guard = lock.lock().await;

            let mut lot = self
                .lots
                .find_by_id(lot_id)
                .await?
                .ok_or_else(|| DomainError::Validation("Parking not found".to_string()))?;

            let available = lot.adjust_available_count(delta, direction)?;
            self.lots.update(lot).await?;
            available
        };

        info!(
            lot_id,
            delta,
            direction = direction.as_str(),
            available,
            "Available spots count updated"
        );

        self.event_bus
            .publish(Event::AvailableCountAdjusted(AvailableCountAdjustedEvent {
                lot_id,
                available_spots: available,
                timestamp: chrono::Utc::now(),
            }));

        Ok(available)
    }

    /// Best-effort status notification toward the lot's edge server, plus
    /// the in-process event. Runs outside any lot lock.
    async fn emit_spot_status(&self, lot_id: i64, change: &SpotStatusChange, available: u32) {
        match self.edge_servers.find_by_lot_id(lot_id).await {
            Ok(Some(edge)) => {
                if let Err(e) = self
                    .device_gateway
                    .publish_spot_status(lot_id, change, edge.server_id)
                    .await
                {
                    warn!(
                        lot_id,
                        spot_id = %change.spot_id,
                        error = %e,
                        "Device status notification failed"
                    );
                }
            }
            Ok(None) => {
                warn!(lot_id, "No edge server registered; device not notified");
            }
            Err(e) => {
                warn!(lot_id, error = %e, "Edge server lookup failed");
            }
        }

        self.event_bus
            .publish(Event::SpotStatusChanged(SpotStatusChangedEvent {
                lot_id,
                spot_id: change.spot_id,
                label: change.label.clone(),
                old_status: change.previous.as_str().to_string(),
                new_status: change.current.as_str().to_string(),
                available_spots: available,
                timestamp: chrono::Utc::now(),
            }));
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{
        new_parking_service, sample_parking_cmd, DeviceCall,
    };

    #[tokio::test]
    async fn create_parking_provisions_edge_server() {
        let (service, ctx) = new_parking_service();

        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();

        assert_eq!(lot.available_spots, 0);
        let edge = ctx
            .edge_servers
            .find_by_lot_id(lot.id)
            .await
            .unwrap()
            .expect("edge server created with parking");
        assert_eq!(edge.lot_id, lot.id);
    }

    #[tokio::test]
    async fn add_spot_notifies_device_gateway() {
        let (service, ctx) = new_parking_service();
        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();

        let spot = service
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();

        let calls = ctx.device_gateway.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            DeviceCall::CreateDevice {
                lot_id,
                spot_id,
                status,
                label,
                ..
            } => {
                assert_eq!(*lot_id, lot.id);
                assert_eq!(*spot_id, spot.id);
                assert_eq!(*status, SpotStatus::Available);
                assert_eq!(label, "A1");
            }
            other => panic!("unexpected device call: {:?}", other),
        }

        let reloaded = service.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(reloaded.available_spots, 1);
    }

    #[tokio::test]
    async fn add_spot_unknown_parking_is_validation_error() {
        let (service, ctx) = new_parking_service();

        let err = service
            .add_parking_spot(999, "A1", SpotStatus::Available)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(ctx.device_gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn add_spot_without_edge_server_is_rejected() {
        let (service, ctx) = new_parking_service();

        // Lot persisted directly, bypassing edge-server provisioning
        let id = ctx.lots.next_id().await;
        ctx.lots
            .save(ParkingLot::new(id, sample_parking_cmd(10)))
            .await
            .unwrap();

        let err = service
            .add_parking_spot(id, "A1", SpotStatus::Available)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: "EdgeServer",
                ..
            }
        ));
        assert!(ctx.device_gateway.calls().is_empty());

        // no spot was appended
        let lot = service.get_parking(id).await.unwrap().unwrap();
        assert!(lot.spots.is_empty());
    }

    #[tokio::test]
    async fn update_spot_availability_emits_old_and_new_status() {
        let (service, ctx) = new_parking_service();
        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();
        let spot = service
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();

        let change = service
            .update_spot_availability(lot.id, spot.id, SpotStatus::Occupied)
            .await
            .unwrap();

        assert_eq!(change.previous, SpotStatus::Available);
        assert_eq!(change.current, SpotStatus::Occupied);

        let reloaded = service.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(reloaded.available_spots, 0);
        assert_eq!(reloaded.available_spots, reloaded.count_available());

        let calls = ctx.device_gateway.calls();
        assert!(matches!(
            calls.last(),
            Some(DeviceCall::PublishStatus { previous, current, .. })
                if *previous == SpotStatus::Available && *current == SpotStatus::Occupied
        ));
    }

    #[tokio::test]
    async fn update_spot_availability_unknown_spot_is_not_found() {
        let (service, _ctx) = new_parking_service();
        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();

        let err = service
            .update_spot_availability(lot.id, uuid::Uuid::new_v4(), SpotStatus::Occupied)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reserve_then_release_keeps_counter_in_sync() {
        let (service, _ctx) = new_parking_service();
        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();
        let spot = service
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();

        service.reserve_spot(lot.id, spot.id).await.unwrap();
        let after_reserve = service.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(after_reserve.available_spots, 0);

        let second = service.reserve_spot(lot.id, spot.id).await.unwrap_err();
        assert!(matches!(second, DomainError::SpotUnavailable { .. }));

        assert!(service.release_spot(lot.id, spot.id).await.unwrap().is_some());
        assert!(service.release_spot(lot.id, spot.id).await.unwrap().is_none());

        let after_release = service.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(after_release.available_spots, 1);
        assert_eq!(
            after_release.available_spots,
            after_release.count_available()
        );
    }

    #[tokio::test]
    async fn count_adjustment_validates_bounds_and_lot() {
        let (service, _ctx) = new_parking_service();
        let lot = service.create_parking(sample_parking_cmd(3)).await.unwrap();

        let count = service
            .update_available_spots_count(lot.id, 2, CountDirection::Increment)
            .await
            .unwrap();
        assert_eq!(count, 2);

        let err = service
            .update_available_spots_count(lot.id, 3, CountDirection::Decrement)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .update_available_spots_count(999, 1, CountDirection::Increment)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_reservations_of_same_spot_yield_one_winner() {
        let (service, _ctx) = new_parking_service();
        let service = Arc::new(service);
        let lot = service.create_parking(sample_parking_cmd(10)).await.unwrap();
        let spot = service
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let service = service.clone();
            let (lot_id, spot_id) = (lot.id, spot.id);
            handles.push(tokio::spawn(async move {
                service.reserve_spot(lot_id, spot_id).await
            }));
        }

        let mut successes = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::SpotUnavailable { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(rejected, 1);

        let reloaded = service.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(reloaded.available_spots, 0);
    }
}
