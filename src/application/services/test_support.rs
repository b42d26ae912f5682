//! Shared fixtures and recording doubles for service tests.
//!
//! Domain entities are always real instances backed by the in-memory
//! repositories; only the two outbound ports are replaced by recording
//! doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::application::ports::{DeviceGateway, NotificationDispatcher};
use crate::application::services::{ParkingService, ProfileService, ReservationService};
use crate::domain::parking::{CreateParkingCommand, SpotStatus, SpotStatusChange};
use crate::domain::reservation::CreateReservationCommand;
use crate::infrastructure::storage::memory::{
    InMemoryDeviceTokenRepository, InMemoryEdgeServerRepository, InMemoryParkingLotRepository,
    InMemoryProfileRepository, InMemoryReservationRepository,
};
use crate::notifications::create_event_bus;
use crate::shared::errors::GatewayError;

// ── Device gateway double ──────────────────────────────────────

#[derive(Debug, Clone)]
pub enum DeviceCall {
    CreateDevice {
        lot_id: i64,
        spot_id: Uuid,
        status: SpotStatus,
        label: String,
        edge_server_id: Uuid,
    },
    PublishStatus {
        lot_id: i64,
        spot_id: Uuid,
        previous: SpotStatus,
        current: SpotStatus,
        edge_server_id: Uuid,
    },
}

#[derive(Default)]
pub struct RecordingDeviceGateway {
    calls: Mutex<Vec<DeviceCall>>,
}

impl RecordingDeviceGateway {
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceGateway for RecordingDeviceGateway {
    async fn create_device(
        &self,
        lot_id: i64,
        spot_id: Uuid,
        status: SpotStatus,
        label: &str,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(DeviceCall::CreateDevice {
            lot_id,
            spot_id,
            status,
            label: label.to_string(),
            edge_server_id,
        });
        Ok(())
    }

    async fn publish_spot_status(
        &self,
        lot_id: i64,
        change: &SpotStatusChange,
        edge_server_id: Uuid,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(DeviceCall::PublishStatus {
            lot_id,
            spot_id: change.spot_id,
            previous: change.previous,
            current: change.current,
            edge_server_id,
        });
        Ok(())
    }
}

// ── Notification dispatcher double ─────────────────────────────

#[derive(Debug, Clone)]
pub struct SentPush {
    pub token: String,
    pub title: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<SentPush>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make every following send fail with a transport error.
    pub fn fail_next_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send_notification_to_user(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<(), GatewayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport(
                "push endpoint unreachable".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(SentPush {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// ── Wiring helpers ─────────────────────────────────────────────

pub struct ParkingCtx {
    pub lots: Arc<InMemoryParkingLotRepository>,
    pub edge_servers: Arc<InMemoryEdgeServerRepository>,
    pub device_gateway: Arc<RecordingDeviceGateway>,
}

pub fn new_parking_service() -> (ParkingService, ParkingCtx) {
    let lots = Arc::new(InMemoryParkingLotRepository::new());
    let edge_servers = Arc::new(InMemoryEdgeServerRepository::new());
    let device_gateway = Arc::new(RecordingDeviceGateway::default());

    let service = ParkingService::new(
        lots.clone(),
        edge_servers.clone(),
        device_gateway.clone(),
        create_event_bus(),
    );

    (
        service,
        ParkingCtx {
            lots,
            edge_servers,
            device_gateway,
        },
    )
}

pub struct ReservationCtx {
    pub parking: Arc<ParkingService>,
    pub profiles: Arc<ProfileService>,
    pub reservations: Arc<InMemoryReservationRepository>,
    pub tokens: Arc<InMemoryDeviceTokenRepository>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub device_gateway: Arc<RecordingDeviceGateway>,
}

pub async fn new_reservation_service() -> (ReservationService, ReservationCtx) {
    let event_bus = create_event_bus();
    let device_gateway = Arc::new(RecordingDeviceGateway::default());

    let parking = Arc::new(ParkingService::new(
        Arc::new(InMemoryParkingLotRepository::new()),
        Arc::new(InMemoryEdgeServerRepository::new()),
        device_gateway.clone(),
        event_bus.clone(),
    ));
    let profiles = Arc::new(ProfileService::new(Arc::new(
        InMemoryProfileRepository::new(),
    )));
    let reservations = Arc::new(InMemoryReservationRepository::new());
    let tokens = Arc::new(InMemoryDeviceTokenRepository::new());
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let service = ReservationService::new(
        reservations.clone(),
        parking.clone(),
        profiles.clone(),
        tokens.clone(),
        dispatcher.clone(),
        event_bus,
    );

    (
        service,
        ReservationCtx {
            parking,
            profiles,
            reservations,
            tokens,
            dispatcher,
            device_gateway,
        },
    )
}

pub fn sample_parking_cmd(total_spots: u32) -> CreateParkingCommand {
    CreateParkingCommand {
        owner_id: 10,
        name: "Central".to_string(),
        description: "Downtown garage".to_string(),
        address: "Av. Arequipa 123".to_string(),
        latitude: -12.0463,
        longitude: -77.0428,
        rate_per_hour: Some(10.0),
        total_spots,
    }
}

pub fn sample_reservation_cmd(driver_id: i64, lot_id: i64, spot_id: Uuid) -> CreateReservationCommand {
    CreateReservationCommand {
        driver_id,
        lot_id,
        spot_id,
        start_time: Utc::now() + Duration::hours(1),
        end_time: Utc::now() + Duration::hours(3),
        duration_hours: 2,
    }
}

/// Poll a condition until it holds; panics after ~1s. Used to observe the
/// detached notification task.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}
