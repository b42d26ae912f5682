//! Parkeoya core service daemon.
//!
//! Wires repositories, outbound gateways and application services, starts
//! the background tasks, and runs until a shutdown signal arrives.
//! Reads configuration from a TOML file (~/.config/parkeoya/config.toml).

use std::sync::Arc;

use tracing::{error, info};

use parkeoya::application::services::{
    start_reservation_expiry_task, ParkingService, ProfileService, ReservationService,
};
use parkeoya::config::{default_config_path, AppConfig};
use parkeoya::create_event_bus;
use parkeoya::domain::{
    DeviceTokenRepository, EdgeServerRepository, ParkingLotRepository, ProfileRepository,
    ReservationRepository,
};
use parkeoya::infrastructure::{
    FcmPushDispatcher, HttpDeviceGateway, InMemoryDeviceTokenRepository,
    InMemoryEdgeServerRepository, InMemoryParkingLotRepository, InMemoryProfileRepository,
    InMemoryReservationRepository,
};
use parkeoya::shared::shutdown::ShutdownCoordinator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("PARKEOYA_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Parkeoya core service...");

    // ── Repositories ───────────────────────────────────────────
    let lots: Arc<dyn ParkingLotRepository> = Arc::new(InMemoryParkingLotRepository::new());
    let edge_servers: Arc<dyn EdgeServerRepository> = Arc::new(InMemoryEdgeServerRepository::new());
    let reservations: Arc<dyn ReservationRepository> =
        Arc::new(InMemoryReservationRepository::new());
    let profiles_repo: Arc<dyn ProfileRepository> = Arc::new(InMemoryProfileRepository::new());
    let tokens: Arc<dyn DeviceTokenRepository> = Arc::new(InMemoryDeviceTokenRepository::new());

    // ── Outbound gateways ──────────────────────────────────────
    let device_gateway = Arc::new(HttpDeviceGateway::new(&app_cfg.device_gateway));
    let dispatcher = Arc::new(FcmPushDispatcher::new(&app_cfg.push));
    info!(
        base_url = %app_cfg.device_gateway.base_url,
        "Device gateway configured"
    );

    // ── Event bus for real-time notifications ──────────────────
    let event_bus = create_event_bus();

    // ── Services ───────────────────────────────────────────────
    let parking_service = Arc::new(ParkingService::new(
        lots,
        edge_servers,
        device_gateway,
        event_bus.clone(),
    ));
    let profile_service = Arc::new(ProfileService::new(profiles_repo));
    let reservation_service = Arc::new(ReservationService::new(
        reservations.clone(),
        parking_service.clone(),
        profile_service.clone(),
        tokens,
        dispatcher,
        event_bus.clone(),
    ));

    // ── Shutdown coordination ──────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.shutdown_timeout_secs);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── Background tasks ───────────────────────────────────────
    start_reservation_expiry_task(
        reservation_service.clone(),
        reservations,
        shutdown_signal.clone(),
        app_cfg.reservations.expiry_check_interval_secs,
    );

    // Log every domain event while the daemon runs
    let mut subscriber = event_bus.subscribe();
    let event_log_shutdown = shutdown_signal.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                message = subscriber.recv() => {
                    match message {
                        Some(message) => {
                            info!(
                                event = message.event.event_type(),
                                lot_id = message.event.lot_id(),
                                "Domain event"
                            );
                        }
                        None => break,
                    }
                }
                _ = event_log_shutdown.notified().wait() => break,
            }
        }
    });

    info!("Parkeoya core service started. Press Ctrl+C to shutdown gracefully.");

    shutdown
        .shutdown_with_cleanup(|| async {
            info!("Stopping background tasks...");
        })
        .await;

    info!("Parkeoya core service shutdown complete");
    Ok(())
}
