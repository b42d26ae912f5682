//! Notification events
//!
//! Defines the domain events broadcast to in-process subscribers (real-time
//! UI feeds, audit sinks).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A parking lot was registered together with its edge server
    ParkingRegistered(ParkingRegisteredEvent),
    /// A spot was added to a lot and its device provisioned
    SpotProvisioned(SpotProvisionedEvent),
    /// A spot changed status
    SpotStatusChanged(SpotStatusChangedEvent),
    /// The available-spot counter was adjusted explicitly
    AvailableCountAdjusted(AvailableCountAdjustedEvent),
    /// A reservation was created
    ReservationCreated(ReservationCreatedEvent),
    /// A reservation changed status
    ReservationStatusChanged(ReservationStatusChangedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ParkingRegistered(_) => "parking_registered",
            Event::SpotProvisioned(_) => "spot_provisioned",
            Event::SpotStatusChanged(_) => "spot_status_changed",
            Event::AvailableCountAdjusted(_) => "available_count_adjusted",
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationStatusChanged(_) => "reservation_status_changed",
        }
    }

    /// Get the parking lot ID the event belongs to
    pub fn lot_id(&self) -> i64 {
        match self {
            Event::ParkingRegistered(e) => e.lot_id,
            Event::SpotProvisioned(e) => e.lot_id,
            Event::SpotStatusChanged(e) => e.lot_id,
            Event::AvailableCountAdjusted(e) => e.lot_id,
            Event::ReservationCreated(e) => e.lot_id,
            Event::ReservationStatusChanged(e) => e.lot_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingRegisteredEvent {
    pub lot_id: i64,
    pub owner_id: i64,
    pub edge_server_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotProvisionedEvent {
    pub lot_id: i64,
    pub spot_id: Uuid,
    pub label: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotStatusChangedEvent {
    pub lot_id: i64,
    pub spot_id: Uuid,
    pub label: String,
    pub old_status: String,
    pub new_status: String,
    pub available_spots: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableCountAdjustedEvent {
    pub lot_id: i64,
    pub available_spots: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreatedEvent {
    pub reservation_id: i64,
    pub driver_id: i64,
    pub lot_id: i64,
    pub spot_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusChangedEvent {
    pub reservation_id: i64,
    pub lot_id: i64,
    pub old_status: String,
    pub new_status: String,
    pub timestamp: DateTime<Utc>,
}

/// Envelope carrying an event and the moment it was published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: Event,
    pub published_at: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            published_at: Utc::now(),
        }
    }
}
