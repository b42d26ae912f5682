//! Parking lot and spot domain entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};

/// Status of an individual parking spot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotStatus {
    Available,
    Reserved,
    Occupied,
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Occupied => "Occupied",
        }
    }

    /// Parse a status string, case-insensitively. Returns `None` for
    /// anything that is not one of the three known statuses.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "occupied" => Some(Self::Occupied),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction for an explicit available-count adjustment.
///
/// Redundant with the sign of the delta on purpose; the two are always
/// combined into one signed delta before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDirection {
    Increment,
    Decrement,
}

impl CountDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "increment" => Some(Self::Increment),
            "decrement" => Some(Self::Decrement),
            _ => None,
        }
    }

    fn signed(&self, delta: u32) -> i64 {
        match self {
            Self::Increment => i64::from(delta),
            Self::Decrement => -i64::from(delta),
        }
    }
}

/// An individually bookable unit within a parking lot
#[derive(Debug, Clone)]
pub struct ParkingSpot {
    /// Unique spot ID, assigned when the spot is registered
    pub id: Uuid,
    /// Owning parking lot
    pub lot_id: i64,
    /// Human-readable label ("A1", "B12", ...)
    pub label: String,
    /// Current status
    pub status: SpotStatus,
}

impl ParkingSpot {
    pub fn new(lot_id: i64, label: impl Into<String>, status: SpotStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            lot_id,
            label: label.into(),
            status,
        }
    }
}

/// A status transition applied to one spot, used for device notifications
#[derive(Debug, Clone)]
pub struct SpotStatusChange {
    pub spot_id: Uuid,
    pub label: String,
    pub previous: SpotStatus,
    pub current: SpotStatus,
}

/// Command to register a new parking lot
#[derive(Debug, Clone)]
pub struct CreateParkingCommand {
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rate_per_hour: Option<f32>,
    pub total_spots: u32,
}

/// Parking lot aggregate
///
/// The lot exclusively owns its spots. `available_spots` is maintained
/// incrementally: every status mutation that crosses the `Available`
/// boundary adjusts it in the same call, so the counter always equals the
/// number of `Available` spots.
#[derive(Debug, Clone)]
pub struct ParkingLot {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Hourly rate; a lot without a configured rate cannot be booked
    pub rate_per_hour: Option<f32>,
    /// Declared capacity
    pub total_spots: u32,
    /// Count of spots currently `Available`
    pub available_spots: u32,
    pub spots: Vec<ParkingSpot>,
    pub created_at: DateTime<Utc>,
}

impl ParkingLot {
    pub fn new(id: i64, cmd: CreateParkingCommand) -> Self {
        Self {
            id,
            owner_id: cmd.owner_id,
            name: cmd.name,
            description: cmd.description,
            address: cmd.address,
            latitude: cmd.latitude,
            longitude: cmd.longitude,
            rate_per_hour: cmd.rate_per_hour,
            total_spots: cmd.total_spots,
            available_spots: 0,
            spots: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn spot(&self, spot_id: Uuid) -> Option<&ParkingSpot> {
        self.spots.iter().find(|s| s.id == spot_id)
    }

    fn spot_mut(&mut self, spot_id: Uuid) -> Option<&mut ParkingSpot> {
        self.spots.iter_mut().find(|s| s.id == spot_id)
    }

    /// Register a new spot with a fresh ID.
    ///
    /// The available count grows only when the initial status is
    /// `Available`.
    pub fn add_spot(
        &mut self,
        label: impl Into<String>,
        status: SpotStatus,
    ) -> DomainResult<ParkingSpot> {
        if self.spots.len() as u32 >= self.total_spots {
            return Err(DomainError::Validation(format!(
                "Parking {} is at declared capacity ({})",
                self.id, self.total_spots
            )));
        }

        let spot = ParkingSpot::new(self.id, label, status);
        self.spots.push(spot.clone());
        if status == SpotStatus::Available {
            self.available_spots += 1;
        }
        Ok(spot)
    }

    /// Set a spot's status, adjusting the available count in the same call.
    pub fn set_spot_status(
        &mut self,
        spot_id: Uuid,
        status: SpotStatus,
    ) -> DomainResult<SpotStatusChange> {
        let total = self.total_spots;
        let spot = self.spot_mut(spot_id).ok_or(DomainError::NotFound {
            entity: "ParkingSpot",
            field: "id",
            value: spot_id.to_string(),
        })?;

        let previous = spot.status;
        spot.status = status;
        let change = SpotStatusChange {
            spot_id,
            label: spot.label.clone(),
            previous,
            current: status,
        };

        match (previous, status) {
            (SpotStatus::Available, s) if s != SpotStatus::Available => {
                self.available_spots = self.available_spots.saturating_sub(1);
            }
            (p, SpotStatus::Available) if p != SpotStatus::Available => {
                self.available_spots = (self.available_spots + 1).min(total);
            }
            _ => {}
        }

        Ok(change)
    }

    /// Claim a spot for a booking: requires the spot to be `Available`
    /// right now, then flips it to `Reserved` and decrements the count.
    pub fn reserve_spot(&mut self, spot_id: Uuid) -> DomainResult<SpotStatusChange> {
        let spot = self.spot(spot_id).ok_or(DomainError::NotFound {
            entity: "ParkingSpot",
            field: "id",
            value: spot_id.to_string(),
        })?;

        if spot.status != SpotStatus::Available {
            return Err(DomainError::SpotUnavailable {
                lot_id: self.id,
                spot_id,
            });
        }

        self.set_spot_status(spot_id, SpotStatus::Reserved)
    }

    /// Release a spot back to `Available`, incrementing the count.
    ///
    /// Idempotent: releasing a spot that is already `Available` is a no-op
    /// and returns `None`.
    pub fn release_spot(&mut self, spot_id: Uuid) -> DomainResult<Option<SpotStatusChange>> {
        let spot = self.spot(spot_id).ok_or(DomainError::NotFound {
            entity: "ParkingSpot",
            field: "id",
            value: spot_id.to_string(),
        })?;

        if spot.status == SpotStatus::Available {
            return Ok(None);
        }

        self.set_spot_status(spot_id, SpotStatus::Available).map(Some)
    }

    /// Apply an explicit count adjustment.
    ///
    /// The direction and delta are folded into a single signed delta; the
    /// result must stay within `[0, total_spots]`.
    pub fn adjust_available_count(
        &mut self,
        delta: u32,
        direction: CountDirection,
    ) -> DomainResult<u32> {
        let next = i64::from(self.available_spots) + direction.signed(delta);

        if next < 0 || next > i64::from(self.total_spots) {
            return Err(DomainError::Validation(format!(
                "Available spots count {} out of range [0, {}] for parking {}",
                next, self.total_spots, self.id
            )));
        }

        self.available_spots = next as u32;
        Ok(self.available_spots)
    }

    /// Count of spots whose status is `Available` right now.
    ///
    /// The incrementally maintained `available_spots` must always agree
    /// with this for lots mutated only through the status operations.
    pub fn count_available(&self) -> u32 {
        self.spots
            .iter()
            .filter(|s| s.status == SpotStatus::Available)
            .count() as u32
    }
}

// ── Tests ──────────────────────────────────────────────────────
