//! Reservation domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    /// Booking confirmed, spot is held
    Active,
    /// Reservation finished normally
    Completed,
    /// Reservation cancelled by the driver or the system
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse a status string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Completed and Cancelled are terminal: no transition leads out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command to book a spot
#[derive(Debug, Clone, Copy)]
pub struct CreateReservationCommand {
    pub driver_id: i64,
    pub lot_id: i64,
    pub spot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
}

/// A driver's time-bounded claim on a spot.
///
/// Reservations are never deleted; the status field is the only mutation.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i64,
    pub driver_id: i64,
    pub lot_id: i64,
    pub spot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
    /// Lot rate captured when the booking was made
    pub rate_per_hour: f32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(id: i64, cmd: CreateReservationCommand, rate_per_hour: f32) -> Self {
        Self {
            id,
            driver_id: cmd.driver_id,
            lot_id: cmd.lot_id,
            spot_id: cmd.spot_id,
            start_time: cmd.start_time,
            end_time: cmd.end_time,
            duration_hours: cmd.duration_hours,
            rate_per_hour,
            status: ReservationStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn update_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }

    /// Mark the reservation finished
    pub fn complete(&mut self) {
        self.status = ReservationStatus::Completed;
    }

    /// Cancel this reservation
    pub fn cancel(&mut self) {
        self.status = ReservationStatus::Cancelled;
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// An active reservation past its end time is due for completion.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.end_time < now
    }

    pub fn total_cost(&self) -> f32 {
        self.rate_per_hour * self.duration_hours as f32
    }
}

// ── Tests ──────────────────────────────────────────────────────
