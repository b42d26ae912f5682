pub mod device;
pub mod notification;
pub mod parking;
pub mod profile;
pub mod reservation;

// Re-export commonly used types
pub use device::{EdgeServer, EdgeServerRepository};
pub use notification::{DeviceToken, DeviceTokenRepository};
pub use parking::{
    CountDirection, CreateParkingCommand, ParkingLot, ParkingLotRepository, ParkingSpot,
    SpotStatus, SpotStatusChange,
};
pub use profile::{DriverProfile, OwnerProfile, ProfileRepository};
pub use reservation::{
    CreateReservationCommand, Reservation, ReservationRepository, ReservationStatus,
};

// Re-export error types from shared for convenience
pub use crate::shared::errors::{DomainError, DomainResult};
