//! Application services

pub mod parking;
pub mod profile;
pub mod reservation;
pub mod reservation_expiry;

#[cfg(test)]
pub mod test_support;

pub use parking::ParkingService;
pub use profile::ProfileService;
pub use reservation::ReservationService;
pub use reservation_expiry::start_reservation_expiry_task;
