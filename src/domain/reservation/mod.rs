pub mod model;
pub mod repository;

pub use model::{CreateReservationCommand, Reservation, ReservationStatus};
pub use repository::ReservationRepository;
