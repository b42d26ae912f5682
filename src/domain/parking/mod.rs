pub mod model;
pub mod repository;

pub use model::{
    CountDirection, CreateParkingCommand, ParkingLot, ParkingSpot, SpotStatus, SpotStatusChange,
};
pub use repository::ParkingLotRepository;
