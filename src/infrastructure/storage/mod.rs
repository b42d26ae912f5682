pub mod memory;

pub use memory::{
    InMemoryDeviceTokenRepository, InMemoryEdgeServerRepository, InMemoryParkingLotRepository,
    InMemoryProfileRepository, InMemoryReservationRepository,
};
