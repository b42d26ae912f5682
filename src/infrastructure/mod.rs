pub mod gateway;
pub mod storage;

pub use gateway::{FcmPushDispatcher, HttpDeviceGateway};
pub use storage::{
    InMemoryDeviceTokenRepository, InMemoryEdgeServerRepository, InMemoryParkingLotRepository,
    InMemoryProfileRepository, InMemoryReservationRepository,
};
