//! Outbound gateway implementations

pub mod device;
pub mod push;

pub use device::HttpDeviceGateway;
pub use push::FcmPushDispatcher;
