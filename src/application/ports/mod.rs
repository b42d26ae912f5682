pub mod outbound;

pub use outbound::{DeviceGateway, NotificationDispatcher};
