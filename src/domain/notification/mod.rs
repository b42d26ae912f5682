pub mod model;
pub mod repository;

pub use model::DeviceToken;
pub use repository::DeviceTokenRepository;
