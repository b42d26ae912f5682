pub mod model;
pub mod repository;

pub use model::{DriverProfile, OwnerProfile};
pub use repository::ProfileRepository;
