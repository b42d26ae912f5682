//! # Parkeoya Core Service
//!
//! Parking-management core: spot registry with its availability counter,
//! reservation lifecycle, driver/owner profiles, and outbound gateways
//! toward edge hardware and driver devices.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and repository traits
//! - **application**: Business logic services and outbound ports
//! - **infrastructure**: External concerns (storage, HTTP gateways)
//! - **notifications**: In-process event broadcasting
//! - **shared**: Errors and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the service layer for easy access
pub use application::services::{
    start_reservation_expiry_task, ParkingService, ProfileService, ReservationService,
};

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
