//! Cross-cutting support types

pub mod errors;
pub mod shutdown;

pub use errors::{DomainError, DomainResult, GatewayError};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
