use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Spot {spot_id} in parking {lot_id} is not available")]
    SpotUnavailable { lot_id: i64, spot_id: Uuid },
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by outbound gateways (edge servers, push delivery).
///
/// These never abort a committed domain operation; callers log them and
/// move on.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by remote: {0}")]
    Rejected(String),
}
