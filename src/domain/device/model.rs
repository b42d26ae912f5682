//! Edge server entity
//!
//! One edge server is provisioned per parking lot when the lot is
//! registered; it owns the physical spot sensors on site.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EdgeServer {
    /// Identity the devices address the server by
    pub server_id: Uuid,
    /// Parking lot this server belongs to
    pub lot_id: i64,
    pub created_at: DateTime<Utc>,
}

impl EdgeServer {
    pub fn new(lot_id: i64) -> Self {
        Self {
            server_id: Uuid::new_v4(),
            lot_id,
            created_at: Utc::now(),
        }
    }
}
