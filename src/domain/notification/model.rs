//! Push notification token entity

use chrono::{DateTime, Utc};

/// A device token registered by a driver's mobile app.
///
/// One user may hold several tokens (one per installed device).
#[derive(Debug, Clone)]
pub struct DeviceToken {
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl DeviceToken {
    pub fn new(user_id: i64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}
