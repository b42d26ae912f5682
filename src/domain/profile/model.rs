//! Driver and parking-owner profile entities

use chrono::{DateTime, Utc};

/// Profile of a driver account
#[derive(Debug, Clone)]
pub struct DriverProfile {
    /// Identity of the backing user account
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DriverProfile {
    pub fn new(
        user_id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            user_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            created_at: Utc::now(),
        }
    }

    /// Display name used in notifications
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile of a parking-owner account
#[derive(Debug, Clone)]
pub struct OwnerProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OwnerProfile {
    pub fn new(
        user_id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            user_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            created_at: Utc::now(),
        }
    }
}
