//! Profile business logic service

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, DomainResult, DriverProfile, OwnerProfile, ProfileRepository};

/// Service for driver and parking-owner profiles
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Create a driver profile for a user account.
    pub async fn create_driver(
        &self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
    ) -> DomainResult<DriverProfile> {
        if self.profiles.find_driver_by_user_id(user_id).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Driver profile for user {}",
                user_id
            )));
        }

        let profile = DriverProfile::new(user_id, first_name, last_name, phone);
        self.profiles.save_driver(profile.clone()).await?;

        info!(user_id, "Driver profile created");
        Ok(profile)
    }

    /// Create a parking-owner profile for a user account.
    pub async fn create_parking_owner(
        &self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
    ) -> DomainResult<OwnerProfile> {
        if self.profiles.find_owner_by_user_id(user_id).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Owner profile for user {}",
                user_id
            )));
        }

        let profile = OwnerProfile::new(user_id, first_name, last_name, phone);
        self.profiles.save_owner(profile.clone()).await?;

        info!(user_id, "Parking owner profile created");
        Ok(profile)
    }

    /// Resolve a driver's display name. Unknown drivers are a hard error:
    /// a booking for a missing profile is a caller bug.
    pub async fn get_driver_full_name(&self, user_id: i64) -> DomainResult<String> {
        let profile = self
            .profiles
            .find_driver_by_user_id(user_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "DriverProfile",
                field: "user_id",
                value: user_id.to_string(),
            })?;

        Ok(profile.full_name())
    }
}
