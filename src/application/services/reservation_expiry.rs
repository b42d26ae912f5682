//! Background task that completes overdue reservations.
//!
//! Runs in a tokio::spawn loop, periodically looking for active
//! reservations past their `end_time` and driving them through the normal
//! `Completed` transition, which also releases their spots.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::application::services::ReservationService;
use crate::domain::{DomainResult, ReservationRepository, ReservationStatus};
use crate::shared::shutdown::ShutdownSignal;

/// Start the reservation expiry background task.
pub fn start_reservation_expiry_task(
    service: Arc<ReservationService>,
    reservations: Arc<dyn ReservationRepository>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            "Reservation expiry task started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = complete_overdue(&service, &reservations).await {
                        warn!(error = %e, "Reservation expiry check error");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Reservation expiry task shutting down");
                    break;
                }
            }
        }

        info!("Reservation expiry task stopped");
    });
}

async fn complete_overdue(
    service: &Arc<ReservationService>,
    reservations: &Arc<dyn ReservationRepository>,
) -> DomainResult<()> {
    let overdue = reservations.find_overdue(Utc::now()).await?;

    if overdue.is_empty() {
        return Ok(());
    }

    info!(count = overdue.len(), "Completing overdue reservations");

    for reservation in overdue {
        if let Err(e) = service
            .update_reservation_status(reservation.id, ReservationStatus::Completed)
            .await
        {
            warn!(
                reservation_id = reservation.id,
                error = %e,
                "Failed to complete overdue reservation"
            );
        }
    }

    Ok(())
}
