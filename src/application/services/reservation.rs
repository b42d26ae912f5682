//! Reservation lifecycle service
//!
//! Drives the `Active -> Completed | Cancelled` state machine and the side
//! effects of each transition: spot claim/release on the parking service,
//! event publication, and best-effort push notifications to the driver.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::ports::NotificationDispatcher;
use crate::application::services::{ParkingService, ProfileService};
use crate::domain::{
    CreateReservationCommand, DeviceTokenRepository, DomainResult, Reservation,
    ReservationRepository, ReservationStatus,
};
use crate::notifications::events::{
    Event, ReservationCreatedEvent, ReservationStatusChangedEvent,
};
use crate::notifications::SharedEventBus;

/// Title used for the booking confirmation push
const CONFIRMATION_TITLE: &str = "Reservation confirmed";

/// Service for reservation operations
pub struct ReservationService {
    reservations: Arc<dyn ReservationRepository>,
    parking: Arc<ParkingService>,
    profiles: Arc<ProfileService>,
    tokens: Arc<dyn DeviceTokenRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    event_bus: SharedEventBus,
}

impl ReservationService {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        parking: Arc<ParkingService>,
        profiles: Arc<ProfileService>,
        tokens: Arc<dyn DeviceTokenRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            reservations,
            parking,
            profiles,
            tokens,
            dispatcher,
            event_bus,
        }
    }

    /// Book a spot for a driver.
    ///
    /// Returns `Ok(None)` when the lot has no configured rate: a legitimate
    /// business outcome, not an error, and nothing is persisted or claimed
    /// on that path. Missing driver profile, unknown spot, and an
    /// unavailable spot are hard failures.
    pub async fn create_reservation(
        &self,
        cmd: CreateReservationCommand,
    ) -> DomainResult<Option<Reservation>> {
        let driver_name = self.profiles.get_driver_full_name(cmd.driver_id).await?;
        let spot_label = self.parking.get_spot_label(cmd.spot_id, cmd.lot_id).await?;

        let Some(rate) = self.parking.get_rate_per_hour(cmd.lot_id).await? else {
            info!(
                lot_id = cmd.lot_id,
                "No rate configured for parking; reservation not created"
            );
            return Ok(None);
        };

        // Claim the spot first: the Available check and the counter
        // decrement are one atomic unit, so concurrent bookings of the same
        // spot resolve to exactly one winner before anything is persisted.
        self.parking.reserve_spot(cmd.lot_id, cmd.spot_id).await?;

        let id = self.reservations.next_id().await;
        let reservation = Reservation::new(id, cmd, rate);

        if let Err(e) = self.reservations.save(reservation.clone()).await {
            warn!(
                reservation_id = id,
                error = %e,
                "Persisting reservation failed; releasing claimed spot"
            );
            if let Err(release_err) = self.parking.release_spot(cmd.lot_id, cmd.spot_id).await {
                warn!(
                    lot_id = cmd.lot_id,
                    spot_id = %cmd.spot_id,
                    error = %release_err,
                    "Releasing spot after failed persist also failed"
                );
            }
            return Err(e);
        }

        info!(
            reservation_id = reservation.id,
            driver_id = reservation.driver_id,
            lot_id = reservation.lot_id,
            spot_id = %reservation.spot_id,
            "Reservation created"
        );

        self.event_bus
            .publish(Event::ReservationCreated(ReservationCreatedEvent {
                reservation_id: reservation.id,
                driver_id: reservation.driver_id,
                lot_id: reservation.lot_id,
                spot_id: reservation.spot_id,
                timestamp: chrono::Utc::now(),
            }));

        self.dispatch_confirmation(&reservation, driver_name, spot_label);

        Ok(Some(reservation))
    }

    /// Apply a status transition to a reservation.
    ///
    /// An unknown reservation id yields `Ok(None)` with no side effects.
    /// A reservation already in a terminal state is returned unchanged:
    /// terminal states are frozen, so repeated terminal updates release the
    /// spot exactly once. Transitions into `Completed` or `Cancelled`
    /// release the spot and restore the lot's available count.
    pub async fn update_reservation_status(
        &self,
        reservation_id: i64,
        new_status: ReservationStatus,
    ) -> DomainResult<Option<Reservation>> {
        let Some(mut reservation) = self.reservations.find_by_id(reservation_id).await? else {
            info!(reservation_id, "Reservation not found; status not updated");
            return Ok(None);
        };

        if reservation.status.is_terminal() {
            debug!(
                reservation_id,
                status = %reservation.status,
                "Reservation already terminal; update ignored"
            );
            return Ok(Some(reservation));
        }

        let previous = reservation.status;
        reservation.update_status(new_status);

        if new_status.is_terminal() {
            self.parking
                .release_spot(reservation.lot_id, reservation.spot_id)
                .await?;
        }

        self.reservations.update(reservation.clone()).await?;

        info!(
            reservation_id,
            from = %previous,
            to = %new_status,
            "Reservation status updated"
        );

        self.event_bus.publish(Event::ReservationStatusChanged(
            ReservationStatusChangedEvent {
                reservation_id,
                lot_id: reservation.lot_id,
                old_status: previous.as_str().to_string(),
                new_status: new_status.as_str().to_string(),
                timestamp: chrono::Utc::now(),
            },
        ));

        Ok(Some(reservation))
    }

    pub async fn get_reservation(&self, id: i64) -> DomainResult<Option<Reservation>> {
        self.reservations.find_by_id(id).await
    }

    pub async fn list_for_driver(&self, driver_id: i64) -> DomainResult<Vec<Reservation>> {
        self.reservations.find_by_driver(driver_id).await
    }

    /// Send the booking confirmation to every device token the driver has
    /// registered. Runs as a detached task outside any lot lock; delivery
    /// failures are logged and never affect the committed reservation.
    fn dispatch_confirmation(
        &self,
        reservation: &Reservation,
        driver_name: String,
        spot_label: String,
    ) {
        let driver_id = reservation.driver_id;
        let reservation_id = reservation.id;
        let tokens = Arc::clone(&self.tokens);
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let registered = match tokens.find_by_user_id(driver_id).await {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!(driver_id, error = %e, "Device token lookup failed");
                    return;
                }
            };

            if registered.is_empty() {
                debug!(driver_id, "Driver has no registered device tokens");
                return;
            }

            let body = format!(
                "{}, your reservation for spot {} has been confirmed.",
                driver_name, spot_label
            );

            for device in registered {
                if let Err(e) = dispatcher
                    .send_notification_to_user(&device.token, CONFIRMATION_TITLE, &body)
                    .await
                {
                    warn!(
                        driver_id,
                        reservation_id,
                        error = %e,
                        "Push notification delivery failed"
                    );
                }
            }
        });
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{
        eventually, new_reservation_service, sample_parking_cmd, sample_reservation_cmd,
    };
    use crate::domain::{DeviceToken, DomainError, SpotStatus};

    #[tokio::test]
    async fn booking_claims_spot_and_persists_active_reservation() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();

        let reservation = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .expect("reservation should be created");

        assert_eq!(reservation.status, ReservationStatus::Active);
        assert!((reservation.rate_per_hour - 10.0).abs() < f32::EPSILON);

        let updated_spot = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(updated_spot.status, SpotStatus::Reserved);

        let reloaded_lot = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(reloaded_lot.available_spots, 0);

        let stored = service.get_reservation(reservation.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn booking_without_rate_is_a_soft_fail() {
        let (service, ctx) = new_reservation_service().await;
        let mut cmd = sample_parking_cmd(5);
        cmd.rate_per_hour = None;
        let lot = ctx.parking.create_parking(cmd).await.unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();

        let result = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap();
        assert!(result.is_none());

        // nothing persisted, nothing claimed
        assert!(service.list_for_driver(1).await.unwrap().is_empty());
        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Available);
        let lot_after = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(lot_after.available_spots, 1);
    }

    #[tokio::test]
    async fn booking_unknown_driver_propagates_not_found() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();

        let err = service
            .create_reservation(sample_reservation_cmd(77, lot.id, spot.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        // the spot was never claimed
        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Available);
    }

    #[tokio::test]
    async fn booking_sends_confirmation_to_registered_tokens() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();
        ctx.tokens
            .save(DeviceToken::new(1, "test-device-token"))
            .await
            .unwrap();

        service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .unwrap();

        eventually(|| !ctx.dispatcher.sent().is_empty()).await;

        let sent = ctx.dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "test-device-token");
        assert_eq!(sent[0].title, "Reservation confirmed");
        assert!(sent[0].body.contains("John Doe"));
        assert!(sent[0].body.contains("A1"));
    }

    #[tokio::test]
    async fn failed_push_delivery_does_not_affect_reservation() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();
        ctx.tokens
            .save(DeviceToken::new(1, "test-device-token"))
            .await
            .unwrap();
        ctx.dispatcher.fail_next_sends();

        let reservation = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .unwrap();

        eventually(|| ctx.dispatcher.attempts() > 0).await;

        let stored = service.get_reservation(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Active);
        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Reserved);
    }

    #[tokio::test]
    async fn completing_reservation_releases_spot_once() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(1))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();

        let reservation = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .unwrap();

        let updated = service
            .update_reservation_status(reservation.id, ReservationStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Completed);

        let lot_after = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(lot_after.available_spots, 1);
        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Available);

        // repeating the terminal update neither errors nor double-releases
        let repeated = service
            .update_reservation_status(reservation.id, ReservationStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(repeated.status, ReservationStatus::Completed);
        let lot_repeat = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(lot_repeat.available_spots, 1);
    }

    #[tokio::test]
    async fn cancelling_reservation_releases_spot() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();

        let reservation = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .unwrap();

        service
            .update_reservation_status(reservation.id, ReservationStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();

        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Available);
    }

    #[tokio::test]
    async fn active_update_has_no_spot_side_effect() {
        let (service, ctx) = new_reservation_service().await;
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(5))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();

        let reservation = service
            .create_reservation(sample_reservation_cmd(1, lot.id, spot.id))
            .await
            .unwrap()
            .unwrap();

        service
            .update_reservation_status(reservation.id, ReservationStatus::Active)
            .await
            .unwrap()
            .unwrap();

        let spot_after = ctx.parking.get_spot(lot.id, spot.id).await.unwrap();
        assert_eq!(spot_after.status, SpotStatus::Reserved);
        let lot_after = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(lot_after.available_spots, 0);
    }

    #[tokio::test]
    async fn unknown_reservation_update_is_a_soft_fail() {
        let (service, _ctx) = new_reservation_service().await;

        let result = service
            .update_reservation_status(999, ReservationStatus::Completed)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn concurrent_bookings_of_same_spot_create_one_reservation() {
        let (service, ctx) = new_reservation_service().await;
        let service = Arc::new(service);
        let lot = ctx
            .parking
            .create_parking(sample_parking_cmd(1))
            .await
            .unwrap();
        let spot = ctx
            .parking
            .add_parking_spot(lot.id, "A1", SpotStatus::Available)
            .await
            .unwrap();
        ctx.profiles.create_driver(1, "John", "Doe", None).await.unwrap();
        ctx.profiles.create_driver(2, "Jane", "Roe", None).await.unwrap();

        let mut handles = Vec::new();
        for driver_id in [1, 2] {
            let service = service.clone();
            let cmd = sample_reservation_cmd(driver_id, lot.id, spot.id);
            handles.push(tokio::spawn(
                async move { service.create_reservation(cmd).await },
            ));
        }

        let mut created = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(Some(_)) => created += 1,
                Ok(None) => panic!("soft fail not expected here"),
                Err(DomainError::SpotUnavailable { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(rejected, 1);

        let lot_after = ctx.parking.get_parking(lot.id).await.unwrap().unwrap();
        assert_eq!(lot_after.available_spots, 0);
    }
}
