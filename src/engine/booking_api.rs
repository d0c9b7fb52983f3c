use super::helpers::{fetch_booking_for_update, fetch_ride_for_update, update_booking, update_ride};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::BookingAPI,
    auth::{Platform, User},
    entities::{Booking, Decision, Party, Ride},
    error::{conflict_error, not_found_error, validation_error, Error},
    realtime::Event,
};

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn request_booking(&self, user: User, ride_id: Uuid) -> Result<Booking, Error> {
        self.authorize(user.clone(), "request_booking", Platform::marketplace())?;

        self.require_complete_profile(user.id, "complete your profile before booking a ride")
            .await?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the ride lock serializes racing requests for the same ride, so
        // the seat check and the duplicate check stay consistent
        let ride = fetch_ride_for_update(&mut tx, &ride_id).await?;

        if ride.driver_id == user.id {
            return Err(validation_error("you cannot book your own ride"));
        }

        if !ride.is_bookable() {
            return Err(conflict_error("ride unavailable"));
        }

        let duplicate = tx
            .fetch_optional(
                sqlx::query(
                    "SELECT id FROM bookings WHERE ride_id = $1 AND rider_id = $2 AND status <> 'rejected'",
                )
                .bind(&ride_id)
                .bind(&user.id),
            )
            .await?;

        if duplicate.is_some() {
            return Err(conflict_error("you already requested this ride"));
        }

        let booking = Booking::new(ride.id, user.id, ride.driver_id);

        tx.execute(
            sqlx::query(
                "INSERT INTO bookings (id, ride_id, rider_id, driver_id, status, created_at, data) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&booking.id)
            .bind(&booking.ride_id)
            .bind(&booking.rider_id)
            .bind(&booking.driver_id)
            .bind(booking.status.name())
            .bind(booking.created_at)
            .bind(Json(&booking)),
        )
        .await?;

        tx.commit().await?;

        self.notifier.publish(Event::BookingChanged {
            booking: booking.clone(),
        });

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(not_found_error)?;
        let Json(booking): Json<Booking> = result.try_get("data")?;

        self.authorize(user, "read", booking.clone())?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn list_rider_bookings(&self, user: User) -> Result<Vec<Booking>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM bookings WHERE rider_id = $1 ORDER BY created_at DESC",
                )
                .bind(&user.id),
            )
            .await?;

        let mut bookings = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(booking): Json<Booking> = result.try_get("data")?;
            bookings.push(booking);
        }

        Ok(bookings)
    }

    #[tracing::instrument(skip(self))]
    async fn list_ride_bookings(&self, user: User, ride_id: Uuid) -> Result<Vec<Booking>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM rides WHERE id = $1").bind(&ride_id))
            .await?;

        let result = maybe_result.ok_or_else(not_found_error)?;
        let Json(ride): Json<Ride> = result.try_get("data")?;

        self.authorize(user, "list_bookings", ride)?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bookings WHERE ride_id = $1 ORDER BY created_at ASC")
                    .bind(&ride_id),
            )
            .await?;

        let mut bookings = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(booking): Json<Booking> = result.try_get("data")?;
            bookings.push(booking);
        }

        Ok(bookings)
    }

    #[tracing::instrument(skip(self))]
    async fn respond_as_driver(
        &self,
        user: User,
        id: Uuid,
        decision: Decision,
    ) -> Result<Booking, Error> {
        self.respond(user, id, Party::Driver, decision).await
    }

    #[tracing::instrument(skip(self))]
    async fn respond_as_rider(
        &self,
        user: User,
        id: Uuid,
        decision: Decision,
    ) -> Result<Booking, Error> {
        self.respond(user, id, Party::Rider, decision).await
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the row lock makes cancel and a concurrent confirm mutually
        // exclusive
        let booking = fetch_booking_for_update(&mut tx, &id).await?;

        self.authorize(user, "cancel", booking.clone())?;

        if booking.is_confirmed() {
            return Err(conflict_error("confirmed booking cannot be cancelled"));
        }

        // the thread goes with the booking via the FK cascade
        tx.execute(sqlx::query("DELETE FROM bookings WHERE id = $1").bind(&id))
            .await?;

        tx.commit().await?;

        self.notifier.publish(Event::BookingRemoved {
            id: booking.id,
            ride_id: booking.ride_id,
            rider_id: booking.rider_id,
            driver_id: booking.driver_id,
        });

        Ok(())
    }
}

impl Engine {
    /// Applies one party's answer to the handshake. The booking row lock
    /// serializes concurrent responses; the confirming accept additionally
    /// locks the ride row, so the status transition and the seat decrement
    /// commit as one unit or not at all.
    async fn respond(
        &self,
        user: User,
        id: Uuid,
        party: Party,
        decision: Decision,
    ) -> Result<Booking, Error> {
        let action = match party {
            Party::Driver => "respond_as_driver",
            Party::Rider => "respond_as_rider",
        };

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;

        self.authorize(user, action, booking.clone())?;

        match decision {
            Decision::Reject => {
                booking.reject(party)?;
                update_booking(&mut tx, &booking).await?;
            }
            Decision::Accept => {
                let newly_confirmed = booking.accept(party)?;

                if newly_confirmed {
                    let mut ride = fetch_ride_for_update(&mut tx, &booking.ride_id).await?;

                    if let Err(err) = ride.reserve_seat() {
                        // capacity raced away between request and confirm;
                        // close the booking rather than leave it falsely
                        // confirmed, and surface the conflict
                        tracing::warn!("seats exhausted, closing booking {}", booking.id);

                        booking.close_unfulfillable();
                        update_booking(&mut tx, &booking).await?;
                        tx.commit().await?;

                        self.notifier.publish(Event::BookingChanged { booking });

                        return Err(err);
                    }

                    update_ride(&mut tx, &ride).await?;
                }

                update_booking(&mut tx, &booking).await?;
            }
        }

        tx.commit().await?;

        self.notifier.publish(Event::BookingChanged {
            booking: booking.clone(),
        });

        Ok(booking)
    }
}
