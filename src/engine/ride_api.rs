use super::helpers::fetch_ride_for_update;
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::RideAPI,
    auth::{Platform, User},
    entities::{NewRide, Profile, Ride, RideQuery, RideSummary},
    error::{conflict_error, not_found_error, validation_error, Error},
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, user: User, params: NewRide) -> Result<Ride, Error> {
        self.authorize(user.clone(), "offer_ride", Platform::marketplace())?;

        self.require_complete_profile(user.id, "complete your profile before offering a ride")
            .await?;

        let ride = Ride::new(user.id, params)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO rides (id, driver_id, from_location, to_location, date, seats, data) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&ride.id)
            .bind(&ride.driver_id)
            .bind(&ride.from_location)
            .bind(&ride.to_location)
            .bind(ride.date)
            .bind(ride.seats)
            .bind(Json(&ride)),
        )
        .await?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride(&self, user: User, id: Uuid) -> Result<Ride, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM rides WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(not_found_error)?;
        let Json(ride): Json<Ride> = result.try_get("data")?;

        self.authorize(user, "read", ride.clone())?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn search_rides(&self, _user: User, query: RideQuery) -> Result<Vec<RideSummary>, Error> {
        let from_location = query.from_location.trim();
        let to_location = query.to_location.trim();

        if from_location.is_empty() || to_location.is_empty() {
            return Err(validation_error("origin and destination are required"));
        }

        let sql = "
            SELECT
                r.data AS ride,
                p.data AS driver
            FROM
                rides r
                LEFT JOIN profiles p ON p.id = r.driver_id
            WHERE
                r.from_location = $1
                AND r.to_location = $2
                AND ($3::date IS NULL OR r.date >= $3)
                AND r.seats > 0
            ORDER BY
                r.date ASC
        ";

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(sql)
                    .bind(from_location)
                    .bind(to_location)
                    .bind(query.date),
            )
            .await?;

        let mut summaries = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(ride): Json<Ride> = result.try_get("ride")?;
            let driver: Option<Json<Profile>> = result.try_get("driver")?;

            summaries.push(RideSummary {
                ride,
                driver: driver.map(|Json(profile)| profile),
            });
        }

        Ok(summaries)
    }

    #[tracing::instrument(skip(self))]
    async fn list_driver_rides(&self, user: User) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM rides WHERE driver_id = $1 ORDER BY date ASC")
                    .bind(&user.id),
            )
            .await?;

        let mut rides = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(ride): Json<Ride> = result.try_get("data")?;
            rides.push(ride);
        }

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_ride(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let ride = fetch_ride_for_update(&mut tx, &id).await?;

        self.authorize(user, "delete", ride.clone())?;

        // deletion is blocked while any negotiation is live; closed
        // (rejected) bookings and their threads go with the ride
        let open: i64 = tx
            .fetch_one(
                sqlx::query(
                    "SELECT COUNT(*) AS open FROM bookings WHERE ride_id = $1 AND status <> 'rejected'",
                )
                .bind(&id),
            )
            .await?
            .try_get("open")?;

        if open > 0 {
            return Err(conflict_error("ride has active bookings"));
        }

        // message threads follow their bookings via the FK cascade
        tx.execute(sqlx::query("DELETE FROM bookings WHERE ride_id = $1").bind(&id))
            .await?;

        tx.execute(sqlx::query("DELETE FROM rides WHERE id = $1").bind(&id))
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
