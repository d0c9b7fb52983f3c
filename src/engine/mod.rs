mod booking_api;
mod helpers;
mod message_api;
mod profile_api;
mod ride_api;

use oso::Oso;
use sqlx::{Executor, Pool, Postgres};

use crate::{
    api::API,
    auth::authorizor,
    error::{unauthorized_error, Error},
    realtime::Notifier,
};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    authorizor: Oso,
    notifier: Notifier,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, notifier: Notifier) -> Result<Self, Error> {
        // profiles are written by the identity side; the engine reads them
        // as the completeness gate and for driver display info
        pool.execute("CREATE TABLE IF NOT EXISTS profiles (id UUID PRIMARY KEY, data JSONB NOT NULL)")
            .await?;

        // scalar columns mirror the searchable fields; the entity itself
        // lives in the data column
        pool.execute("CREATE TABLE IF NOT EXISTS rides (id UUID PRIMARY KEY, driver_id UUID NOT NULL, from_location VARCHAR NOT NULL, to_location VARCHAR NOT NULL, date DATE NOT NULL, seats INT4 NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute(
            "CREATE INDEX IF NOT EXISTS rides_route_idx ON rides (from_location, to_location, date)",
        )
        .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS bookings (id UUID PRIMARY KEY, ride_id UUID NOT NULL REFERENCES rides(id), rider_id UUID NOT NULL, driver_id UUID NOT NULL, status VARCHAR NOT NULL, created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE INDEX IF NOT EXISTS bookings_ride_idx ON bookings (ride_id)")
            .await?;
        pool.execute("CREATE INDEX IF NOT EXISTS bookings_rider_idx ON bookings (rider_id)")
            .await?;

        // messages exist only for as long as their booking does
        pool.execute("CREATE TABLE IF NOT EXISTS messages (id UUID PRIMARY KEY, booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE, created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute(
            "CREATE INDEX IF NOT EXISTS messages_booking_idx ON messages (booking_id, created_at)",
        )
        .await?;

        Ok(Self {
            pool,
            authorizor: authorizor::new(),
            notifier,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
