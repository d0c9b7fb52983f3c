use super::helpers::fetch_booking_for_update;
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{BookingAPI, MessageAPI},
    auth::User,
    entities::Message,
    error::Error,
    realtime::Event,
};

#[async_trait]
impl MessageAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn post_message(
        &self,
        user: User,
        booking_id: Uuid,
        content: &str,
    ) -> Result<Message, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the row lock pins the booking for the duration of the insert, so
        // a concurrent cancellation cannot orphan the message
        let booking = fetch_booking_for_update(&mut tx, &booking_id).await?;

        self.authorize(user.clone(), "post_message", booking.clone())?;

        let message = Message::new(booking.id, user.id, content)?;

        tx.execute(
            sqlx::query(
                "INSERT INTO messages (id, booking_id, created_at, data) VALUES ($1, $2, $3, $4)",
            )
            .bind(&message.id)
            .bind(&message.booking_id)
            .bind(message.created_at)
            .bind(Json(&message)),
        )
        .await?;

        tx.commit().await?;

        self.notifier.publish(Event::MessagePosted {
            message: message.clone(),
            rider_id: booking.rider_id,
            driver_id: booking.driver_id,
        });

        Ok(message)
    }

    #[tracing::instrument(skip(self))]
    async fn list_messages(&self, user: User, booking_id: Uuid) -> Result<Vec<Message>, Error> {
        // find_booking already rejects non-participants
        self.find_booking(user, booking_id).await?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM messages WHERE booking_id = $1 ORDER BY created_at ASC, id ASC",
                )
                .bind(&booking_id),
            )
            .await?;

        let mut messages = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(message): Json<Message> = result.try_get("data")?;
            messages.push(message);
        }

        Ok(messages)
    }
}
