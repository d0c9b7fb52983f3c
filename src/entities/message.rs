use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{validation_error, Error};

/// One entry in a booking's negotiation thread. Append-only; never edited
/// or individually deleted, only removed when the owning booking goes away.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(booking_id: Uuid, sender_id: Uuid, content: &str) -> Result<Self, Error> {
        let content = content.trim().to_string();

        if content.is_empty() {
            return Err(validation_error("message content is required"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            booking_id,
            sender_id,
            content,
            created_at: Utc::now(),
        })
    }
}

#[test]
fn message_content_is_trimmed() {
    let message = Message::new(Uuid::new_v4(), Uuid::new_v4(), "  on my way  ").unwrap();

    assert_eq!(message.content, "on my way");
}

#[test]
fn empty_message_is_rejected() {
    assert!(Message::new(Uuid::new_v4(), Uuid::new_v4(), "").is_err());
    assert!(Message::new(Uuid::new_v4(), Uuid::new_v4(), "   ").is_err());
}

#[test]
fn timestamps_are_monotonic_per_thread() {
    let booking_id = Uuid::new_v4();
    let sender_id = Uuid::new_v4();

    let first = Message::new(booking_id, sender_id, "hello").unwrap();
    let second = Message::new(booking_id, sender_id, "still there?").unwrap();

    assert!(second.created_at >= first.created_at);
}
