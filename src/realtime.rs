use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entities::{Booking, Message};

/// A mutation fanned out to the two booking parties. Events carry the full
/// updated record plus both participant ids so subscribers can be filtered
/// without a lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    BookingChanged {
        booking: Booking,
    },
    BookingRemoved {
        id: Uuid,
        ride_id: Uuid,
        rider_id: Uuid,
        driver_id: Uuid,
    },
    MessagePosted {
        message: Message,
        rider_id: Uuid,
        driver_id: Uuid,
    },
}

impl Event {
    /// Whether this event belongs to one of the user's topics: bookings
    /// they are party to, or messages on those bookings.
    pub fn concerns(&self, user_id: Uuid) -> bool {
        match self {
            Self::BookingChanged { booking } => {
                booking.rider_id == user_id || booking.driver_id == user_id
            }
            Self::BookingRemoved {
                rider_id,
                driver_id,
                ..
            }
            | Self::MessagePosted {
                rider_id,
                driver_id,
                ..
            } => *rider_id == user_id || *driver_id == user_id,
        }
    }
}

/// Fan-out hub. Publication happens after the originating transaction
/// commits, so receivers observe events in commit order. Delivery is
/// advisory: a lagged receiver is told to resync and must re-fetch.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Event>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);

        Self { tx }
    }

    pub fn publish(&self, event: Event) {
        // a send error only means nobody is listening right now
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("no subscribers for event: {}", err);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[test]
fn events_reach_both_parties_and_nobody_else() {
    let rider_id = Uuid::new_v4();
    let driver_id = Uuid::new_v4();
    let stranger_id = Uuid::new_v4();

    let booking = Booking::new(Uuid::new_v4(), rider_id, driver_id);
    let event = Event::BookingChanged { booking };

    assert!(event.concerns(rider_id));
    assert!(event.concerns(driver_id));
    assert!(!event.concerns(stranger_id));

    let message = Message::new(Uuid::new_v4(), rider_id, "see you at 8").unwrap();
    let event = Event::MessagePosted {
        message,
        rider_id,
        driver_id,
    };

    assert!(event.concerns(rider_id));
    assert!(event.concerns(driver_id));
    assert!(!event.concerns(stranger_id));
}

#[test]
fn published_events_arrive_in_order() {
    tokio_test::block_on(async {
        let notifier = Notifier::new(16);
        let mut rx = notifier.subscribe();

        let rider_id = Uuid::new_v4();
        let driver_id = Uuid::new_v4();
        let booking = Booking::new(Uuid::new_v4(), rider_id, driver_id);

        notifier.publish(Event::BookingChanged {
            booking: booking.clone(),
        });
        notifier.publish(Event::BookingRemoved {
            id: booking.id,
            ride_id: booking.ride_id,
            rider_id,
            driver_id,
        });

        match rx.recv().await.unwrap() {
            Event::BookingChanged { booking: received } => assert_eq!(received.id, booking.id),
            other => panic!("unexpected event: {:?}", other),
        }

        match rx.recv().await.unwrap() {
            Event::BookingRemoved { id, .. } => assert_eq!(id, booking.id),
            other => panic!("unexpected event: {:?}", other),
        }
    });
}

#[test]
fn publish_without_subscribers_is_harmless() {
    let notifier = Notifier::new(4);

    notifier.publish(Event::BookingChanged {
        booking: Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()),
    });
}
