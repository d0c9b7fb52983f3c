use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{conflict_error, Error};

/// A rider's request to occupy one seat on a ride. The booking becomes
/// binding only once both parties have explicitly accepted; a rejection by
/// either party is terminal.
#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct Booking {
    #[polar(attribute)]
    pub id: Uuid,
    #[polar(attribute)]
    pub ride_id: Uuid,
    #[polar(attribute)]
    pub rider_id: Uuid,
    #[polar(attribute)]
    pub driver_id: Uuid,
    pub status: Status,
    pub driver_accepted: bool,
    pub rider_accepted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Confirmed,
    Rejected,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Confirmed => "confirmed".into(),
            Self::Rejected => "rejected".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Party {
    Driver,
    Rider,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Booking {
    pub fn new(ride_id: Uuid, rider_id: Uuid, driver_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            ride_id,
            rider_id,
            driver_id,
            status: Status::Pending,
            driver_accepted: false,
            // requesting the booking is the rider's acceptance
            rider_accepted: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, Status::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, Status::Confirmed | Status::Rejected)
    }

    /// Records one party's acceptance. Returns `true` when this call
    /// completed the handshake, i.e. the caller must now reserve a seat.
    /// Accepting a side that already accepted is a no-op, so retries are
    /// safe.
    #[tracing::instrument]
    pub fn accept(&mut self, party: Party) -> Result<bool, Error> {
        match self.status {
            Status::Rejected => Err(conflict_error("booking already rejected")),
            Status::Confirmed => Ok(false),
            Status::Pending => {
                match party {
                    Party::Driver => self.driver_accepted = true,
                    Party::Rider => self.rider_accepted = true,
                }

                if self.driver_accepted && self.rider_accepted {
                    self.status = Status::Confirmed;
                    return Ok(true);
                }

                Ok(false)
            }
        }
    }

    /// Rejects a pending booking. Terminal: no transition leads out of the
    /// rejected state. Rejecting twice is a no-op; rejecting a confirmed
    /// booking is a conflict.
    #[tracing::instrument]
    pub fn reject(&mut self, party: Party) -> Result<(), Error> {
        match self.status {
            Status::Rejected => Ok(()),
            Status::Confirmed => Err(conflict_error("booking already confirmed")),
            Status::Pending => {
                match party {
                    Party::Driver => self.driver_accepted = false,
                    Party::Rider => self.rider_accepted = false,
                }

                self.status = Status::Rejected;
                Ok(())
            }
        }
    }

    /// Closes a booking whose confirming accept lost the race for the last
    /// seat. The acceptance flags stay as the parties set them; only the
    /// status is forced terminal so the booking is never left falsely
    /// confirmed.
    pub fn close_unfulfillable(&mut self) {
        self.status = Status::Rejected;
    }
}

#[test]
fn booking_starts_pending_with_rider_accepted() {
    let booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(booking.status, Status::Pending);
    assert!(booking.rider_accepted);
    assert!(!booking.driver_accepted);
    assert!(!booking.is_terminal());
}

#[test]
fn driver_accept_completes_the_handshake() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let newly_confirmed = booking.accept(Party::Driver).unwrap();

    assert!(newly_confirmed);
    assert_eq!(booking.status, Status::Confirmed);
    assert!(booking.driver_accepted && booking.rider_accepted);
}

#[test]
fn accept_is_idempotent() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    // the rider's side is already accepted at creation
    assert!(!booking.accept(Party::Rider).unwrap());
    assert_eq!(booking.status, Status::Pending);

    assert!(booking.accept(Party::Driver).unwrap());

    // a repeat accept must not report a second confirmation
    assert!(!booking.accept(Party::Driver).unwrap());
    assert_eq!(booking.status, Status::Confirmed);
}

#[test]
fn rejection_is_terminal() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    booking.reject(Party::Driver).unwrap();
    assert_eq!(booking.status, Status::Rejected);
    assert!(!booking.driver_accepted);

    // accept after reject never transitions to confirmed
    let result = booking.accept(Party::Rider);
    assert!(result.is_err());
    assert_eq!(booking.status, Status::Rejected);

    // repeated reject is a no-op
    booking.reject(Party::Driver).unwrap();
    assert_eq!(booking.status, Status::Rejected);
}

#[test]
fn confirmed_booking_cannot_be_rejected() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    booking.accept(Party::Driver).unwrap();

    assert!(booking.reject(Party::Driver).is_err());
    assert!(booking.reject(Party::Rider).is_err());
    assert_eq!(booking.status, Status::Confirmed);
}

#[test]
fn status_tracks_acceptance_flags() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(
        booking.is_confirmed(),
        booking.driver_accepted && booking.rider_accepted
    );

    booking.accept(Party::Driver).unwrap();

    assert_eq!(
        booking.is_confirmed(),
        booking.driver_accepted && booking.rider_accepted
    );
}

#[test]
fn losing_the_seat_race_closes_the_booking() {
    let mut booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    booking.accept(Party::Driver).unwrap();
    booking.close_unfulfillable();

    assert_eq!(booking.status, Status::Rejected);
    assert!(booking.accept(Party::Driver).is_err());
}
