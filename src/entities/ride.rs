use chrono::{DateTime, NaiveDate, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Profile;
use crate::error::{conflict_error, validation_error, Error};

/// A driver's posted trip with capacity and price. Seats never go negative;
/// the only decrement happens when a booking reaches dual confirmation.
#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct Ride {
    #[polar(attribute)]
    pub id: Uuid,
    #[polar(attribute)]
    pub driver_id: Uuid,
    pub from_location: String,
    pub to_location: String,
    pub date: NaiveDate,
    pub price: f64,
    pub seats: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewRide {
    pub from_location: String,
    pub to_location: String,
    pub date: NaiveDate,
    pub price: f64,
    pub seats: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RideQuery {
    pub from_location: String,
    pub to_location: String,
    pub date: Option<NaiveDate>,
}

/// Search result row: the ride joined with the driver's public profile,
/// when one exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct RideSummary {
    pub ride: Ride,
    pub driver: Option<Profile>,
}

impl Ride {
    pub fn new(driver_id: Uuid, params: NewRide) -> Result<Self, Error> {
        let from_location = params.from_location.trim().to_string();
        let to_location = params.to_location.trim().to_string();

        if from_location.is_empty() || to_location.is_empty() {
            return Err(validation_error("origin and destination are required"));
        }

        if !params.price.is_finite() || params.price < 0.0 {
            return Err(validation_error("price must be zero or positive"));
        }

        if params.seats < 1 {
            return Err(validation_error("a ride must offer at least one seat"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            from_location,
            to_location,
            date: params.date,
            price: params.price,
            seats: params.seats,
            created_at: Utc::now(),
        })
    }

    pub fn is_bookable(&self) -> bool {
        self.seats > 0
    }

    /// Takes one seat out of inventory. Callers hold the ride's row lock, so
    /// the check and the decrement are a single unit.
    #[tracing::instrument]
    pub fn reserve_seat(&mut self) -> Result<(), Error> {
        if self.seats <= 0 {
            return Err(conflict_error("ride unavailable"));
        }

        self.seats -= 1;
        Ok(())
    }
}

#[cfg(test)]
fn params() -> NewRide {
    NewRide {
        from_location: "Milan".into(),
        to_location: "Turin".into(),
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        price: 12.5,
        seats: 3,
    }
}

#[test]
fn new_ride_trims_and_validates_locations() {
    let ride = Ride::new(
        Uuid::new_v4(),
        NewRide {
            from_location: "  Milan ".into(),
            ..params()
        },
    )
    .unwrap();

    assert_eq!(ride.from_location, "Milan");

    let result = Ride::new(
        Uuid::new_v4(),
        NewRide {
            to_location: "   ".into(),
            ..params()
        },
    );
    assert!(result.is_err());
}

#[test]
fn new_ride_rejects_bad_price_and_seats() {
    assert!(Ride::new(
        Uuid::new_v4(),
        NewRide {
            price: -1.0,
            ..params()
        }
    )
    .is_err());

    assert!(Ride::new(
        Uuid::new_v4(),
        NewRide {
            price: f64::NAN,
            ..params()
        }
    )
    .is_err());

    assert!(Ride::new(
        Uuid::new_v4(),
        NewRide {
            seats: 0,
            ..params()
        }
    )
    .is_err());

    // a free ride is allowed
    assert!(Ride::new(
        Uuid::new_v4(),
        NewRide {
            price: 0.0,
            ..params()
        }
    )
    .is_ok());
}

#[test]
fn seats_never_go_negative() {
    let mut ride = Ride::new(Uuid::new_v4(), NewRide { seats: 2, ..params() }).unwrap();

    ride.reserve_seat().unwrap();
    ride.reserve_seat().unwrap();
    assert_eq!(ride.seats, 0);
    assert!(!ride.is_bookable());

    assert!(ride.reserve_seat().is_err());
    assert_eq!(ride.seats, 0);
}
