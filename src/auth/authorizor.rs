use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::{Booking, Ride};

pub fn new() -> Oso {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class()).unwrap();
    o.register_class(User::get_polar_class()).unwrap();
    o.register_class(Ride::get_polar_class()).unwrap();
    o.register_class(Booking::get_polar_class()).unwrap();

    o.load_str(include_str!("rules.polar")).unwrap();

    o
}

#[cfg(test)]
fn test_ride(driver_id: uuid::Uuid) -> Ride {
    use crate::entities::NewRide;
    use chrono::NaiveDate;

    Ride::new(
        driver_id,
        NewRide {
            from_location: "Milan".into(),
            to_location: "Turin".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            price: 10.0,
            seats: 2,
        },
    )
    .unwrap()
}

#[test]
fn platform_actions_are_open_to_any_user() {
    use uuid::Uuid;

    let authorizor = new();

    let user = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };

    let result = authorizor.is_allowed(user.clone(), "offer_ride", Platform::marketplace());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(user, "request_booking", Platform::marketplace());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn ride_driver_role_test() {
    use uuid::Uuid;

    let authorizor = new();

    let driver = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };
    let stranger = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };

    let ride = test_ride(driver.id);

    let result = authorizor.query_rule("has_role", (driver.clone(), "driver", ride.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.query_rule("has_role", (stranger.clone(), "driver", ride.clone()));
    assert!(result.unwrap().next().is_none());

    // postings are public
    let result = authorizor.is_allowed(stranger.clone(), "read", ride.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(driver.clone(), "delete", ride.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(stranger.clone(), "delete", ride.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(driver.clone(), "list_bookings", ride.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(stranger, "list_bookings", ride);
    assert_eq!(result.unwrap(), false);
}

#[test]
fn booking_party_roles_test() {
    use uuid::Uuid;

    let authorizor = new();

    let driver = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };
    let rider = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };
    let stranger = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };

    let booking = Booking::new(Uuid::new_v4(), rider.id, driver.id);

    let result = authorizor.query_rule("has_role", (driver.clone(), "driver", booking.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.query_rule("has_role", (rider.clone(), "rider", booking.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    // each party answers for itself
    let result = authorizor.is_allowed(driver.clone(), "respond_as_driver", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(rider.clone(), "respond_as_driver", booking.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(rider.clone(), "respond_as_rider", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(driver.clone(), "respond_as_rider", booking.clone());
    assert_eq!(result.unwrap(), false);

    // cancellation belongs to the rider
    let result = authorizor.is_allowed(rider.clone(), "cancel", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(driver.clone(), "cancel", booking.clone());
    assert_eq!(result.unwrap(), false);

    // the thread is private to the two parties
    for action in ["read", "post_message"] {
        let result = authorizor.is_allowed(driver.clone(), action, booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(rider.clone(), action, booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(stranger.clone(), action, booking.clone());
        assert_eq!(result.unwrap(), false);
    }
}

#[test]
fn system_role_test() {
    use uuid::Uuid;

    let authorizor = new();

    let system = User::new_system_user();
    let unprivileged = User {
        id: Uuid::new_v4(),
        roles: vec![],
    };

    let booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let result = authorizor.query_rule("has_role", (system.clone(), "system", booking.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.query_rule(
        "has_role",
        (unprivileged.clone(), "system", booking.clone()),
    );
    assert!(result.unwrap().next().is_none());

    let result = authorizor.is_allowed(system, "cancel", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(unprivileged, "cancel", booking);
    assert_eq!(result.unwrap(), false);
}
