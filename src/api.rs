use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    Booking, Decision, Message, NewRide, Profile, ProfileUpdate, Ride, RideQuery, RideSummary,
};
use crate::error::Error;

#[async_trait]
pub trait RideAPI {
    async fn create_ride(&self, user: User, params: NewRide) -> Result<Ride, Error>;

    async fn find_ride(&self, user: User, id: Uuid) -> Result<Ride, Error>;

    async fn search_rides(&self, user: User, query: RideQuery) -> Result<Vec<RideSummary>, Error>;

    async fn list_driver_rides(&self, user: User) -> Result<Vec<Ride>, Error>;

    async fn delete_ride(&self, user: User, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn request_booking(&self, user: User, ride_id: Uuid) -> Result<Booking, Error>;

    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    async fn list_rider_bookings(&self, user: User) -> Result<Vec<Booking>, Error>;

    async fn list_ride_bookings(&self, user: User, ride_id: Uuid) -> Result<Vec<Booking>, Error>;

    async fn respond_as_driver(
        &self,
        user: User,
        id: Uuid,
        decision: Decision,
    ) -> Result<Booking, Error>;

    async fn respond_as_rider(
        &self,
        user: User,
        id: Uuid,
        decision: Decision,
    ) -> Result<Booking, Error>;

    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait MessageAPI {
    async fn post_message(
        &self,
        user: User,
        booking_id: Uuid,
        content: &str,
    ) -> Result<Message, Error>;

    async fn list_messages(&self, user: User, booking_id: Uuid) -> Result<Vec<Message>, Error>;
}

#[async_trait]
pub trait ProfileAPI {
    async fn find_profile(&self, user: User, id: Uuid) -> Result<Profile, Error>;

    async fn save_profile(&self, user: User, update: ProfileUpdate) -> Result<Profile, Error>;

    async fn update_avatar(&self, user: User, avatar_url: String) -> Result<Profile, Error>;
}

pub trait API: RideAPI + BookingAPI + MessageAPI + ProfileAPI {}
