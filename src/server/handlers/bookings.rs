use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Booking, Decision};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    ride_id: Uuid,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Booking>, Error> {
    let booking = api.request_booking(user, params.ride_id).await?;

    Ok(booking.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.find_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn list_own(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_rider_bookings(user).await?;

    Ok(bookings.into())
}

pub async fn list_for_ride(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_ride_bookings(user, id).await?;

    Ok(bookings.into())
}

pub async fn driver_accept(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.respond_as_driver(user, id, Decision::Accept).await?;

    Ok(booking.into())
}

pub async fn driver_reject(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.respond_as_driver(user, id, Decision::Reject).await?;

    Ok(booking.into())
}

pub async fn rider_accept(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.respond_as_rider(user, id, Decision::Accept).await?;

    Ok(booking.into())
}

pub async fn rider_reject(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.respond_as_rider(user, id, Decision::Reject).await?;

    Ok(booking.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.cancel_booking(user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
