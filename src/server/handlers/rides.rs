use axum::extract::{Extension, Json, Path, Query};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{NewRide, Ride, RideQuery, RideSummary};
use crate::error::Error;
use crate::server::DynAPI;

#[axum_macros::debug_handler]
pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<NewRide>,
) -> Result<Json<Ride>, Error> {
    let ride = api.create_ride(user, params).await?;

    Ok(ride.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, Error> {
    let ride = api.find_ride(user, id).await?;

    Ok(ride.into())
}

pub async fn search(
    Extension(api): Extension<DynAPI>,
    user: User,
    Query(query): Query<RideQuery>,
) -> Result<Json<Vec<RideSummary>>, Error> {
    let summaries = api.search_rides(user, query).await?;

    Ok(summaries.into())
}

pub async fn list_own(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.list_driver_rides(user).await?;

    Ok(rides.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.delete_ride(user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
