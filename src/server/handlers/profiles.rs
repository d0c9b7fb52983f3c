use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Json, Path};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Profile, ProfileUpdate};
use crate::error::Error;
use crate::external::ObjectStorage;
use crate::server::DynAPI;

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, Error> {
    let profile = api.find_profile(user, id).await?;

    Ok(profile.into())
}

pub async fn save(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let profile = api.save_profile(user, update).await?;

    Ok(profile.into())
}

pub async fn upload_avatar(
    Extension(api): Extension<DynAPI>,
    Extension(storage): Extension<Arc<ObjectStorage>>,
    user: User,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Profile>, Error> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");

    let url = storage
        .upload_avatar(user.id, body.to_vec(), content_type)
        .await?;

    let profile = api.update_avatar(user, url).await?;

    Ok(profile.into())
}
