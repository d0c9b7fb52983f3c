use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::Message;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    content: String,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(booking_id): Path<Uuid>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Message>, Error> {
    let message = api.post_message(user, booking_id, &params.content).await?;

    Ok(message.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, Error> {
    let messages = api.list_messages(user, booking_id).await?;

    Ok(messages.into())
}
