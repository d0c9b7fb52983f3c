use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::ProfileAPI,
    auth::User,
    entities::{Profile, ProfileUpdate},
    error::{not_found_error, validation_error, Error},
};

#[async_trait]
impl ProfileAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, _user: User, id: Uuid) -> Result<Profile, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM profiles WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(not_found_error)?;
        let Json(profile): Json<Profile> = result.try_get("data")?;

        Ok(profile)
    }

    /// Upserts the caller's names in a single statement; an existing
    /// avatar_url survives because the merge happens inside the database,
    /// not across a read-then-write.
    #[tracing::instrument(skip(self))]
    async fn save_profile(&self, user: User, update: ProfileUpdate) -> Result<Profile, Error> {
        let profile = Profile::new(user.id, update)?;

        let mut conn = self.pool.acquire().await?;

        let Json(saved): Json<Profile> = conn
            .fetch_one(
                sqlx::query(
                    "INSERT INTO profiles (id, data) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET data = excluded.data || jsonb_build_object('avatar_url', profiles.data->'avatar_url') RETURNING data",
                )
                .bind(&profile.id)
                .bind(Json(&profile)),
            )
            .await?
            .try_get("data")?;

        Ok(saved)
    }

    #[tracing::instrument(skip(self))]
    async fn update_avatar(&self, user: User, avatar_url: String) -> Result<Profile, Error> {
        let mut placeholder = Profile::empty(user.id);
        placeholder.avatar_url = Some(avatar_url);

        let mut conn = self.pool.acquire().await?;

        // only the avatar key is touched on an existing row
        let Json(saved): Json<Profile> = conn
            .fetch_one(
                sqlx::query(
                    "INSERT INTO profiles (id, data) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET data = jsonb_set(profiles.data, '{avatar_url}', excluded.data->'avatar_url') RETURNING data",
                )
                .bind(&placeholder.id)
                .bind(Json(&placeholder)),
            )
            .await?
            .try_get("data")?;

        Ok(saved)
    }
}

impl Engine {
    /// Gate shared by offering and booking: the acting user must have a
    /// profile with name and surname filled in.
    pub(super) async fn require_complete_profile(
        &self,
        user_id: Uuid,
        message: &str,
    ) -> Result<Profile, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM profiles WHERE id = $1").bind(&user_id))
            .await?;

        let profile: Profile = match maybe_result {
            Some(result) => {
                let Json(profile) = result.try_get("data")?;
                profile
            }
            None => return Err(validation_error(message)),
        };

        if !profile.is_complete() {
            return Err(validation_error(message));
        }

        Ok(profile)
    }
}
