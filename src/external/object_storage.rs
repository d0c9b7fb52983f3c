use std::time::Duration;

use uuid::Uuid;

use crate::error::{upstream_error, Error};

/// Client for the public object store holding avatar images. Uploads are
/// PUT-by-key; the key doubles as the public URL handed back to callers.
pub struct ObjectStorage {
    client: reqwest::Client,
    base_url: String,
}

impl ObjectStorage {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[tracing::instrument(skip(self, bytes))]
    pub async fn upload_avatar(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/avatars/{}", self.base_url, user_id);

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("avatar upload failed with status {}", response.status());
            return Err(upstream_error());
        }

        Ok(url)
    }
}

#[test]
fn base_url_is_normalized() {
    let storage = ObjectStorage::new("http://localhost:9000/ridepool/".into());

    assert_eq!(storage.base_url, "http://localhost:9000/ridepool");
}
