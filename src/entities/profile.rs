use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{validation_error, Error};

/// Public profile maintained by the identity side of the platform. The
/// engine reads it as a gate: nobody may offer or book a ride without a
/// complete profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub surname: String,
}

impl Profile {
    pub fn new(id: Uuid, update: ProfileUpdate) -> Result<Self, Error> {
        let name = update.name.trim().to_string();
        let surname = update.surname.trim().to_string();

        if name.is_empty() || surname.is_empty() {
            return Err(validation_error("name and surname are required"));
        }

        Ok(Self {
            id,
            name,
            surname,
            avatar_url: None,
        })
    }

    /// Placeholder row for users who only uploaded an avatar so far.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            name: String::new(),
            surname: String::new(),
            avatar_url: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.surname.trim().is_empty()
    }
}

// the profile upserts merge rows key-by-key in the database, so every
// serialized profile must carry the avatar_url key even when unset
#[test]
fn serialized_profile_always_carries_the_avatar_key() {
    let profile = Profile::empty(Uuid::new_v4());

    let value = serde_json::to_value(&profile).unwrap();
    assert!(value.get("avatar_url").is_some());
    assert!(value["avatar_url"].is_null());

    let mut profile = Profile::new(
        Uuid::new_v4(),
        ProfileUpdate {
            name: "Ada".into(),
            surname: "Lovelace".into(),
        },
    )
    .unwrap();
    profile.avatar_url = Some("http://localhost:9000/avatars/x".into());

    let value = serde_json::to_value(&profile).unwrap();
    assert_eq!(
        value["avatar_url"],
        serde_json::json!("http://localhost:9000/avatars/x")
    );
}

#[test]
fn profile_completeness_requires_both_names() {
    let id = Uuid::new_v4();

    assert!(!Profile::empty(id).is_complete());

    let profile = Profile::new(
        id,
        ProfileUpdate {
            name: "Ada".into(),
            surname: "Lovelace".into(),
        },
    )
    .unwrap();
    assert!(profile.is_complete());

    assert!(Profile::new(
        id,
        ProfileUpdate {
            name: "Ada".into(),
            surname: "  ".into(),
        }
    )
    .is_err());
}
