//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// User entity as stored in the credential store
///
/// Deliberately not `Serialize`: responses go through [`PublicUser`].
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<Vec<u8>>,
    pub profile_image_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Profile image with its content type, if one was uploaded
    pub fn profile_image(&self) -> Option<ProfileImage> {
        match (&self.profile_image, &self.profile_image_type) {
            (Some(data), Some(content_type)) => Some(ProfileImage {
                data: data.clone(),
                content_type: content_type.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("has_profile_image", &self.profile_image.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Binary profile image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Email and password as submitted to signup and login
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Public projection of a user, the only shape ever sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub has_profile_image: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            has_profile_image: user.profile_image.is_some(),
            created_at: user.created_at,
        }
    }
}
