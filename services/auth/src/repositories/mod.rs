//! Credential store abstraction and its implementations

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, ProfileImage, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserRepository;
pub use user::UserRepository;

/// Errors raised by a credential store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The email is already taken; raised by the store's own uniqueness check
    #[error("Email already registered")]
    Duplicate,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user credentials
///
/// Implementations must enforce email uniqueness themselves so concurrent
/// registrations cannot produce two records for one email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, failing with [`StoreError::Duplicate`] if the email exists
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace a user's profile image; returns false if the user does not exist
    async fn set_profile_image(&self, id: Uuid, image: ProfileImage) -> Result<bool, StoreError>;
}
