//! Registration and login
//!
//! `AuthService` owns the credential store, the password hasher, the token
//! issuer and the failed-login limiter. Route handlers are thin wrappers
//! around it.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    jwt::{IssuedToken, JwtService},
    models::{Credentials, NewUser, ProfileImage, PublicUser},
    password::PasswordHasher,
    rate_limiter::RateLimiter,
    repositories::UserStore,
    validation::{normalize_email, validate_email, validate_password},
};

/// Successful login result
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: PublicUser,
}

/// Authentication operations
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    jwt: JwtService,
    limiter: RateLimiter,
    // Verified against when the email is unknown so both failure paths cost one hash.
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        jwt: JwtService,
        limiter: RateLimiter,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            store,
            hasher,
            jwt,
            limiter,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Register a new user
    pub async fn register(&self, credentials: Credentials) -> AuthResult<PublicUser> {
        let email = normalize_email(&credentials.email);
        validate_email(&email).map_err(AuthError::Validation)?;
        validate_password(&credentials.password).map_err(AuthError::Validation)?;

        info!("Registration attempt for: {}", email);

        if self.store.find_by_email(&email).await?.is_some() {
            info!("Registration rejected, email already registered: {}", email);
            return Err(AuthError::DuplicateUser);
        }

        let hasher = self.hasher.clone();
        let password = credentials.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task failed")??;

        // The store re-checks uniqueness; a concurrent registration that slipped
        // past the lookup above surfaces here as DuplicateUser.
        let user = self
            .store
            .create(NewUser {
                email,
                password_hash,
            })
            .await?;

        info!("Registered user {}", user.id);
        Ok(PublicUser::from(&user))
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, credentials: Credentials) -> AuthResult<LoginOutcome> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let email = normalize_email(&credentials.email);

        if !self.limiter.is_allowed(&email).await {
            warn!("Login throttled for: {}", email);
            return Err(AuthError::TooManyAttempts);
        }

        let user = self.store.find_by_email(&email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let hasher = self.hasher.clone();
        let password = credentials.password;
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
                .await
                .context("Password verification task failed")??;

        match user {
            Some(user) if verified => {
                self.limiter.reset(&email).await;
                let token = self.jwt.issue_token(&user)?;
                info!("Login successful for user {}", user.id);

                Ok(LoginOutcome {
                    token,
                    user: PublicUser::from(&user),
                })
            }
            _ => {
                self.limiter.record_failure(&email).await;
                info!("Login failed for: {}", email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Public view of the user behind a verified token
    pub async fn current_user(&self, id: Uuid) -> AuthResult<PublicUser> {
        self.store
            .find_by_id(id)
            .await?
            .map(|user| PublicUser::from(&user))
            .ok_or(AuthError::Unauthorized)
    }

    /// Store or replace a user's profile image
    pub async fn set_profile_image(&self, id: Uuid, image: ProfileImage) -> AuthResult<()> {
        if self.store.set_profile_image(id, image).await? {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }

    /// Fetch a user's profile image
    pub async fn profile_image(&self, id: Uuid) -> AuthResult<ProfileImage> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::Unauthorized)?
            .profile_image()
            .ok_or_else(|| AuthError::NotFound("No profile image".to_string()))
    }
}
