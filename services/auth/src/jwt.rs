//! JWT service for token issuance and validation
//!
//! Tokens are HS256-signed, carry the user ID and email, and expire after a
//! configurable lifetime (one hour by default). They are stateless: nothing
//! is stored server-side and they cannot be revoked before expiry.

use anyhow::Result;
use common::{
    error::TokenError,
    token::{Claims, TokenConfig, TokenValidator},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::User;

/// A freshly signed token and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    validator: TokenValidator,
    config: TokenConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: TokenConfig) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            validator: TokenValidator::new(&config.secret),
            config,
        }
    }

    /// Issue a token for a user
    pub fn issue_token(&self, user: &User) -> Result<IssuedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now,
            exp: now + self.config.expiry_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_in: self.config.expiry_secs,
        })
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validator.validate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn service(expiry_secs: u64) -> JwtService {
        JwtService::new(TokenConfig {
            secret: "test-secret".to_string(),
            expiry_secs,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: String::new(),
            profile_image: None,
            profile_image_type: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_round_trips_identity() {
        let service = service(3600);
        let user = user();

        let issued = service.issue_token(&user).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = service.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issued = service(3600).issue_token(&user()).unwrap();

        let other = JwtService::new(TokenConfig {
            secret: "another-secret".to_string(),
            expiry_secs: 3600,
        });

        assert_eq!(
            other.validate_token(&issued.token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_zero_lifetime_token_expires() {
        let service = service(0);
        let issued = service.issue_token(&user()).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(
            service.validate_token(&issued.token),
            Err(TokenError::Expired)
        );
    }
}
