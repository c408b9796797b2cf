//! Session token claims and verification
//!
//! Tokens are HS256 JWTs signed with a shared secret. The authentication
//! service issues them; every service that needs to know who is calling only
//! verifies them, so verification lives here.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::error::TokenError;

/// Default token lifetime in seconds
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 3600;

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Token lifetime in seconds
    pub expiry_secs: u64,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC secret used to sign and verify tokens (required)
    /// - `JWT_TOKEN_EXPIRY`: Token lifetime in seconds (default: 3600)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| TokenError::Configuration("JWT_SECRET not set".to_string()))?;

        if secret.trim().is_empty() {
            return Err(TokenError::Configuration(
                "JWT_SECRET must not be empty".to_string(),
            ));
        }

        let expiry_secs = env::var("JWT_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_SECS);

        Ok(Self {
            secret,
            expiry_secs,
        })
    }
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email at issue time
    pub email: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated caller extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// Verifies session tokens against the shared secret
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// Build a validator for the given secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serial_test::serial;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn sign(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp: u64) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            iat: now(),
            exp,
        }
    }

    #[test]
    fn test_validate_accepts_fresh_token() {
        let claims = claims(now() + 60);
        let token = sign("secret", &claims);

        let validator = TokenValidator::new("secret");
        assert_eq!(validator.validate(&token).unwrap(), claims);
    }

    #[test]
    fn test_validate_rejects_expired_token() {
        let token = sign("secret", &claims(now() - 10));

        let validator = TokenValidator::new("secret");
        assert_eq!(validator.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_validate_rejects_foreign_signature() {
        let token = sign("other-secret", &claims(now() + 60));

        let validator = TokenValidator::new("secret");
        assert_eq!(validator.validate(&token), Err(TokenError::Invalid));
        assert_eq!(validator.validate("garbage"), Err(TokenError::Invalid));
    }

    #[test]
    #[serial]
    fn test_token_config_from_env() {
        unsafe {
            env::set_var("JWT_SECRET", "s3cr3t");
            env::remove_var("JWT_TOKEN_EXPIRY");
        }

        let config = TokenConfig::from_env().unwrap();
        assert_eq!(config.secret, "s3cr3t");
        assert_eq!(config.expiry_secs, DEFAULT_TOKEN_EXPIRY_SECS);

        unsafe {
            env::set_var("JWT_TOKEN_EXPIRY", "120");
        }
        assert_eq!(TokenConfig::from_env().unwrap().expiry_secs, 120);

        unsafe {
            env::remove_var("JWT_SECRET");
            env::remove_var("JWT_TOKEN_EXPIRY");
        }
        assert!(TokenConfig::from_env().is_err());
    }
}
