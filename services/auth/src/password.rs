//! Password hashing and verification using Argon2id
//!
//! Every hash gets a fresh random salt. The memory, iteration and parallelism
//! costs are configurable so deployments can tune the work factor and tests
//! can keep it cheap.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use std::env;

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashConfig {
    /// Create a new HashConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HASH_MEMORY_KIB`: Memory cost in KiB (default: 19456)
    /// - `HASH_ITERATIONS`: Iteration count (default: 2)
    /// - `HASH_PARALLELISM`: Lanes (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: u32| {
            env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            memory_kib: read("HASH_MEMORY_KIB", defaults.memory_kib),
            iterations: read("HASH_ITERATIONS", defaults.iterations),
            parallelism: read("HASH_PARALLELISM", defaults.parallelism),
        }
    }

    /// Cheapest parameters Argon2 accepts; for tests only
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// Argon2id password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher, rejecting parameters Argon2 does not accept
    pub fn new(config: HashConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {}", e))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a PHC string
    ///
    /// The stored hash carries its own parameters, so hashes produced under an
    /// older cost setting still verify.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashConfig::minimal()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret123", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = hasher();
        assert_ne!(
            hasher.hash("secret123").unwrap(),
            hasher.hash("secret123").unwrap()
        );
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(hasher().verify("secret123", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = HashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(PasswordHasher::new(config).is_err());
    }

    #[test]
    #[serial]
    fn test_hash_config_from_env() {
        unsafe {
            env::set_var("HASH_MEMORY_KIB", "4096");
            env::set_var("HASH_ITERATIONS", "3");
            env::remove_var("HASH_PARALLELISM");
        }

        let config = HashConfig::from_env();
        assert_eq!(config.memory_kib, 4096);
        assert_eq!(config.iterations, 3);
        assert_eq!(config.parallelism, Params::DEFAULT_P_COST);

        unsafe {
            env::remove_var("HASH_MEMORY_KIB");
            env::remove_var("HASH_ITERATIONS");
        }
    }
}
