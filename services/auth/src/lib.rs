//! Authentication service
//!
//! Registration and login over HTTP: Argon2id password hashes in a credential
//! store with unique emails, and stateless one-hour JWTs on login.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

use crate::service::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
}
