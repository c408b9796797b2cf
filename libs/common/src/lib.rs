//! Common library for the Reelbox services
//!
//! Shared building blocks used by the authentication service and the media
//! gateway: database and cache connectivity, session token claims, server
//! settings and tracing setup.

pub mod cache;
pub mod database;
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod token;
