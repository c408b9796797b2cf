//! Layered server settings
//!
//! Bind settings are resolved from built-in defaults, then an optional
//! `config/<service>.toml` file, then `<SERVICE>_SERVER__HOST` /
//! `<SERVICE>_SERVER__PORT` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// HTTP bind settings for a service
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Load the settings for `service`, falling back to `default_port`
    pub fn load(service: &str, default_port: u16) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(default_port))?
            .add_source(File::with_name(&format!("config/{}", service)).required(false))
            .add_source(
                Environment::with_prefix(&service.to_uppercase())
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .get::<ServerSettings>("server")
    }

    /// Address suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
