//! Stock-media provider abstraction

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MediaKind, MediaPage, SearchQuery};

/// Failures talking to a stock-media provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Connection, TLS, timeout or body decoding failure
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned status {0}")]
    Status(u16),
}

/// A paginated stock-media search backend
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Fetch one page of results for `query`
    async fn search(&self, kind: MediaKind, query: &SearchQuery)
    -> Result<MediaPage, ProviderError>;
}
