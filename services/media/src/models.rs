//! Local media shapes projected from provider responses

use serde::{Deserialize, Serialize};

/// Query used when the caller does not supply one
pub const DEFAULT_QUERY: &str = "technology";

/// Page size used when the caller does not supply one
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size the provider accepts
pub const MAX_PER_PAGE: u32 = 80;

/// Kind of media a provider search returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Photo,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Photo => "photo",
        }
    }
}

/// A video or photo ready to render in a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub source_url: String,
    pub author_label: String,
    pub caption: String,
    pub like_count: u32,
    pub comment_count: u32,
    pub liked: bool,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub per_page: u32,
    /// Page to request next; `None` when the provider reports no more results
    pub next_page: Option<u32>,
    pub total_results: u64,
}

/// Normalized search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    /// Build a query, substituting defaults and clamping to provider limits
    pub fn new(query: Option<&str>, page: Option<u32>, per_page: Option<u32>) -> Self {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUERY)
            .to_string();

        Self {
            query,
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}
