//! Pexels stock-media client
//!
//! Wraps the Pexels video and photo search endpoints and projects their
//! responses into [`MediaItem`]s. The API key stays on the server; callers
//! reach Pexels only through the gateway.

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, header::AUTHORIZATION};
use serde::Deserialize;
use std::{env, time::Duration};
use tracing::{info, warn};

use crate::{
    models::{MediaItem, MediaKind, MediaPage, SearchQuery},
    provider::{MediaProvider, ProviderError},
};

const DEFAULT_BASE_URL: &str = "https://api.pexels.com";
const DEFAULT_AUTHOR: &str = "Pexels User";
const DEFAULT_VIDEO_CAPTION: &str = "Amazing video from Pexels!";

/// Pexels client configuration
#[derive(Debug, Clone)]
pub struct PexelsConfig {
    pub api_key: String,
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl PexelsConfig {
    /// Create a new PexelsConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PEXELS_API_KEY`: API key sent in the `Authorization` header (required)
    /// - `PEXELS_BASE_URL`: API root (default: "https://api.pexels.com")
    /// - `PROVIDER_TIMEOUT_SECS`: Request timeout (default: 10)
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("PEXELS_API_KEY")
            .map_err(|_| "PEXELS_API_KEY environment variable not set".to_string())?;

        let base_url = env::var("PEXELS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            api_key,
            base_url,
            timeout_secs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
    #[serde(default)]
    total_results: u64,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    description: Option<String>,
    user: Option<PexelsUser>,
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
    #[serde(default)]
    total_results: u64,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    id: u64,
    photographer: Option<String>,
    alt: Option<String>,
    src: Option<PexelsPhotoSource>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSource {
    large: Option<String>,
    original: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Pexels has no engagement data; the feed shows synthetic counts.
fn engagement() -> (u32, u32) {
    let mut rng = rand::thread_rng();
    (rng.gen_range(0..1000), rng.gen_range(0..100))
}

impl PexelsVideo {
    fn into_item(self) -> Option<MediaItem> {
        let source_url = self
            .video_files
            .into_iter()
            .find_map(|file| non_empty(file.link))?;
        let (like_count, comment_count) = engagement();

        Some(MediaItem {
            id: self.id.to_string(),
            kind: MediaKind::Video,
            source_url,
            author_label: non_empty(self.user.and_then(|u| u.name))
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            caption: non_empty(self.description)
                .unwrap_or_else(|| DEFAULT_VIDEO_CAPTION.to_string()),
            like_count,
            comment_count,
            liked: false,
        })
    }
}

impl PexelsPhoto {
    fn into_item(self) -> Option<MediaItem> {
        let src = self.src?;
        let source_url = non_empty(src.large).or_else(|| non_empty(src.original))?;
        let author_label =
            non_empty(self.photographer).unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let caption =
            non_empty(self.alt).unwrap_or_else(|| format!("Photo by {}", author_label));
        let (like_count, comment_count) = engagement();

        Some(MediaItem {
            id: self.id.to_string(),
            kind: MediaKind::Photo,
            source_url,
            author_label,
            caption,
            like_count,
            comment_count,
            liked: false,
        })
    }
}

/// Pexels API client
#[derive(Clone)]
pub struct PexelsClient {
    client: Client,
    config: PexelsConfig,
}

impl PexelsClient {
    /// Create a new Pexels client
    pub fn new(config: PexelsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &SearchQuery,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let page = query.page.to_string();
        let per_page = query.per_page.to_string();

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.config.api_key)
            .query(&[
                ("query", query.query.as_str()),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Pexels returned {} for {}", status, path);
            return Err(ProviderError::Status(status.as_u16()));
        }

        Ok(response.json::<T>().await?)
    }

    /// Search Pexels videos
    pub async fn search_videos(&self, query: &SearchQuery) -> Result<MediaPage, ProviderError> {
        info!(
            "Searching Pexels videos: query={} page={}",
            query.query, query.page
        );

        let response: VideoSearchResponse = self.get("/videos/search", query).await?;
        let items = response
            .videos
            .into_iter()
            .filter_map(PexelsVideo::into_item)
            .collect();

        Ok(MediaPage {
            items,
            page: query.page,
            per_page: query.per_page,
            next_page: response.next_page.and(query.page.checked_add(1)),
            total_results: response.total_results,
        })
    }

    /// Search Pexels photos
    pub async fn search_photos(&self, query: &SearchQuery) -> Result<MediaPage, ProviderError> {
        info!(
            "Searching Pexels photos: query={} page={}",
            query.query, query.page
        );

        let response: PhotoSearchResponse = self.get("/v1/search", query).await?;
        let items = response
            .photos
            .into_iter()
            .filter_map(PexelsPhoto::into_item)
            .collect();

        Ok(MediaPage {
            items,
            page: query.page,
            per_page: query.per_page,
            next_page: response.next_page.and(query.page.checked_add(1)),
            total_results: response.total_results,
        })
    }
}

#[async_trait]
impl MediaProvider for PexelsClient {
    async fn search(
        &self,
        kind: MediaKind,
        query: &SearchQuery,
    ) -> Result<MediaPage, ProviderError> {
        match kind {
            MediaKind::Video => self.search_videos(query).await,
            MediaKind::Photo => self.search_photos(query).await,
        }
    }
}
