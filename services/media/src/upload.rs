//! Hosted upload of recorded clips
//!
//! Posts a finished recording to a Cloudinary unsigned upload preset and
//! returns the hosted `secure_url`.

use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use std::{env, time::Duration};
use thiserror::Error;
use tracing::{error, info};

const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com";

/// Upload failures
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upload rejected with status {0}")]
    Rejected(u16),

    #[error("Upload response did not include a URL")]
    MissingUrl,

    #[error("Nothing to upload")]
    Empty,
}

/// Cloudinary upload configuration
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl CloudinaryConfig {
    /// Create a new CloudinaryConfig from environment variables
    ///
    /// Returns `None` when `CLOUDINARY_CLOUD_NAME` or
    /// `CLOUDINARY_UPLOAD_PRESET` is unset, in which case uploads are
    /// disabled.
    pub fn from_env() -> Option<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok()?;
        let upload_preset = env::var("CLOUDINARY_UPLOAD_PRESET").ok()?;

        let timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Some(Self {
            cloud_name,
            upload_preset,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Client for Cloudinary unsigned video uploads
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Result<Self, UploadError> {
        // Uploads carry whole clips; allow well beyond the search timeout.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs * 6))
            .build()?;

        Ok(Self { client, config })
    }

    /// Upload a clip and return its hosted URL
    pub async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<String, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }

        let url = format!(
            "{}/v1_1/{}/video/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        );

        let size = data.len();
        let file = Part::bytes(data)
            .file_name(file_name_for(content_type))
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone());

        info!("Uploading {} byte clip", size);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("Upload rejected with status {}", status);
            return Err(UploadError::Rejected(status.as_u16()));
        }

        let body: UploadResponse = response.json().await?;
        let secure_url = body.secure_url.ok_or(UploadError::MissingUrl)?;

        info!("Upload stored at {}", secure_url);
        Ok(secure_url)
    }
}

/// Upload file name carrying the extension of `content_type`
fn file_name_for(content_type: &str) -> String {
    let subtype = content_type
        .split(';')
        .next()
        .and_then(|essence| essence.trim().split_once('/'))
        .map(|(_, subtype)| subtype.to_ascii_lowercase())
        .unwrap_or_default();

    let extension = match subtype.as_str() {
        "webm" => "webm",
        "quicktime" => "mov",
        "x-matroska" => "mkv",
        "ogg" => "ogv",
        _ => "mp4",
    };

    format!("recording.{}", extension)
}
