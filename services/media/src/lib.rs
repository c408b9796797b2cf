//! Stock-media search, feed pagination and clip upload

pub mod feed;
pub mod models;
pub mod pexels;
pub mod provider;
pub mod upload;

pub use feed::{Feed, LoadOutcome, PlaybackCommand};
pub use models::{MediaItem, MediaKind, MediaPage, SearchQuery};
pub use pexels::{PexelsClient, PexelsConfig};
pub use provider::{MediaProvider, ProviderError};
pub use upload::{CloudinaryConfig, CloudinaryUploader, UploadError};
