//! Application state shared across handlers

use common::token::TokenValidator;
use media::{CloudinaryUploader, MediaProvider};
use std::sync::Arc;

use crate::cache::PageCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MediaProvider>,
    /// `None` when Cloudinary is not configured
    pub uploader: Option<CloudinaryUploader>,
    pub cache: PageCache,
    pub tokens: TokenValidator,
}
