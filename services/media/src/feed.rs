//! Infinite-scroll feed over a paginated provider
//!
//! `Feed` keeps the loaded items and the page cursor. A failed page load
//! leaves the cursor where it was so the next `load_more` retries the same
//! page; only a successful page without a follow-up marks the feed
//! exhausted.

use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

use crate::{
    models::{MediaItem, MediaKind, SearchQuery},
    provider::MediaProvider,
};

/// Visible fraction at which an item becomes the active one
pub const VISIBILITY_THRESHOLD: f64 = 0.6;

/// Remaining items below which the next page should be requested
pub const DEFAULT_PREFETCH_DISTANCE: usize = 2;

/// Result of a `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Number of new items appended
    Appended(usize),
    /// No further pages exist
    Exhausted,
    /// Provider request failed; the cursor did not move
    Failed,
}

/// Playback instruction produced by visibility changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play(String),
    Pause(String),
}

pub struct Feed {
    provider: Arc<dyn MediaProvider>,
    kind: MediaKind,
    query: String,
    per_page: u32,
    items: Vec<MediaItem>,
    seen: HashSet<String>,
    next_page: u32,
    exhausted: bool,
    active: Option<usize>,
    prefetch_distance: usize,
}

impl Feed {
    /// Create an empty feed starting at the query's page
    pub fn new(provider: Arc<dyn MediaProvider>, kind: MediaKind, query: SearchQuery) -> Self {
        Self {
            provider,
            kind,
            query: query.query,
            per_page: query.per_page,
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: query.page,
            exhausted: false,
            active: None,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
        }
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn active(&self) -> Option<&MediaItem> {
        self.active.and_then(|index| self.items.get(index))
    }

    /// Request the next page and append items not seen before
    pub async fn load_more(&mut self) -> LoadOutcome {
        if self.exhausted {
            return LoadOutcome::Exhausted;
        }

        let query = SearchQuery {
            query: self.query.clone(),
            page: self.next_page,
            per_page: self.per_page,
        };

        let page = match self.provider.search(self.kind, &query).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Failed to load {} page {}: {}",
                    self.kind.as_str(),
                    query.page,
                    e
                );
                return LoadOutcome::Failed;
            }
        };

        let before = self.items.len();
        for item in page.items {
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        let appended = self.items.len() - before;

        match page.next_page {
            Some(next) => self.next_page = next,
            None => self.exhausted = true,
        }

        debug!(
            "Feed page {} appended {} items (exhausted: {})",
            query.page, appended, self.exhausted
        );

        if appended == 0 && self.exhausted {
            LoadOutcome::Exhausted
        } else {
            LoadOutcome::Appended(appended)
        }
    }

    /// React to an item's visible ratio changing
    pub fn on_visibility(&mut self, id: &str, ratio: f64) -> Option<PlaybackCommand> {
        let index = self.items.iter().position(|item| item.id == id)?;

        if ratio >= VISIBILITY_THRESHOLD {
            self.active = Some(index);
            Some(PlaybackCommand::Play(id.to_string()))
        } else {
            Some(PlaybackCommand::Pause(id.to_string()))
        }
    }

    /// Whether the active item is close enough to the end to load more
    pub fn should_prefetch(&self) -> bool {
        if self.exhausted {
            return false;
        }

        if self.items.is_empty() {
            return true;
        }

        match self.active {
            Some(index) => self.items.len() - 1 - index <= self.prefetch_distance,
            None => false,
        }
    }

    /// Flip the like flag on an item; returns the new state
    pub fn toggle_like(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;

        item.liked = !item.liked;
        if item.liked {
            item.like_count = item.like_count.saturating_add(1);
        } else {
            item.like_count = item.like_count.saturating_sub(1);
        }

        Some(item.liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::MediaPage, provider::ProviderError};
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex};

    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<MediaPage, ProviderError>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<MediaPage, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaProvider for ScriptedProvider {
        async fn search(
            &self,
            _kind: MediaKind,
            query: &SearchQuery,
        ) -> Result<MediaPage, ProviderError> {
            self.requested.lock().unwrap().push(query.page);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::Status(500)))
        }
    }

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind: MediaKind::Video,
            source_url: format!("https://cdn.example/{id}.mp4"),
            author_label: "Ann".to_string(),
            caption: "Clip".to_string(),
            like_count: 10,
            comment_count: 0,
            liked: false,
        }
    }

    fn page(page: u32, ids: &[&str], next_page: Option<u32>) -> MediaPage {
        MediaPage {
            items: ids.iter().map(|id| item(id)).collect(),
            page,
            per_page: 10,
            next_page,
            total_results: 100,
        }
    }

    fn feed(provider: Arc<ScriptedProvider>) -> Feed {
        Feed::new(
            provider,
            MediaKind::Video,
            SearchQuery::new(Some("ocean"), None, None),
        )
    }

    fn ids(feed: &Feed) -> Vec<&str> {
        feed.items().iter().map(|item| item.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_are_dropped() {
        let provider = ScriptedProvider::new(vec![
            Ok(page(1, &["a", "b", "c"], Some(2))),
            Ok(page(2, &["c", "d"], Some(3))),
        ]);
        let mut feed = feed(provider);

        assert_eq!(feed.load_more().await, LoadOutcome::Appended(3));
        assert_eq!(feed.load_more().await, LoadOutcome::Appended(1));
        assert_eq!(ids(&feed), vec!["a", "b", "c", "d"]);
        assert_eq!(feed.next_page(), 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_cursor_and_retries_same_page() {
        let provider = ScriptedProvider::new(vec![
            Ok(page(1, &["a"], Some(2))),
            Err(ProviderError::Status(503)),
            Ok(page(2, &["b"], Some(3))),
        ]);
        let mut feed = feed(provider.clone());

        feed.load_more().await;
        assert_eq!(feed.load_more().await, LoadOutcome::Failed);
        assert!(!feed.is_exhausted());
        assert_eq!(feed.next_page(), 2);

        assert_eq!(feed.load_more().await, LoadOutcome::Appended(1));
        assert_eq!(provider.requested(), vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_empty_page_with_next_is_not_end() {
        let provider = ScriptedProvider::new(vec![
            Ok(page(1, &[], Some(2))),
            Ok(page(2, &["a"], None)),
        ]);
        let mut feed = feed(provider.clone());

        assert_eq!(feed.load_more().await, LoadOutcome::Appended(0));
        assert!(!feed.is_exhausted());
        assert_eq!(feed.load_more().await, LoadOutcome::Appended(1));
        assert!(feed.is_exhausted());

        assert_eq!(feed.load_more().await, LoadOutcome::Exhausted);
        assert_eq!(provider.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_visibility_drives_playback_and_prefetch() {
        let provider = ScriptedProvider::new(vec![Ok(page(1, &["a", "b", "c", "d", "e"], Some(2)))]);
        let mut feed = feed(provider);

        assert!(feed.should_prefetch());
        feed.load_more().await;
        assert!(!feed.should_prefetch());

        assert_eq!(
            feed.on_visibility("a", 0.9),
            Some(PlaybackCommand::Play("a".to_string()))
        );
        assert_eq!(feed.active().map(|i| i.id.as_str()), Some("a"));
        assert!(!feed.should_prefetch());

        assert_eq!(
            feed.on_visibility("a", 0.2),
            Some(PlaybackCommand::Pause("a".to_string()))
        );
        assert_eq!(
            feed.on_visibility("c", 0.6),
            Some(PlaybackCommand::Play("c".to_string()))
        );
        assert!(feed.should_prefetch());

        assert_eq!(feed.on_visibility("missing", 1.0), None);
    }

    #[tokio::test]
    async fn test_exhausted_feed_never_prefetches() {
        let provider = ScriptedProvider::new(vec![Ok(page(1, &["a"], None))]);
        let mut feed = feed(provider);

        feed.load_more().await;
        feed.on_visibility("a", 1.0);

        assert!(feed.is_exhausted());
        assert!(!feed.should_prefetch());
    }

    #[tokio::test]
    async fn test_toggle_like_adjusts_count() {
        let provider = ScriptedProvider::new(vec![Ok(page(1, &["a"], None))]);
        let mut feed = feed(provider);
        feed.load_more().await;

        assert_eq!(feed.toggle_like("a"), Some(true));
        assert_eq!(feed.items()[0].like_count, 11);
        assert_eq!(feed.toggle_like("a"), Some(false));
        assert_eq!(feed.items()[0].like_count, 10);
        assert_eq!(feed.toggle_like("zzz"), None);
    }
}
