//! Sources of scripted replies
//!
//! `CannedReplies` picks from a fixed list. `AiReplies` asks the OpenAI chat
//! completion API, spacing requests through a shared [`ReplyThrottle`].

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::{env, sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};
use tracing::{debug, warn};

pub const CANNED_REPLIES: [&str; 5] = [
    "That's interesting!",
    "Thanks for letting me know 👍",
    "Sounds good!",
    "I'll check it out",
    "Great idea! 🔥",
];

/// Reply used when the model answers with nothing
pub const FALLBACK_REPLY: &str = "I see!";

/// Reply used when the model cannot be reached
pub const UNAVAILABLE_REPLY: &str = "AI Response currently unavailable, please try again later!";

/// Minimum spacing between AI requests
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_secs(2);

#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Produce a reply to `message`; never fails
    async fn reply(&self, message: &str) -> String;
}

/// Uniformly random reply from [`CANNED_REPLIES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedReplies;

#[async_trait]
impl ReplySource for CannedReplies {
    async fn reply(&self, _message: &str) -> String {
        CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK_REPLY)
            .to_string()
    }
}

/// Enforces a minimum interval between calls to `acquire`
///
/// Callers arriving too early wait out the remainder of the interval.
pub struct ReplyThrottle {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl ReplyThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let since = previous.elapsed();
            if since < self.min_interval {
                debug!("Throttling reply request for {:?}", self.min_interval - since);
                sleep(self.min_interval - since).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for ReplyThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}

/// OpenAI chat completion configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Read `OPENAI_API_KEY`; `None` disables AI replies
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())?;

        Some(Self {
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 50,
            timeout_secs: 10,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Replies generated by an OpenAI chat model
pub struct AiReplies {
    client: Client,
    config: OpenAiConfig,
    throttle: Arc<ReplyThrottle>,
}

impl AiReplies {
    pub fn new(config: OpenAiConfig, throttle: Arc<ReplyThrottle>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    async fn complete(&self, message: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response: CompletionResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [{"role": "user", "content": message}],
                "max_tokens": self.config.max_tokens,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

#[async_trait]
impl ReplySource for AiReplies {
    async fn reply(&self, message: &str) -> String {
        self.throttle.acquire().await;

        match self.complete(message).await {
            Ok(Some(content)) if !content.trim().is_empty() => content.trim().to_string(),
            Ok(_) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                warn!("AI reply failed: {}", e);
                UNAVAILABLE_REPLY.to_string()
            }
        }
    }
}
