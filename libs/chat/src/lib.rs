//! Mock messaging
//!
//! In-memory conversations whose outgoing messages walk through
//! sent, delivered and read on timers before a scripted reply arrives.
//! Nothing is transmitted or persisted.

pub mod error;
pub mod inbox;
pub mod models;
pub mod replies;

pub use error::ChatError;
pub use inbox::{ChoreographyConfig, Inbox};
pub use models::{Chat, ChatPreview, DeliveryStatus, Direction, Message};
pub use replies::{AiReplies, CannedReplies, OpenAiConfig, ReplySource, ReplyThrottle};
