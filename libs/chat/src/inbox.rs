//! Conversation list and per-chat message timelines
//!
//! Sending a message schedules its choreography on a task owned by the
//! inbox: delivered, then read, then one reply. `shutdown` or dropping the
//! inbox aborts every pending choreography.

use std::{
    collections::HashMap,
    sync::{Arc, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::Mutex,
    task::JoinSet,
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{
    error::ChatError,
    models::{Chat, ChatPreview, DeliveryStatus, Message},
    replies::ReplySource,
};

const JUST_NOW: &str = "Just now";

/// Delays between choreography steps
#[derive(Debug, Clone, Copy)]
pub struct ChoreographyConfig {
    pub delivered_after: Duration,
    pub read_after: Duration,
    pub reply_after: Duration,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            delivered_after: Duration::from_secs(1),
            read_after: Duration::from_secs(1),
            reply_after: Duration::from_secs(2),
        }
    }
}

#[derive(Default)]
struct InboxState {
    chats: HashMap<String, Chat>,
    previews: Vec<ChatPreview>,
    messages: HashMap<String, Vec<Message>>,
    active: Option<String>,
}

impl InboxState {
    fn preview_mut(&mut self, chat_id: &str) -> Option<&mut ChatPreview> {
        self.previews.iter_mut().find(|preview| preview.id == chat_id)
    }

    fn set_status(&mut self, chat_id: &str, message_id: &str, status: DeliveryStatus) {
        if let Some(message) = self
            .messages
            .get_mut(chat_id)
            .and_then(|messages| messages.iter_mut().find(|m| m.id == message_id))
        {
            message.status = Some(status);
        }
    }
}

pub struct Inbox {
    state: Arc<Mutex<InboxState>>,
    replies: Arc<dyn ReplySource>,
    config: ChoreographyConfig,
    tasks: std::sync::Mutex<JoinSet<()>>,
}

impl Inbox {
    pub fn new(replies: Arc<dyn ReplySource>, config: ChoreographyConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(InboxState::default())),
            replies,
            config,
            tasks: std::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Inbox seeded with the demo conversations
    pub async fn with_sample_chats(
        replies: Arc<dyn ReplySource>,
        config: ChoreographyConfig,
    ) -> Self {
        let inbox = Self::new(replies, config);

        for (chat, preview, messages) in sample_chats() {
            inbox.add_chat(chat, preview, messages).await;
        }

        inbox
    }

    /// Add a conversation at the end of the list
    pub async fn add_chat(&self, chat: Chat, preview: ChatPreview, messages: Vec<Message>) {
        let mut state = self.state.lock().await;

        state.messages.insert(chat.id.clone(), messages);
        state.previews.retain(|existing| existing.id != chat.id);
        state.previews.push(preview);
        state.chats.insert(chat.id.clone(), chat);
    }

    pub async fn chats(&self) -> Vec<ChatPreview> {
        self.state.lock().await.previews.clone()
    }

    pub async fn chat(&self, chat_id: &str) -> Option<Chat> {
        self.state.lock().await.chats.get(chat_id).cloned()
    }

    pub async fn messages(&self, chat_id: &str) -> Vec<Message> {
        self.state
            .lock()
            .await
            .messages
            .get(chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn active_chat(&self) -> Option<String> {
        self.state.lock().await.active.clone()
    }

    /// Open a conversation and clear its unread count
    pub async fn select(&self, chat_id: &str) -> Result<(), ChatError> {
        let mut state = self.state.lock().await;

        let preview = state
            .preview_mut(chat_id)
            .ok_or_else(|| ChatError::UnknownChat(chat_id.to_string()))?;
        preview.unread = 0;
        state.active = Some(chat_id.to_string());

        Ok(())
    }

    /// Append an outgoing message and schedule its choreography
    pub async fn send(&self, chat_id: &str, text: &str) -> Result<Message, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let message = Message::outgoing(text);

        {
            let mut state = self.state.lock().await;
            if !state.chats.contains_key(chat_id) {
                return Err(ChatError::UnknownChat(chat_id.to_string()));
            }

            state
                .messages
                .entry(chat_id.to_string())
                .or_default()
                .push(message.clone());

            if let Some(preview) = state.preview_mut(chat_id) {
                preview.last_message = text.to_string();
                preview.timestamp_label = JUST_NOW.to_string();
            }
        }

        debug!("Message {} sent to {}", message.id, chat_id);

        let choreography = choreograph(
            self.state.clone(),
            self.replies.clone(),
            self.config,
            chat_id.to_string(),
            message.id.clone(),
            text.to_string(),
        );
        let mut tasks = self.tasks();
        // Drop finished choreographies.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(choreography);

        Ok(message)
    }

    /// Abort every pending choreography
    pub fn shutdown(&self) {
        let mut tasks = self.tasks();
        if !tasks.is_empty() {
            info!("Aborting {} pending message updates", tasks.len());
        }
        tasks.abort_all();
    }

    // A panic while holding the lock leaves the set itself intact.
    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| {
            warn!("Choreography task set lock was poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Drop for Inbox {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn choreograph(
    state: Arc<Mutex<InboxState>>,
    replies: Arc<dyn ReplySource>,
    config: ChoreographyConfig,
    chat_id: String,
    message_id: String,
    text: String,
) {
    sleep(config.delivered_after).await;
    state
        .lock()
        .await
        .set_status(&chat_id, &message_id, DeliveryStatus::Delivered);

    sleep(config.read_after).await;
    state
        .lock()
        .await
        .set_status(&chat_id, &message_id, DeliveryStatus::Read);

    let (reply, _) = tokio::join!(replies.reply(&text), sleep(config.reply_after));

    let mut state = state.lock().await;
    let active = state.active.as_deref() == Some(chat_id.as_str());

    state
        .messages
        .entry(chat_id.clone())
        .or_default()
        .push(Message::incoming(reply.clone()));

    if let Some(preview) = state.preview_mut(&chat_id) {
        preview.last_message = reply;
        preview.timestamp_label = JUST_NOW.to_string();
        preview.unread = if active { 0 } else { 1 };
    }
}

fn sample_chats() -> Vec<(Chat, ChatPreview, Vec<Message>)> {
    let read = |text: &str| {
        let mut message = Message::outgoing(text);
        message.status = Some(DeliveryStatus::Read);
        message
    };

    let sarah = vec![
        Message::incoming("Hey, did you see my new video?"),
        read("Yes! It was amazing. How did you create that transition effect?"),
        Message::incoming("I used the new filter in the app. I can show you how it works!"),
        read("That would be great! Can you send me a tutorial?"),
        Message::incoming("I'll send you the video later today!").ephemeral(30),
    ];

    let alex = vec![
        Message::incoming("Just watched your latest upload"),
        read("What did you think?"),
        Message::incoming("That was amazing! 🔥"),
    ];

    let chat = |id: &str, name: &str, ephemeral_seconds: Option<u32>| Chat {
        id: id.to_string(),
        participant_name: name.to_string(),
        ephemeral_seconds,
    };
    let preview = |id: &str, name: &str, last: &str, label: &str, unread: u32| ChatPreview {
        id: id.to_string(),
        name: name.to_string(),
        last_message: last.to_string(),
        timestamp_label: label.to_string(),
        unread,
    };

    vec![
        (
            chat("chat1", "Sarah Johnson", Some(30)),
            preview("chat1", "Sarah Johnson", "I'll send you the video later today!", "2m ago", 2),
            sarah,
        ),
        (
            chat("chat2", "Alex Martinez", None),
            preview("chat2", "Alex Martinez", "That was amazing! 🔥", "1h ago", 0),
            alex,
        ),
        (
            chat("chat3", "Taylor Swift", None),
            preview("chat3", "Taylor Swift", "Let's collaborate on the next video", "3h ago", 1),
            Vec::new(),
        ),
        (
            chat("chat4", "Jordan Lee", None),
            preview("chat4", "Jordan Lee", "How did you add that effect?", "Yesterday", 0),
            Vec::new(),
        ),
    ]
}
