//! Seams between the bot core and the chat platform.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: u64,
    pub message_id: u64,
}

impl MessageRef {
    pub fn new(channel_id: u64, message_id: u64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// A chat message as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message: MessageRef,
    /// `None` for direct messages.
    pub guild_id: Option<u64>,
    pub author_is_bot: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Embed(EmbedContent),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedContent {
    pub title: String,
    pub author: Option<EmbedAuthor>,
    pub fields: Vec<(String, String)>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: String,
    pub url: String,
}

#[derive(Debug, Error)]
#[error("presence update rejected: {0}")]
pub struct PresenceUpdateError(pub String);

#[derive(Debug, Error)]
#[error("reply to message {trigger} failed: {reason}")]
pub struct ReplySendError {
    pub trigger: MessageRef,
    pub reason: String,
}

#[derive(Debug, Error)]
#[error("delete of message {message} failed: {reason}")]
pub struct ReplyDeleteError {
    pub message: MessageRef,
    pub reason: String,
}

/// The bot account's visible status line.
#[async_trait]
pub trait Presence: Send + Sync {
    async fn set_status(&self, text: &str) -> Result<(), PresenceUpdateError>;
}

#[async_trait]
pub trait Messenger: Send + Sync + 'static {
    /// Posts `reply` as a reply to `trigger` and returns the new message.
    async fn reply(&self, trigger: MessageRef, reply: &Reply)
    -> Result<MessageRef, ReplySendError>;

    async fn delete(&self, message: MessageRef) -> Result<(), ReplyDeleteError>;
}
