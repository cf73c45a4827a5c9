mod allow_list;
mod help;
mod links;
mod price;

use std::{sync::Arc, time::Duration};

use ::price::PriceState;
use tracing::{debug, info, trace};

use crate::{
    ephemeral::EphemeralReplies,
    platform::{InboundMessage, Messenger, Reply},
};

pub use allow_list::ChannelAllowList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Price,
    Links,
    Help,
}

impl Command {
    /// Case-insensitive lookup. Unknown names map to `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "price" => Some(Command::Price),
            "links" => Some(Command::Links),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// How long the reply and its trigger stay visible.
    pub fn ttl(&self) -> Duration {
        match self {
            Command::Links => Duration::from_secs(60),
            Command::Price | Command::Help => Duration::from_secs(30),
        }
    }
}

pub struct Dispatcher<M> {
    prefix: String,
    allow_list: ChannelAllowList,
    state: Arc<PriceState>,
    replies: EphemeralReplies<M>,
}

impl<M: Messenger> Dispatcher<M> {
    pub fn new(
        prefix: impl Into<String>,
        allow_list: ChannelAllowList,
        state: Arc<PriceState>,
        replies: EphemeralReplies<M>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            allow_list,
            state,
            replies,
        }
    }

    pub fn replies(&self) -> &EphemeralReplies<M> {
        &self.replies
    }

    /// Decides whether `msg` gets a reply, and what it is.
    ///
    /// Unknown commands are dropped without a reply so ordinary chat that
    /// happens to start with the prefix stays quiet.
    pub fn route(&self, msg: &InboundMessage) -> Option<(Command, Reply)> {
        if msg.author_is_bot {
            return None;
        }

        let rest = msg.content.strip_prefix(self.prefix.as_str())?;

        if !self.allow_list.allows(msg.guild_id, msg.message.channel_id) {
            trace!(
                guild_id = ?msg.guild_id,
                channel_id = msg.message.channel_id,
                "channel not in allow-list"
            );
            return None;
        }

        let token = rest.split(char::is_whitespace).next().unwrap_or_default();
        let Some(command) = Command::parse(token) else {
            trace!(token, "ignoring unknown command");
            return None;
        };

        let reply = match command {
            Command::Price => {
                let Some(snapshot) = self.state.read() else {
                    debug!("price requested before first successful fetch");
                    return None;
                };
                price::render(&snapshot)
            }
            Command::Links => links::render(),
            Command::Help => help::render(&self.prefix),
        };

        Some((command, reply))
    }

    pub async fn handle(&self, msg: &InboundMessage) {
        let Some((command, reply)) = self.route(msg) else {
            return;
        };

        info!(
            command = ?command,
            channel_id = msg.message.channel_id,
            message_id = msg.message.message_id,
            "command received"
        );

        self.replies.send(msg.message, reply, command.ttl()).await;
    }
}
