use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ActivityData, ChannelId, Context, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
    CreateMessage, Http, Message, MessageId,
};

use crate::platform::{
    EmbedContent, InboundMessage, MessageRef, Messenger, Presence, PresenceUpdateError, Reply,
    ReplyDeleteError, ReplySendError,
};

pub struct DiscordPresence {
    ctx: Context,
}

impl DiscordPresence {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Presence for DiscordPresence {
    async fn set_status(&self, text: &str) -> Result<(), PresenceUpdateError> {
        // Queued on the shard runner; serenity reports no failure here.
        self.ctx.set_activity(Some(ActivityData::custom(text)));
        Ok(())
    }
}

#[derive(Clone)]
pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn reply(
        &self,
        trigger: MessageRef,
        reply: &Reply,
    ) -> Result<MessageRef, ReplySendError> {
        let channel = ChannelId::new(trigger.channel_id);
        let reference = (channel, MessageId::new(trigger.message_id));

        let msg = match reply {
            Reply::Text(text) => CreateMessage::new().content(text),
            Reply::Embed(embed) => CreateMessage::new().embed(to_embed(embed)),
        }
        .reference_message(reference);

        let sent = channel
            .send_message(&self.http, msg)
            .await
            .map_err(|e| ReplySendError {
                trigger,
                reason: e.to_string(),
            })?;

        Ok(MessageRef::new(sent.channel_id.get(), sent.id.get()))
    }

    async fn delete(&self, message: MessageRef) -> Result<(), ReplyDeleteError> {
        ChannelId::new(message.channel_id)
            .delete_message(&self.http, MessageId::new(message.message_id))
            .await
            .map_err(|e| ReplyDeleteError {
                message,
                reason: e.to_string(),
            })
    }
}

fn to_embed(content: &EmbedContent) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(&content.title);

    if let Some(author) = &content.author {
        embed = embed.author(
            CreateEmbedAuthor::new(&author.name)
                .icon_url(&author.icon_url)
                .url(&author.url),
        );
    }

    for (name, value) in &content.fields {
        embed = embed.field(name, value, false);
    }

    if let Some(footer) = &content.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }

    embed
}

pub fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        message: MessageRef::new(msg.channel_id.get(), msg.id.get()),
        guild_id: msg.guild_id.map(|g| g.get()),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
    }
}
