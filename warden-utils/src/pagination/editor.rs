use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use super::emotes::EmoteSet;
use super::page::Page;

/// Identity of a paginated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaginatedMessage {
    pub channel_id: serenity::ChannelId,
    pub message_id: serenity::MessageId,
}

impl PaginatedMessage {
    pub fn new(channel_id: serenity::ChannelId, message_id: serenity::MessageId) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

impl From<&serenity::Message> for PaginatedMessage {
    fn from(message: &serenity::Message) -> Self {
        Self::new(message.channel_id, message.id)
    }
}

/// Message I/O the pagination engine needs from the chat client.
#[async_trait]
pub trait MessageEditor: Send + Sync {
    async fn edit_page(&self, message: PaginatedMessage, page: &Page) -> anyhow::Result<()>;

    async fn add_reactions(&self, message: PaginatedMessage, emotes: &EmoteSet)
    -> anyhow::Result<()>;

    async fn remove_reaction(
        &self,
        message: PaginatedMessage,
        emote: &serenity::ReactionType,
        user_id: serenity::UserId,
    ) -> anyhow::Result<()>;

    async fn clear_reactions(&self, message: PaginatedMessage) -> anyhow::Result<()>;
}

/// [`MessageEditor`] backed by serenity's REST client.
#[derive(Clone)]
pub struct HttpMessageEditor {
    http: Arc<serenity::Http>,
}

impl HttpMessageEditor {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageEditor for HttpMessageEditor {
    async fn edit_page(&self, message: PaginatedMessage, page: &Page) -> anyhow::Result<()> {
        let http: &serenity::Http = &self.http;
        message
            .channel_id
            .edit_message(
                http,
                message.message_id,
                serenity::EditMessage::new().embed(page.to_embed()),
            )
            .await?;
        Ok(())
    }

    async fn add_reactions(
        &self,
        message: PaginatedMessage,
        emotes: &EmoteSet,
    ) -> anyhow::Result<()> {
        let http: &serenity::Http = &self.http;
        // Sequential so the reactions show up in set order.
        for emote in emotes.emotes() {
            message
                .channel_id
                .create_reaction(http, message.message_id, emote.clone())
                .await?;
        }
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message: PaginatedMessage,
        emote: &serenity::ReactionType,
        user_id: serenity::UserId,
    ) -> anyhow::Result<()> {
        let http: &serenity::Http = &self.http;
        message
            .channel_id
            .delete_reaction(http, message.message_id, Some(user_id), emote.clone())
            .await?;
        Ok(())
    }

    async fn clear_reactions(&self, message: PaginatedMessage) -> anyhow::Result<()> {
        let http: &serenity::Http = &self.http;
        message
            .channel_id
            .delete_reactions(http, message.message_id)
            .await?;
        Ok(())
    }
}
