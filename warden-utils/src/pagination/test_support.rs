use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;

use super::editor::{MessageEditor, PaginatedMessage};
use super::emotes::EmoteSet;
use super::page::Page;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EditorCall {
    Edit(PaginatedMessage, Page),
    AddReactions(PaginatedMessage, usize),
    RemoveReaction(PaginatedMessage, serenity::ReactionType, serenity::UserId),
    ClearReactions(PaginatedMessage),
}

/// Editor that reports every call on a channel and can be told to fail edits.
pub(crate) struct RecordingEditor {
    calls: mpsc::UnboundedSender<EditorCall>,
    fail_edits: bool,
}

impl RecordingEditor {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<EditorCall>) {
        let (calls, received) = mpsc::unbounded_channel();
        (
            Self {
                calls,
                fail_edits: false,
            },
            received,
        )
    }

    pub(crate) fn failing() -> (Self, mpsc::UnboundedReceiver<EditorCall>) {
        let (mut editor, received) = Self::new();
        editor.fail_edits = true;
        (editor, received)
    }
}

#[async_trait]
impl MessageEditor for RecordingEditor {
    async fn edit_page(&self, message: PaginatedMessage, page: &Page) -> anyhow::Result<()> {
        let _ = self.calls.send(EditorCall::Edit(message, page.clone()));
        if self.fail_edits {
            anyhow::bail!("Unknown Message");
        }
        Ok(())
    }

    async fn add_reactions(
        &self,
        message: PaginatedMessage,
        emotes: &EmoteSet,
    ) -> anyhow::Result<()> {
        let _ = self.calls.send(EditorCall::AddReactions(message, emotes.len()));
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message: PaginatedMessage,
        emote: &serenity::ReactionType,
        user_id: serenity::UserId,
    ) -> anyhow::Result<()> {
        let _ = self
            .calls
            .send(EditorCall::RemoveReaction(message, emote.clone(), user_id));
        Ok(())
    }

    async fn clear_reactions(&self, message: PaginatedMessage) -> anyhow::Result<()> {
        let _ = self.calls.send(EditorCall::ClearReactions(message));
        Ok(())
    }
}
