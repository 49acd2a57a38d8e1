use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use crate::moderation::embeds::punishment_line;
use warden_database::Database;
use warden_database::impls::punishments::punishments_for_target;
use warden_database::model::punishment::Punishment;
use warden_utils::pagination::{
    MessageEditor, Navigation, Page, PageSource, PaginatedMessage, page_footer, total_pages,
};

pub const PUNISHMENTS_PER_PAGE: usize = 5;

/// A target's punishment history, loaded from the database one page at a
/// time.
pub struct PunishmentPages {
    db: Database,
    editor: Arc<dyn MessageEditor>,
    guild_id: u64,
    target_id: u64,
    title: String,
    author_icon_url: Option<String>,
    total: u64,
    current: usize,
}

impl PunishmentPages {
    pub fn new(
        db: Database,
        editor: Arc<dyn MessageEditor>,
        guild_id: u64,
        target_id: u64,
        title: impl Into<String>,
        total: u64,
    ) -> Self {
        Self {
            db,
            editor,
            guild_id,
            target_id,
            title: title.into(),
            author_icon_url: None,
            total,
            current: 0,
        }
    }

    pub fn with_author_icon(mut self, url: Option<String>) -> Self {
        self.author_icon_url = url;
        self
    }

    pub fn total_pages(&self) -> usize {
        total_pages(usize::try_from(self.total).unwrap_or(usize::MAX), PUNISHMENTS_PER_PAGE)
    }

    /// Load and render the page the source currently points at.
    pub async fn load_current(&self) -> anyhow::Result<Page> {
        let offset = self.current.saturating_mul(PUNISHMENTS_PER_PAGE) as u64;
        let entries = punishments_for_target(
            &self.db,
            self.guild_id,
            self.target_id,
            offset,
            PUNISHMENTS_PER_PAGE as u32,
        )
        .await?;

        Ok(
            Page::new(self.title.clone(), render_punishments(&entries, self.total))
                .with_footer(page_footer(self.current + 1, self.total_pages()))
                .with_author_icon(self.author_icon_url.clone()),
        )
    }
}

#[async_trait]
impl PageSource for PunishmentPages {
    async fn get_page(
        &mut self,
        _user_id: serenity::UserId,
        navigation: Option<Navigation>,
    ) -> anyhow::Result<Page> {
        if let Some(navigation) = navigation {
            self.current = navigation.apply(self.current, self.total_pages());
        }

        self.load_current().await
    }

    async fn close(&mut self, message: PaginatedMessage) -> anyhow::Result<()> {
        self.editor.clear_reactions(message).await
    }
}

pub fn render_punishments(entries: &[Punishment], total: u64) -> String {
    let mut body = format!("Total punishments: **{total}**");

    if entries.is_empty() {
        body.push_str("\n\nNo punishments on record.");
        return body;
    }

    for entry in entries {
        body.push_str("\n\n");
        body.push_str(&punishment_line(entry));
    }

    body
}
