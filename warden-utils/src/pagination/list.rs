use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use super::editor::{MessageEditor, PaginatedMessage};
use super::emotes::Navigation;
use super::page::{Page, page_footer};
use super::paginator::PageSource;

/// Pre-rendered page bodies kept in memory.
pub struct ListPages {
    title: String,
    pages: Vec<String>,
    current: usize,
    author_icon_url: Option<String>,
    editor: Option<Arc<dyn MessageEditor>>,
}

impl ListPages {
    pub fn new(title: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            pages,
            current: 0,
            author_icon_url: None,
            editor: None,
        }
    }

    /// Start on one-based `page`, clamped into range.
    pub fn starting_at(mut self, page: usize) -> Self {
        self.current = page.clamp(1, self.total_pages()) - 1;
        self
    }

    pub fn with_author_icon(mut self, url: Option<impl Into<String>>) -> Self {
        self.author_icon_url = url.map(Into::into);
        self
    }

    /// Strip the footer and clear reactions through `editor` when closed.
    pub fn clear_on_close(mut self, editor: Arc<dyn MessageEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len().max(1)
    }

    pub fn current_page(&self) -> Page {
        let body = self
            .pages
            .get(self.current)
            .cloned()
            .unwrap_or_default();

        Page::new(self.title.clone(), body)
            .with_footer(page_footer(self.current + 1, self.total_pages()))
            .with_author_icon(self.author_icon_url.clone())
    }
}

#[async_trait]
impl PageSource for ListPages {
    async fn get_page(
        &mut self,
        _user_id: serenity::UserId,
        navigation: Option<Navigation>,
    ) -> anyhow::Result<Page> {
        if let Some(navigation) = navigation {
            self.current = navigation.apply(self.current, self.total_pages());
        }

        Ok(self.current_page())
    }

    async fn close(&mut self, message: PaginatedMessage) -> anyhow::Result<()> {
        let Some(editor) = self.editor.as_ref() else {
            return Ok(());
        };

        let edited = editor
            .edit_page(message, &self.current_page().without_footer())
            .await;
        let cleared = editor.clear_reactions(message).await;

        edited.and(cleared)
    }
}
