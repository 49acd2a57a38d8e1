use poise::serenity_prelude as serenity;

use crate::embed::page_embed;

/// A single rendered page of a paginated message.
///
/// Pages are values: once built they are only ever replaced, never edited in
/// place, so a page handed to the message editor always matches what a
/// source produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    title: String,
    body: String,
    footer: Option<String>,
    author_icon_url: Option<String>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            footer: None,
            author_icon_url: None,
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn without_footer(mut self) -> Self {
        self.footer = None;
        self
    }

    pub fn with_author_icon(mut self, url: Option<impl Into<String>>) -> Self {
        self.author_icon_url = url.map(Into::into);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn author_icon_url(&self) -> Option<&str> {
        self.author_icon_url.as_deref()
    }

    pub fn to_embed(&self) -> serenity::CreateEmbed {
        page_embed(
            &self.title,
            &self.body,
            self.footer(),
            self.author_icon_url(),
        )
    }
}

/// Footer text for a one-based page position.
pub fn page_footer(page: usize, total_pages: usize) -> String {
    format!("Page {}/{}", page.max(1), total_pages.max(1))
}

/// Number of pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    let pages = total_items.div_ceil(per_page);
    pages.max(1)
}

/// Half-open item range shown on one-based `page`.
pub fn page_window(total_items: usize, per_page: usize, page: usize) -> (usize, usize) {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = (start + per_page).min(total_items);
    (start, end)
}
