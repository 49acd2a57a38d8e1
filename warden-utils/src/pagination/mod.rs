//! Reaction-driven pagination.
//!
//! A command sends the first page, builds a [`Paginator`] for the sent
//! message and registers it with the shared [`PaginationService`]. The gateway
//! event handler feeds reactions into the service, which routes them to the
//! paginator for that message and edits the message with the page it returns.

mod editor;
mod emotes;
mod list;
mod page;
mod paginator;
mod respond;
mod service;
#[cfg(test)]
mod test_support;

pub use editor::{HttpMessageEditor, MessageEditor, PaginatedMessage};
pub use emotes::{
    EmoteSet, FIRST_EMOTE, LAST_EMOTE, NEXT_EMOTE, Navigation, PREVIOUS_EMOTE, STOP_EMOTE,
    same_emote, unicode,
};
pub use list::ListPages;
pub use page::{Page, page_footer, page_window, total_pages};
pub use paginator::{PageSource, Paginator};
pub use respond::{paginate_list, send_paginated};
pub use service::{PAGINATION_IDLE_TIMEOUT, PageReaction, PaginationService};
