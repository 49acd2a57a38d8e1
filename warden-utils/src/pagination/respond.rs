use std::sync::Arc;

use tracing::warn;

use super::editor::PaginatedMessage;
use super::emotes::EmoteSet;
use super::list::ListPages;
use super::page::Page;
use super::paginator::{PageSource, Paginator};
use super::service::PaginationService;

/// Send `first_page` and make it react-navigable through `source`.
///
/// The paginator only listens to the invoking author. Failing to add the
/// navigation reactions is logged and does not fail the call.
pub async fn send_paginated<U, E>(
    ctx: poise::Context<'_, U, E>,
    service: &PaginationService,
    first_page: Page,
    emotes: EmoteSet,
    source: impl PageSource + 'static,
) -> anyhow::Result<Arc<Paginator>>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let reply = ctx
        .send(poise::CreateReply::default().embed(first_page.to_embed()))
        .await?;
    let sent = reply.message().await?;
    let message = PaginatedMessage::from(&*sent);

    let paginator = Paginator::new(message, emotes, source)
        .owned_by(ctx.author().id)
        .register(service);

    if let Err(err) = service
        .editor()
        .add_reactions(message, paginator.emotes())
        .await
    {
        warn!(
            ?err,
            message_id = message.message_id.get(),
            "failed to add pagination reactions"
        );
    }

    Ok(paginator)
}

/// Paginate pre-rendered page bodies. A single page is sent as a plain embed.
pub async fn paginate_list<U, E>(
    ctx: poise::Context<'_, U, E>,
    service: &PaginationService,
    title: &str,
    pages: Vec<String>,
    start_page: usize,
    author_icon_url: Option<&str>,
) -> anyhow::Result<()>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if pages.is_empty() {
        return Ok(());
    }

    let list = ListPages::new(title, pages)
        .starting_at(start_page)
        .with_author_icon(author_icon_url);

    if list.total_pages() <= 1 {
        let page = list.current_page().without_footer();
        ctx.send(poise::CreateReply::default().embed(page.to_embed()))
            .await?;
        return Ok(());
    }

    let first_page = list.current_page();
    let list = list.clear_on_close(service.editor());
    send_paginated(ctx, service, first_page, EmoteSet::standard(), list).await?;

    Ok(())
}
