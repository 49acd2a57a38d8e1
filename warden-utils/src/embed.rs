use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x3B_5B_7A;

/// Build the embed for a single page, with the title moved into the author
/// line when an icon is available.
pub fn page_embed(
    title: &str,
    body: &str,
    footer: Option<&str>,
    author_icon_url: Option<&str>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(body.to_owned());

    if let Some(footer) = footer.filter(|text| !text.is_empty()) {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }

    if let Some(url) = author_icon_url {
        embed = embed.author(serenity::CreateEmbedAuthor::new(title).icon_url(url));
    } else {
        embed = embed.title(title.to_owned());
    }

    embed
}

/// Build a plain notice embed with the default styling.
pub fn notice_embed(title: &str, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title.to_owned())
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
}
