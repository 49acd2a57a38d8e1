use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::PunishmentPages;
use crate::moderation::embeds::{guild_only_message, target_profile_from_user, usage_message};
use warden_core::{Context, Error};
use warden_database::impls::punishments::count_punishments_for_target;
use warden_utils::pagination::{EmoteSet, send_paginated};
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "punishments",
    desc: "Browse a user's punishment history.",
    category: "moderation",
    usage: "!punishments <user>",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn punishments(
    ctx: Context<'_>,
    #[description = "The user to look up"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_MESSAGES,
    )
    .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let data = ctx.data();
    let total = count_punishments_for_target(&data.db, guild_id.get(), user.id.get()).await?;
    let profile = target_profile_from_user(&user);

    let pages = PunishmentPages::new(
        data.db.clone(),
        data.pagination.editor(),
        guild_id.get(),
        user.id.get(),
        format!("Punishments for {}", profile.display_name),
        total,
    )
    .with_author_icon(profile.avatar_url);

    let first_page = pages.load_current().await?;
    if pages.total_pages() <= 1 {
        ctx.send(poise::CreateReply::default().embed(first_page.without_footer().to_embed()))
            .await?;
        return Ok(());
    }

    send_paginated(ctx, &data.pagination, first_page, EmoteSet::standard(), pages).await?;
    Ok(())
}
