use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, guild_only_message, moderation_failed_message, moderation_self_action_message,
    usage_message,
};
use crate::moderation::record::record_and_announce;
use warden_core::{Context, Error};
use warden_database::model::punishment::{NewPunishment, PunishmentKind};
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Ban a user from the server.",
    category: "moderation",
    usage: "!ban <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: Option<serenity::User>,
    #[description = "Reason for the ban"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::BAN_MEMBERS,
    )
    .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message(PunishmentKind::Ban))
            .await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    if let Err(source) = guild_id
        .ban_with_reason(ctx.http(), user.id, 0, &reason)
        .await
    {
        error!(?source, target = user.id.get(), "ban request failed");
        ctx.say(moderation_failed_message(PunishmentKind::Ban))
            .await?;
        return Ok(());
    }

    record_and_announce(
        ctx,
        &user,
        NewPunishment::new(
            guild_id.get(),
            user.id.get(),
            ctx.author().id.get(),
            PunishmentKind::Ban,
            reason,
        ),
    )
    .await
}
