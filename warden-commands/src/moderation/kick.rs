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
    name: "kick",
    desc: "Kick a user from the server.",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The user to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::KICK_MEMBERS,
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
        ctx.say(moderation_self_action_message(PunishmentKind::Kick))
            .await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    if let Err(source) = guild_id.kick_with_reason(ctx.http(), user.id, &reason).await {
        error!(?source, target = user.id.get(), "kick request failed");
        ctx.say(moderation_failed_message(PunishmentKind::Kick))
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
            PunishmentKind::Kick,
            reason,
        ),
    )
    .await
}
