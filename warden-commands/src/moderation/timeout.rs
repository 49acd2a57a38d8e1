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
use warden_utils::duration::parse_duration_seconds;
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user for a duration (default: 10m).",
    category: "moderation",
    usage: "!timeout <user> [duration] [reason]",
};

const DEFAULT_TIMEOUT_SECS: u64 = 10 * 60;
/// Discord caps communication timeouts at 28 days.
pub const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: Option<serenity::User>,
    #[description = "Duration (e.g. 10m, 2h)"] duration: Option<String>,
    #[description = "Reason for timeout"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MODERATE_MEMBERS,
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
        ctx.say(moderation_self_action_message(PunishmentKind::Timeout))
            .await?;
        return Ok(());
    }

    let Some(seconds) = timeout_seconds(duration.as_deref()) else {
        ctx.say(invalid_duration_message()).await?;
        return Ok(());
    };

    let until = serenity::Timestamp::from_unix_timestamp(
        serenity::Timestamp::now().unix_timestamp() + i64::try_from(seconds)?,
    )?;
    let edit = serenity::EditMember::new().disable_communication_until_datetime(until);

    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        error!(?source, target = user.id.get(), "timeout request failed");
        ctx.say(moderation_failed_message(PunishmentKind::Timeout))
            .await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    record_and_announce(
        ctx,
        &user,
        NewPunishment::new(
            guild_id.get(),
            user.id.get(),
            ctx.author().id.get(),
            PunishmentKind::Timeout,
            reason,
        )
        .with_duration(seconds),
    )
    .await
}

/// Resolve the requested duration. Missing input falls back to ten minutes;
/// anything unparsable or longer than Discord allows is rejected.
fn timeout_seconds(raw: Option<&str>) -> Option<u64> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            parse_duration_seconds(raw).filter(|seconds| *seconds <= MAX_TIMEOUT_SECS)
        }
        _ => Some(DEFAULT_TIMEOUT_SECS),
    }
}

fn invalid_duration_message() -> String {
    format!(
        "Invalid duration. Usage: `{}` (examples: 30s, 10m, 2h, 1d; at most 28d)",
        META.usage
    )
}
