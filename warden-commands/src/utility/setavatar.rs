use tracing::{info, warn};

use crate::CommandMeta;
use crate::utility::embeds::avatar_updated_message;
use warden_core::{Context, Error};
use warden_utils::avatar::update_avatar;

pub const META: CommandMeta = CommandMeta {
    name: "setavatar",
    desc: "Change the bot's avatar to an image URL (owners only).",
    category: "utility",
    usage: "!setavatar <image url>",
};

/// Download and apply a new avatar.
///
/// Failures are never shown to the invoker; they are logged with their kind
/// and the usual acknowledgement is sent.
#[poise::command(prefix_command, slash_command, owners_only, category = "Utility")]
pub async fn setavatar(
    ctx: Context<'_>,
    #[description = "Image URL"] url: Option<String>,
) -> Result<(), Error> {
    let Some(url) = url else {
        ctx.say(format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    match update_avatar(ctx.http(), &ctx.data().http_client, &url).await {
        Ok(()) => info!(requested_by = ctx.author().id.get(), "bot avatar updated"),
        Err(err) => warn!(
            kind = err.kind(),
            %err,
            requested_by = ctx.author().id.get(),
            "avatar update failed"
        ),
    }

    ctx.say(avatar_updated_message(ctx.author().id.get()))
        .await?;
    Ok(())
}
