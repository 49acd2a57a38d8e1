use poise::serenity_prelude as serenity;

use crate::moderation::embeds::{moderation_action_embed, target_profile_from_user};
use warden_core::{Context, Error};
use warden_database::impls::punishments::record_punishment;
use warden_database::model::punishment::NewPunishment;

/// Store the punishment and reply with the action embed, tagged with the
/// punishment id.
pub(crate) async fn record_and_announce(
    ctx: Context<'_>,
    target: &serenity::User,
    punishment: NewPunishment,
) -> Result<(), Error> {
    let stored = record_punishment(&ctx.data().db, &punishment).await?;

    let target_profile = target_profile_from_user(target);
    let embed = moderation_action_embed(
        &target_profile,
        target.id,
        stored.kind,
        &stored.reason,
        stored.duration_seconds,
    )
    .footer(serenity::CreateEmbedFooter::new(format!("#{}", stored.id)));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
