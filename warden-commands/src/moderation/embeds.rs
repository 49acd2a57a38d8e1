use poise::serenity_prelude as serenity;

use warden_database::model::punishment::{Punishment, PunishmentKind};
use warden_utils::duration::format_compact_duration;
use warden_utils::embed::DEFAULT_EMBED_COLOR;

pub const NO_REASON: &str = "No reason provided";

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub fn target_profile_from_user(user: &serenity::User) -> TargetProfile {
    TargetProfile {
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
        avatar_url: Some(user.face()),
    }
}

/// Keep user-supplied text from pinging anyone.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

pub fn moderation_action_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    kind: PunishmentKind,
    reason: &str,
    duration_seconds: Option<u64>,
) -> serenity::CreateEmbed {
    let mut description = format!(
        "**Target :** <@{}>\n**Reason :** {}",
        target_user_id.get(),
        sanitize_mentions(reason)
    );
    if let Some(seconds) = duration_seconds {
        description.push_str(&format!(
            "\n**Duration :** {}",
            format_compact_duration(seconds)
        ));
    }
    let heading = format!(
        "{} has been {}",
        target_profile.display_name,
        kind.past_tense()
    );

    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    match target_profile.avatar_url.as_deref() {
        Some(url) => embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(url)),
        None => embed.title(heading),
    }
}

/// One history entry as shown on a punishments page.
pub fn punishment_line(punishment: &Punishment) -> String {
    let ts = punishment.created_at.timestamp();
    let duration = punishment
        .duration_seconds
        .map(|seconds| format!(" ({})", format_compact_duration(seconds)))
        .unwrap_or_default();

    format!(
        "`#{id}` **{kind}**{duration} • by <@{mod_id}>\n**Reason :** {reason}\n**When :** <t:{ts}:R> • <t:{ts}:f>",
        id = punishment.id,
        kind = punishment.kind.display_name(),
        mod_id = punishment.moderator_id,
        reason = sanitize_mentions(&punishment.reason),
    )
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn moderation_self_action_message(kind: PunishmentKind) -> String {
    format!("You can't {} yourself.", kind.as_str())
}

pub fn moderation_bot_target_message() -> &'static str {
    "You can't use moderation actions on bots or application accounts."
}

pub fn moderation_failed_message(kind: PunishmentKind) -> String {
    format!(
        "I couldn't {} that user. Check role hierarchy and permissions.",
        kind.as_str()
    )
}
