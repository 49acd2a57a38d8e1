use poise::serenity_prelude as serenity;

/// Resolve a member's effective guild permissions from their roles.
///
/// The guild owner always resolves to every permission.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let roles = guild_id.roles(http).await?;

    Ok(combine_role_permissions(
        guild_id,
        &member.roles,
        roles.values().map(|role| (role.id, role.permissions)),
    ))
}

/// Union of the `@everyone` role and every role the member holds.
pub fn combine_role_permissions(
    guild_id: serenity::GuildId,
    member_roles: &[serenity::RoleId],
    guild_roles: impl IntoIterator<Item = (serenity::RoleId, serenity::Permissions)>,
) -> serenity::Permissions {
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    guild_roles
        .into_iter()
        .filter(|(role_id, _)| *role_id == everyone_role_id || member_roles.contains(role_id))
        .fold(serenity::Permissions::empty(), |resolved, (_, permissions)| {
            resolved | permissions
        })
}

pub fn grants(perms: serenity::Permissions, required: serenity::Permissions) -> bool {
    perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(grants(perms, required))
}
