use std::time::Duration;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    database::Database,
    model::punishment::{NewPunishment, Punishment, PunishmentKind},
};

const PUNISHMENT_COUNT_TTL: Duration = Duration::from_secs(60 * 5);

#[derive(sqlx::FromRow)]
struct PunishmentRow {
    id: i64,
    guild_id: i64,
    target_id: i64,
    moderator_id: i64,
    kind: String,
    reason: String,
    duration_seconds: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PunishmentRow> for Punishment {
    type Error = anyhow::Error;

    fn try_from(row: PunishmentRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
            target_id: u64::try_from(row.target_id).context("target_id row out of u64 range")?,
            moderator_id: u64::try_from(row.moderator_id)
                .context("moderator_id row out of u64 range")?,
            kind: PunishmentKind::from_key(&row.kind)
                .with_context(|| format!("unknown punishment kind `{}`", row.kind))?,
            reason: row.reason,
            duration_seconds: row
                .duration_seconds
                .map(u64::try_from)
                .transpose()
                .context("duration_seconds row out of u64 range")?,
            created_at: row.created_at,
        })
    }
}

fn count_cache_key(db: &Database, guild_id: u64, target_id: u64) -> String {
    db.cache()
        .key(format!("punishments:count:{guild_id}:{target_id}"))
}

/// Store a punishment and return the persisted record.
pub async fn record_punishment(
    db: &Database,
    punishment: &NewPunishment,
) -> anyhow::Result<Punishment> {
    let guild_id_i64 = i64::try_from(punishment.guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 =
        i64::try_from(punishment.target_id).context("target_id out of i64 range")?;
    let moderator_id_i64 =
        i64::try_from(punishment.moderator_id).context("moderator_id out of i64 range")?;
    let duration_seconds_i64 = punishment
        .duration_seconds
        .map(i64::try_from)
        .transpose()
        .context("duration_seconds out of i64 range")?;

    let row: PunishmentRow = sqlx::query_as(
        "INSERT INTO punishments
             (guild_id, target_id, moderator_id, kind, reason, duration_seconds, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, guild_id, target_id, moderator_id, kind, reason, duration_seconds, created_at",
    )
    .bind(guild_id_i64)
    .bind(target_id_i64)
    .bind(moderator_id_i64)
    .bind(punishment.kind.as_str())
    .bind(&punishment.reason)
    .bind(duration_seconds_i64)
    .bind(punishment.created_at)
    .fetch_one(db.pool())
    .await?;

    let cache_key = count_cache_key(db, punishment.guild_id, punishment.target_id);
    if let Err(e) = db.cache().del(&cache_key).await {
        warn!(?e, cache_key = %cache_key, "cache invalidation failed after recording punishment");
    }

    Punishment::try_from(row)
}

/// Return one window of a target's punishments, newest first.
pub async fn punishments_for_target(
    db: &Database,
    guild_id: u64,
    target_id: u64,
    offset: u64,
    limit: u32,
) -> anyhow::Result<Vec<Punishment>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = i64::try_from(target_id).context("target_id out of i64 range")?;
    let offset_i64 = i64::try_from(offset).context("offset out of i64 range")?;

    let rows: Vec<PunishmentRow> = sqlx::query_as(
        "SELECT id, guild_id, target_id, moderator_id, kind, reason, duration_seconds, created_at
         FROM punishments
         WHERE guild_id = $1 AND target_id = $2
         ORDER BY created_at DESC, id DESC
         LIMIT $3 OFFSET $4",
    )
    .bind(guild_id_i64)
    .bind(target_id_i64)
    .bind(i64::from(limit))
    .bind(offset_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Punishment::try_from).collect()
}

/// Count a target's punishments, served from the cache when possible.
pub async fn count_punishments_for_target(
    db: &Database,
    guild_id: u64,
    target_id: u64,
) -> anyhow::Result<u64> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = i64::try_from(target_id).context("target_id out of i64 range")?;
    let cache_key = count_cache_key(db, guild_id, target_id);

    db.cache()
        .get_or_load_json(&cache_key, PUNISHMENT_COUNT_TTL, || async {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM punishments WHERE guild_id = $1 AND target_id = $2",
            )
            .bind(guild_id_i64)
            .bind(target_id_i64)
            .fetch_one(db.pool())
            .await?;

            u64::try_from(count).context("punishment count out of u64 range")
        })
        .await
}
