use std::env;
use std::time::Duration;

use anyhow::Context as _;

use warden_utils::pagination::PAGINATION_IDLE_TIMEOUT;

pub const DEFAULT_REDIS_KEY_PREFIX: &str = "warden:prod";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Startup settings read from the environment.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub database_url: String,
    pub guild_id: u64,
    pub database_max_connections: u32,
    pub redis_enabled: bool,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub auto_run_migrations: bool,
    pub pagination_idle_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{key} is not set"))
        };

        let guild_id = required("DISCORD_GUILD_ID")?
            .parse::<u64>()
            .context("DISCORD_GUILD_ID must be a numeric guild id")?;

        let idle_seconds = parse_u64(
            lookup("PAGINATION_IDLE_SECONDS").as_deref(),
            PAGINATION_IDLE_TIMEOUT.as_secs(),
        );
        let max_connections = parse_u64(
            lookup("DATABASE_MAX_CONNECTIONS").as_deref(),
            u64::from(DEFAULT_DATABASE_MAX_CONNECTIONS),
        );

        Ok(Self {
            token: required("DISCORD_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            guild_id,
            database_max_connections: u32::try_from(max_connections)
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS)
                .max(1),
            redis_enabled: parse_bool(lookup("REDIS_ENABLED").as_deref(), false),
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
            redis_key_prefix: lookup("REDIS_KEY_PREFIX")
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REDIS_KEY_PREFIX.to_owned()),
            auto_run_migrations: parse_bool(lookup("AUTO_RUN_MIGRATIONS").as_deref(), true),
            pagination_idle_timeout: Duration::from_secs(idle_seconds.max(1)),
        })
    }
}

pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

pub fn parse_u64(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
