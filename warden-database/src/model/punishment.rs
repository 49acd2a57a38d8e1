use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The concrete moderation action a punishment records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentKind {
    Warn,
    Kick,
    Ban,
    Timeout,
}

impl PunishmentKind {
    /// Storage key used in the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Timeout => "timeout",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "warn" => Some(Self::Warn),
            "kick" => Some(Self::Kick),
            "ban" => Some(Self::Ban),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Warn => "Warn",
            Self::Kick => "Kick",
            Self::Ban => "Ban",
            Self::Timeout => "Timeout",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Warn => "warned",
            Self::Kick => "kicked",
            Self::Ban => "banned",
            Self::Timeout => "timed out",
        }
    }
}

/// A stored punishment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punishment {
    pub id: i64,
    pub guild_id: u64,
    pub target_id: u64,
    pub moderator_id: u64,
    pub kind: PunishmentKind,
    pub reason: String,
    /// Set for timeouts.
    pub duration_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// A punishment about to be stored. `created_at` is stamped on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPunishment {
    pub guild_id: u64,
    pub target_id: u64,
    pub moderator_id: u64,
    pub kind: PunishmentKind,
    pub reason: String,
    pub duration_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl NewPunishment {
    pub fn new(
        guild_id: u64,
        target_id: u64,
        moderator_id: u64,
        kind: PunishmentKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            guild_id,
            target_id,
            moderator_id,
            kind,
            reason: reason.into(),
            duration_seconds: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}
