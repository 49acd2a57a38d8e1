pub mod moderation;
pub mod utility;

use warden_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    utility::setavatar::META,
    moderation::warn::META,
    moderation::kick::META,
    moderation::ban::META,
    moderation::timeout::META,
    moderation::punishments::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        utility::setavatar::setavatar(),
        moderation::warn::warn(),
        moderation::kick::kick(),
        moderation::ban::ban(),
        moderation::timeout::timeout(),
        moderation::punishments::punishments(),
    ]
}
