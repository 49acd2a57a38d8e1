pub(crate) mod embeds;
pub mod help;
pub mod ping;
pub mod setavatar;
pub mod usage;
