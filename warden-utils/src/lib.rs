/// Avatar download and apply helpers.
pub mod avatar;
/// Compact duration parsing and formatting.
pub mod duration;
/// Generic embed builders shared across commands.
pub mod embed;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Reaction-driven pagination engine.
pub mod pagination;
/// Permission helper utilities.
pub mod permissions;
