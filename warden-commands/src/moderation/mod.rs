pub mod ban;
pub(crate) mod embeds;
pub mod kick;
mod pages;
pub mod punishments;
mod record;
pub mod timeout;
pub mod warn;

pub use pages::PunishmentPages;
