use poise::serenity_prelude as serenity;
use tracing::trace;

use warden_core::Data;
use warden_utils::pagination::PageReaction;

pub fn handle_reaction_add(data: &Data, reaction: &serenity::Reaction) {
    let Some(reaction) = PageReaction::from_reaction(reaction) else {
        return;
    };

    let message_id = reaction.message_id.get();
    if data.pagination.handle_reaction(reaction) {
        trace!(message_id, "page turn queued");
    }
}

/// Stop paginating a message whose reactions were wiped or that no longer
/// exists.
pub async fn handle_message_gone(data: &Data, message_id: serenity::MessageId) {
    data.pagination.release(message_id).await;
}
