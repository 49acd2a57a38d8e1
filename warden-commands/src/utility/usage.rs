use warden_core::{Context, Error};

use crate::utility::embeds::{find_command, unknown_command_message};
use crate::{COMMANDS, CommandMeta};

pub const META: CommandMeta = CommandMeta {
    name: "usage",
    desc: "Show usage syntax for a specific command.",
    category: "utility",
    usage: "!usage <command>",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn usage(
    ctx: Context<'_>,
    #[description = "Command name"] command: Option<String>,
) -> Result<(), Error> {
    let Some(raw_name) = command.as_deref() else {
        ctx.say(format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    let reply = match find_command(COMMANDS, raw_name) {
        Some(command) => format!("Usage: `{}`", command.usage),
        None => unknown_command_message(raw_name),
    };

    ctx.say(reply).await?;
    Ok(())
}
