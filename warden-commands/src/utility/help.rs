use crate::utility::embeds::{
    grouped_help_description, page_out_of_range_message, unknown_category_message,
};
use crate::{COMMANDS, CommandMeta};
use warden_core::{Context, Error};
use warden_utils::pagination::{page_window, paginate_list, total_pages};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [page|category]",
};

const HELP_COMMANDS_PER_PAGE: usize = 10;

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Page number or category"] query: Option<String>,
) -> Result<(), Error> {
    let query = query.as_deref().map(str::trim).filter(|raw| !raw.is_empty());
    let parsed_page = query.and_then(|raw| raw.parse::<usize>().ok().filter(|page| *page >= 1));
    let category = match (query, parsed_page) {
        (Some(raw), None) => Some(raw.to_ascii_lowercase()),
        _ => None,
    };

    let categories = categories(COMMANDS);
    if let Some(wanted_category) = category.as_deref()
        && !categories.iter().any(|known| *known == wanted_category)
    {
        ctx.say(unknown_category_message(wanted_category, &categories))
            .await?;
        return Ok(());
    }

    let commands = sorted_commands(COMMANDS, category.as_deref());
    let requested_page = parsed_page.unwrap_or(1);
    let total = total_pages(commands.len(), HELP_COMMANDS_PER_PAGE);

    if requested_page > total {
        ctx.say(page_out_of_range_message(requested_page, total))
            .await?;
        return Ok(());
    }

    let pages = help_pages(&commands, HELP_COMMANDS_PER_PAGE);
    paginate_list(
        ctx,
        &ctx.data().pagination,
        "Available Commands",
        pages,
        requested_page,
        None,
    )
    .await?;
    Ok(())
}

fn categories(commands: &[CommandMeta]) -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = commands.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

fn help_pages(commands: &[&CommandMeta], per_page: usize) -> Vec<String> {
    let total = total_pages(commands.len(), per_page);
    (1..=total)
        .map(|page| {
            let (start, end) = page_window(commands.len(), per_page, page);
            grouped_help_description(&commands[start..end])
        })
        .collect()
}

fn sorted_commands<'a>(commands: &'a [CommandMeta], category: Option<&str>) -> Vec<&'a CommandMeta> {
    let mut filtered: Vec<&CommandMeta> = commands
        .iter()
        .filter(|cmd| match category {
            Some(wanted) => cmd.category == wanted,
            None => true,
        })
        .collect();

    filtered.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    filtered
}
