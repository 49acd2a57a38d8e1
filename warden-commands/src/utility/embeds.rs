use crate::CommandMeta;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

pub fn page_out_of_range_message(requested_page: usize, total_pages: usize) -> String {
    format!(
        "Page {} does not exist. Available pages: 1-{}.",
        requested_page, total_pages
    )
}

pub fn unknown_command_message(raw_name: &str) -> String {
    format!("Unknown command: `{}`", normalize_command_name(raw_name))
}

/// Look up a command by name, accepting a leading prefix and any casing.
pub fn find_command<'a>(commands: &'a [CommandMeta], raw_name: &str) -> Option<&'a CommandMeta> {
    let lookup = normalize_command_name(raw_name);
    commands.iter().find(|command| command.name == lookup)
}

fn normalize_command_name(raw_name: &str) -> String {
    raw_name
        .trim()
        .trim_start_matches(warden_utils::COMMAND_PREFIX)
        .to_ascii_lowercase()
}

pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!("`{}`: {}\n", command.name, command.desc));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

/// Acknowledgement sent after an avatar change request.
pub fn avatar_updated_message(requester_id: u64) -> String {
    format!("<@{requester_id}>, the avatar has been updated.")
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
