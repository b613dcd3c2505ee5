#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    More,
    Reset,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands: /more (older messages), /reset (new session), /help, /quit";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/more" => SlashCommand::More,
        "/reset" => SlashCommand::Reset,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
