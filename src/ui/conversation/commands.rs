use std::str::FromStr;

use crate::conversation::RetrievalWidth;

use strum::{IntoEnumIterator, EnumIter, EnumString, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Start over with a fresh conversation
    Clear,
    /// Change how many sources the answer is drawn from
    Sources,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Target width for `/sources <n>`; `None` when absent or not on the menu
    pub fn width_target(&self) -> Option<RetrievalWidth> {
        if self.command != SlashCommand::Sources {
            return None;
        }
        self.argument()?.parse().ok()
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear the conversation",
            SlashCommand::Sources => "set the number of sources consulted (2, 4, 6 or 8)",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Whether this command can be run while a question is pending.
    pub fn available_while_pending(self) -> bool {
        match self {
            SlashCommand::Help | SlashCommand::Quit => true,
            SlashCommand::Clear | SlashCommand::Sources => false,
        }
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "c" | "reset" => Some(SlashCommand::Clear),
        "k" | "top-k" | "topk" => Some(SlashCommand::Sources),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let commands: Vec<String> = SlashCommand::iter()
        .map(|c| format!("/{} {}", c.command(), c.description()))
        .collect();

    format!(
        "{}  ·  keys: Enter send, Shift+Enter newline, Tab sources ({}), Ctrl+L clear, PgUp/PgDn scroll, Esc quit",
        commands.join("  ·  "),
        RetrievalWidth::menu()
    )
}
