//! Parser for bot commands in comment text.

use super::types::Command;

const COMMANDS: [Command; 2] = [Command::Merge, Command::Squash];

/// Parses a comment body into a command.
///
/// # Parsing Rules
///
/// - Surrounding whitespace is ignored
/// - What remains must equal a command token exactly
/// - Matching is case-sensitive
/// - Commands embedded in longer text, or with trailing punctuation, do not
///   count
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    COMMANDS.into_iter().find(|cmd| cmd.token() == text)
}
