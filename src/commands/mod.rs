//! Command parsing for bot commands.
//!
//! Reviewers drive the bot by posting a comment that consists of nothing but a
//! command token.
//!
//! # Supported Commands
//!
//! - `!merge` - Merge the PR once its statuses are green, squashing fixup
//!   commits first if needed
//! - `!squash` - Squash the PR's `fixup!`/`squash!` commits now
//!
//! # Example
//!
//! ```
//! use review_helper::commands::{parse_command, Command};
//!
//! assert_eq!(parse_command("  !merge\n"), Some(Command::Merge));
//! assert_eq!(parse_command("!squash"), Some(Command::Squash));
//! assert_eq!(parse_command("LGTM, !merge"), None);
//! ```

mod parser;
mod types;

pub use parser::parse_command;
pub use types::Command;
