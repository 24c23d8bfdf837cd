//! Terminal surface: message/roster formatting and the input prompt.

pub mod formatter;

pub use formatter::MessageFormatter;

use std::io::Write;

/// Redisplay the prompt after output has scrolled it away.
///
/// The prompt reflects the conversation target: `alice> ` for the public
/// room, `alice@bob> ` while a private target is selected.
pub fn redisplay_prompt(name: &str, target: Option<&str>) {
    match target {
        Some(peer) => print!("{}@{}> ", name, peer),
        None => print!("{}> ", name),
    }
    std::io::stdout().flush().ok();
}
