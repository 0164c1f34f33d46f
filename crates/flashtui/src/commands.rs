//! `:` command line.

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `q`, `quit`
    Quit,
    /// `browse [query]`
    Browse(String),
    /// `decks`
    Decks,
    /// `help`
    Help,
    Unknown(String),
}

pub const HELP: &str = "Commands:  :decks  deck list  |  :browse [text]  notes containing text  |  :help  |  :q  quit";

impl Command {
    /// Parse a command line. `None` for a blank line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let command = match name {
            "q" | "quit" => Self::Quit,
            "browse" | "b" => Self::Browse(rest.to_string()),
            "decks" | "d" => Self::Decks,
            "help" | "h" => Self::Help,
            _ => Self::Unknown(line.to_string()),
        };
        Some(command)
    }
}
