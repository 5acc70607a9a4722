//! Commands understood by the interactive loop

/// One line of player input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dump both memories
    Memory,
    /// Persist both memories to disk
    Save,
    /// Show available commands
    Help,
    /// End the session
    Quit,
    /// Anything else is said to the Dungeon Master
    Say(String),
}

impl Command {
    /// Parse a line of input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let command = match line {
            "" => return None,
            ":m" | "--MEMORY" => Command::Memory,
            ":w" | "--SAVE" => Command::Save,
            ":h" | ":help" | "--HELP" => Command::Help,
            ":q" | "quit" | "exit" => Command::Quit,
            text => Command::Say(text.to_string()),
        };
        Some(command)
    }
}

/// `(aliases, description)` for every command, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    (":m, --MEMORY", "Show short-term and long-term memory"),
    (":w, --SAVE", "Save memory to disk"),
    (":h, :help, --HELP", "Show this help"),
    (":q, quit, exit", "End the session"),
];
