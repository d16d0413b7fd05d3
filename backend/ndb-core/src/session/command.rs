pub const SOURCES_COMMAND: &str = "sources";
pub const SOURCES_ALL_FLAG: &str = "--all";
pub const EXIT_COMMAND: &str = "exit";

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// `sources [--all]`
    Sources { all: bool },
    /// `exit`
    Exit,
    /// Anything else; ignored by the command loop.
    Unknown(String),
}

impl Command {
    /// Split on whitespace: the first field names the command, the rest are
    /// its arguments.
    pub fn parse(line: &str) -> Self {
        let mut fields = line.split_whitespace();

        let Some(name) = fields.next() else {
            return Command::Empty;
        };

        match name {
            EXIT_COMMAND => Command::Exit,
            SOURCES_COMMAND => Command::Sources {
                all: fields.any(|arg| arg == SOURCES_ALL_FLAG),
            },
            other => Command::Unknown(other.to_string()),
        }
    }
}
