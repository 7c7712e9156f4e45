//! Session input commands.

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a command is a reference to analyze.
    Submit(String),
    /// `:lang` lists languages, `:lang <name>` selects one.
    Language(Option<String>),
    /// `:edit` clears the input and drops in-flight work.
    Edit,
    /// `:state` prints the current snapshot.
    State,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            return Command::Submit(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        match name {
            "lang" | "language" => Command::Language(arg.map(str::to_string)),
            "edit" | "clear" => Command::Edit,
            "state" => Command::State,
            "help" | "h" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
Paste a YouTube URL to analyze it.
  :lang [name]   list languages or select one
  :edit          clear the current result
  :state         print the current state as JSON
  :quit          leave the session";
