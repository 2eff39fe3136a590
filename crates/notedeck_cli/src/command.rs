use std::fmt::{Display, Formatter};

/// One line of user input while no modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    New,
    /// 1-based card index.
    Edit(usize),
    /// 1-based card index.
    Delete(usize),
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingIndex(&'static str),
    BadIndex(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("type a command, or `help`"),
            Self::Unknown(word) => write!(f, "unknown command `{word}`; try `help`"),
            Self::MissingIndex(command) => write!(f, "usage: {command} <number>"),
            Self::BadIndex(value) => write!(f, "`{value}` is not a note number"),
        }
    }
}

pub const HELP: &str = "\
commands:
  list            show notes
  refresh         reload notes from the store
  new             create a note
  edit <n>        edit note number n
  delete <n>      delete note number n
  dismiss         hide the current message
  help            show this help
  quit            exit
while editing, enter `:cancel` at any prompt to discard the draft";

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Err(ParseError::Empty);
    };

    match word.to_ascii_lowercase().as_str() {
        "list" | "ls" => Ok(Command::List),
        "refresh" | "r" => Ok(Command::Refresh),
        "new" | "n" => Ok(Command::New),
        "edit" | "e" => parse_index(words.next(), "edit").map(Command::Edit),
        "delete" | "rm" => parse_index(words.next(), "delete").map(Command::Delete),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(ParseError::Unknown(word.to_string())),
    }
}

fn parse_index(value: Option<&str>, command: &'static str) -> Result<usize, ParseError> {
    let value = value.ok_or(ParseError::MissingIndex(command))?;
    match value.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(ParseError::BadIndex(value.to_string())),
    }
}
