use std::fmt;
use std::str::FromStr;

use vocab_core::model::{FavoriteListId, ParseIdError};

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Catalog,
    Quiz { start: i64, end: i64 },
    Know,
    DontKnow,
    Next,
    Results,
    Save { name: Option<String> },
    Lists,
    Show(FavoriteListId),
    Replay(FavoriteListId),
    Delete(FavoriteListId),
    Register {
        email: String,
        password: String,
        first_name: String,
        last_name: String,
    },
    Login { email: String, password: String },
    Logout,
    WhoAmI,
    Reset,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    Usage(&'static str),
    InvalidNumber(String),
    InvalidId(ParseIdError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => f.write_str("empty command"),
            CommandError::Unknown(word) => {
                write!(f, "unknown command: {word} (type `help` for a list)")
            }
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
            CommandError::InvalidNumber(raw) => write!(f, "not a whole number: {raw}"),
            CommandError::InvalidId(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  catalog                      reload the word catalog
  quiz <start> <end>           quiz catalog words [start, end)
  know | y                     you knew the current word
  dont | n                     you did not know it
  next                         move to the next word
  results                      show the session results
  save [name]                  save unknown words as a list (login required)
  lists                        show your saved lists
  show <id>                    show the words of a saved list
  replay <id>                  quiz a saved list
  delete <id>                  delete a saved list
  register <email> <password> <first> <last>
  login <email> <password>
  logout | whoami
  reset                        clear the current session
  help | quit";

fn parse_number(raw: &str) -> Result<i64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

fn parse_list_id<'a>(
    mut args: impl Iterator<Item = &'a str>,
    usage: &'static str,
) -> Result<FavoriteListId, CommandError> {
    let raw = args.next().ok_or(CommandError::Usage(usage))?;
    raw.parse().map_err(CommandError::InvalidId)
}

impl FromStr for ShellCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(CommandError::Empty)?;

        let command = match head.to_lowercase().as_str() {
            "help" | "?" => ShellCommand::Help,
            "catalog" => ShellCommand::Catalog,
            "quiz" | "start" => {
                let (Some(start), Some(end)) = (words.next(), words.next()) else {
                    return Err(CommandError::Usage("quiz <start> <end>"));
                };
                ShellCommand::Quiz {
                    start: parse_number(start)?,
                    end: parse_number(end)?,
                }
            }
            "know" | "y" | "yes" => ShellCommand::Know,
            "dont" | "n" | "no" => ShellCommand::DontKnow,
            "next" => ShellCommand::Next,
            "results" => ShellCommand::Results,
            "save" => {
                let name = words.collect::<Vec<_>>().join(" ");
                ShellCommand::Save {
                    name: (!name.is_empty()).then_some(name),
                }
            }
            "lists" => ShellCommand::Lists,
            "show" => ShellCommand::Show(parse_list_id(words, "show <id>")?),
            "replay" => ShellCommand::Replay(parse_list_id(words, "replay <id>")?),
            "delete" => ShellCommand::Delete(parse_list_id(words, "delete <id>")?),
            "register" => {
                let (Some(email), Some(password)) = (words.next(), words.next()) else {
                    return Err(CommandError::Usage(
                        "register <email> <password> <first> <last>",
                    ));
                };
                let first_name = words.next().unwrap_or_default().to_string();
                let last_name = words.collect::<Vec<_>>().join(" ");
                ShellCommand::Register {
                    email: email.to_string(),
                    password: password.to_string(),
                    first_name,
                    last_name,
                }
            }
            "login" => {
                let (Some(email), Some(password)) = (words.next(), words.next()) else {
                    return Err(CommandError::Usage("login <email> <password>"));
                };
                ShellCommand::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                }
            }
            "logout" => ShellCommand::Logout,
            "whoami" => ShellCommand::WhoAmI,
            "reset" => ShellCommand::Reset,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        Ok(command)
    }
}
