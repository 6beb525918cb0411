//! Shell command parsing
//!
//! One command per line. Paths are whitespace-separated, so paths with
//! spaces are not supported from the prompt.

use cadence_sequencer::{PlaybackMode, Selection, TrackRef};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play/pause, loading something first if needed
    Toggle,
    Next,
    Previous,
    Add(Vec<TrackRef>),
    Remove(Vec<usize>),
    /// Set the mode, or cycle it when none is given
    Mode(Option<PlaybackMode>),
    List,
    History,
    /// Simulate the loaded track reaching its end
    Finish,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs at least one argument")]
    MissingArgument(&'static str),

    #[error("Not a playlist index: {0}")]
    InvalidIndex(String),

    #[error("{0}")]
    InvalidMode(String),
}

pub const HELP: &str = "\
commands:
  play | toggle        play/pause (asks for files when nothing is playable)
  next | prev          skip forward / back
  add <paths...>       append files to the playlist
  rm <indices...>      remove playlist entries
  mode [shuffle|all|one]
  list | history
  finish               pretend the current track ended
  quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let args: Vec<&str> = words.collect();

        match name.to_ascii_lowercase().as_str() {
            "play" | "toggle" | "p" => Ok(Command::Toggle),
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "b" => Ok(Command::Previous),
            "add" | "a" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument("add"));
                }
                Ok(Command::Add(args.into_iter().map(TrackRef::from).collect()))
            }
            "rm" | "remove" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument("rm"));
                }
                let indices = args
                    .into_iter()
                    .map(|arg| {
                        arg.parse::<usize>()
                            .map_err(|_| CommandError::InvalidIndex(arg.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Remove(indices))
            }
            "mode" | "m" => match args.first() {
                None => Ok(Command::Mode(None)),
                Some(mode) => mode
                    .parse()
                    .map(|mode| Command::Mode(Some(mode)))
                    .map_err(CommandError::InvalidMode),
            },
            "list" | "ls" => Ok(Command::List),
            "history" | "h" => Ok(Command::History),
            "finish" | "end" => Ok(Command::Finish),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Turn an input line into a file chooser answer
///
/// An empty line or `cancel` closes the chooser. Paths without one of the
/// allowed extensions are dropped, and only the first path is kept unless
/// `multiple` is set.
pub fn parse_selection(line: &str, multiple: bool, extensions: &[String]) -> Selection {
    let line = line.trim();
    if line.is_empty() || line.eq_ignore_ascii_case("cancel") {
        return Selection::Cancelled;
    }

    let mut chosen: Vec<TrackRef> = line
        .split_whitespace()
        .filter(|path| {
            let allowed = has_allowed_extension(path, extensions);
            if !allowed {
                warn!("Ignoring {}: not one of {:?}", path, extensions);
            }
            allowed
        })
        .map(TrackRef::from)
        .collect();

    if !multiple {
        chosen.truncate(1);
    }
    Selection::Chosen(chosen)
}

fn has_allowed_extension(path: &str, extensions: &[String]) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}
