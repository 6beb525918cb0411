//! Cadence Shell Library
//!
//! Line-oriented front end for the Cadence sequencer: typed commands become
//! intents, file chooser requests are answered from the same input, and
//! "loading" a track reads its tags.
//!
//! This library exposes the shell components for testing purposes.

pub mod backend;
pub mod command;
pub mod config;
pub mod shell;

pub use backend::TagBackend;
pub use command::{Command, CommandError};
pub use config::{ShellConfig, ShellSettings};
pub use shell::{execute, spawn_event_printer, Shell};
