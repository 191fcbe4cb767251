//! Glean CLI library.
//!
//! Configuration, input loading, command execution and output formatting
//! for the `glean` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use loader::{load_document, LoadedDocument};
pub use output::Formatter;
