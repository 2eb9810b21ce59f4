//! CLI module
//!
//! Command-line interface over the library.
//!
//! # Commands
//!
//! - `search` - Search repositories and print the results
//! - `download` - Download a repository snapshot into a directory

mod commands;
mod runner;

pub use commands::{Cli, Commands, OrderArg, SortArg};
pub use runner::Runner;
