//! CLI commands and argument parsing

use crate::types::{SortKey, SortOrder};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// repo-courier CLI
#[derive(Parser, Debug)]
#[command(name = "repo-courier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(long, global = true, default_value = "https://api.github.com")]
    pub base_url: String,

    /// Token passed through as the authorization header
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Print status updates to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search repositories
    Search {
        /// Search query
        query: String,

        /// Number of results to collect
        #[arg(short, long, default_value = "30")]
        limit: usize,

        /// Sort key
        #[arg(long, value_enum, default_value = "best-match")]
        sort: SortArg,

        /// Sort order
        #[arg(long, value_enum, default_value = "desc")]
        order: OrderArg,

        /// Print raw JSON items instead of repository names
        #[arg(long)]
        json: bool,
    },

    /// Download a repository snapshot
    Download {
        /// Repository as user/name
        repo: String,

        /// Commit or branch to download (default branch when omitted)
        #[arg(long)]
        git_ref: Option<String>,

        /// Destination directory
        #[arg(short, long)]
        dest: PathBuf,
    },
}

/// Sort key argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// The engine's relevance ranking
    BestMatch,
    /// Star count
    Stars,
    /// Fork count
    Forks,
    /// Open help-wanted issue count
    HelpWantedIssues,
    /// Last update time
    Updated,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::BestMatch => SortKey::BestMatch,
            SortArg::Stars => SortKey::Stars,
            SortArg::Forks => SortKey::Forks,
            SortArg::HelpWantedIssues => SortKey::HelpWantedIssues,
            SortArg::Updated => SortKey::Updated,
        }
    }
}

/// Sort order argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}
