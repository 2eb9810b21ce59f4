//! # repo-courier
//!
//! A rate-limit-aware client layer for the GitHub REST API: a single-flight
//! request scheduler, a cursor-paginated repository search, and a tarball
//! downloader that shares the scheduler's queue.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use repo_courier::{ClientConfig, Scheduler, Search, SortKey};
//!
//! #[tokio::main]
//! async fn main() -> repo_courier::Result<()> {
//!     let scheduler = Scheduler::new(ClientConfig::default())?;
//!
//!     Search::new("language:rust stars:>500")
//!         .limit(100)
//!         .sort(SortKey::Stars)
//!         .run(&scheduler, |repo| {
//!             println!("{}", repo["full_name"]);
//!             true
//!         })
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐
//! │    Search     │   │ RepoDownloader │     callers
//! └───────┬───────┘   └───────┬────────┘
//!         │  retry wrapper    │
//! ┌───────┴───────────────────┴────────┐
//! │             Scheduler              │     one request in flight,
//! │  FIFO queue · rate-limit deadline  │     rate-limit bookkeeping
//! └────────────────┬───────────────────┘
//!                  │
//!             remote API
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and the status observer
pub mod types;

/// Client configuration
pub mod config;

/// Retry wrapper around submissions
pub mod retry;

/// Rate-governed request scheduler
pub mod scheduler;

/// Cursor-linked pagination
pub mod pagination;

/// Paginated repository search
pub mod search;

/// Repository snapshot download
pub mod download;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ClientConfig;
pub use download::{DownloadOptions, RepoDownloader};
pub use error::{Error, Result};
pub use pagination::Page;
pub use retry::Retry;
pub use scheduler::{ApiRequest, RateLimitPolicy, Scheduler, ThrottleConfig};
pub use search::{Search, DEFAULT_LIMIT};
pub use types::{JsonValue, SortKey, SortOrder, StatusSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
