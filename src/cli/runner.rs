//! Command execution

use super::commands::{Cli, Commands};
use crate::config::ClientConfig;
use crate::download::{DownloadOptions, RepoDownloader};
use crate::error::{Error, Result};
use crate::scheduler::Scheduler;
use crate::search::Search;
use crate::types::JsonValue;

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for the parsed CLI
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command
    pub async fn run(self) -> Result<()> {
        let scheduler = self.scheduler()?;
        let verbose = self.cli.verbose;

        match self.cli.command {
            Commands::Search {
                query,
                limit,
                sort,
                order,
                json,
            } => {
                let mut search = Search::new(query)
                    .limit(limit)
                    .sort(sort.into())
                    .order(order.into());
                if verbose {
                    search = search.on_status(|status| eprintln!("{status}"));
                }

                search
                    .run(&scheduler, move |item| {
                        print_item(&item, json);
                        true
                    })
                    .await
            }

            Commands::Download { repo, git_ref, dest } => {
                let (user, name) = repo
                    .split_once('/')
                    .ok_or_else(|| Error::config(format!("expected user/name, got '{repo}'")))?;

                let mut options = DownloadOptions::new(user, name, dest);
                if let Some(git_ref) = git_ref {
                    options = options.git_ref(git_ref);
                }

                let mut downloader = RepoDownloader::new(scheduler);
                if verbose {
                    downloader = downloader.on_status(|status| eprintln!("{status}"));
                }

                downloader.download(options).await
            }
        }
    }

    fn scheduler(&self) -> Result<Scheduler> {
        let mut config = ClientConfig::builder().base_url(&self.cli.base_url);
        if let Some(token) = &self.cli.token {
            config = config.header("authorization", format!("Bearer {token}"));
        }

        let mut builder = Scheduler::builder().config(config.build());
        if self.cli.verbose {
            builder = builder.on_status(|status| eprintln!("{status}"));
        }

        builder.build()
    }
}

fn print_item(item: &JsonValue, json: bool) {
    if json {
        println!("{item}");
        return;
    }

    match item.get("full_name").and_then(JsonValue::as_str) {
        Some(name) => println!("{name}"),
        None => println!("{item}"),
    }
}
