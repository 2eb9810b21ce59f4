//! Repository snapshot download
//!
//! Fetches a repository tarball through the scheduler (so downloads share
//! the same rate-limit queue as searches), unpacks it with the system `tar`,
//! and copies the tree into a destination directory. The scheduler itself
//! stays ignorant of archive formats and filesystem layout.

use crate::error::{Error, Result};
use crate::retry::Retry;
use crate::scheduler::{ApiRequest, Scheduler};
use crate::types::StatusSink;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use walkdir::WalkDir;

type FilterFn = Box<dyn FnMut(&str) -> bool + Send>;
type MapFn = Box<dyn FnMut(&str) -> String + Send>;

/// What to download and where to put it
pub struct DownloadOptions {
    /// The user that owns the repository
    pub user: String,
    /// The repository name without the user part
    pub name: String,
    /// A commit or branch to download; the default branch when `None`
    pub git_ref: Option<String>,
    /// The directory to download the tree into
    pub dest: PathBuf,
    filter: Option<FilterFn>,
    map: Option<MapFn>,
}

impl DownloadOptions {
    /// Download `user/name` into `dest`
    pub fn new(user: impl Into<String>, name: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            git_ref: None,
            dest: dest.into(),
            filter: None,
            map: None,
        }
    }

    /// Download a specific commit or branch
    #[must_use]
    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Called for every file path before it is written; returning `false`
    /// skips the file
    #[must_use]
    pub fn filter(mut self, filter: impl FnMut(&str) -> bool + Send + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Called for every file path before it is written; the return value
    /// becomes the path the file is written to
    #[must_use]
    pub fn map(mut self, map: impl FnMut(&str) -> String + Send + 'static) -> Self {
        self.map = Some(Box::new(map));
        self
    }
}

/// Downloads repository snapshots through a shared [`Scheduler`]
pub struct RepoDownloader {
    scheduler: Scheduler,
    retry: Retry,
    status: StatusSink,
}

impl RepoDownloader {
    /// Create a downloader on top of the given scheduler
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            retry: Retry::default(),
            status: StatusSink::silent(),
        }
    }

    /// Retry policy for the tarball fetch
    #[must_use]
    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Status observer for this downloader
    #[must_use]
    pub fn on_status(mut self, observer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.status = StatusSink::new(observer);
        self
    }

    /// Download a repository into `options.dest`.
    ///
    /// Files can be dropped with `options.filter` and renamed with
    /// `options.map`; paths handed to both are relative to the repository
    /// root, with the wrapper directory the remote puts in tarballs already
    /// stripped.
    pub async fn download(&self, mut options: DownloadOptions) -> Result<()> {
        let full_name = format!("{}/{}", options.user, options.name);

        let mut url = self
            .scheduler
            .config()
            .endpoint(&format!("/repos/{full_name}/tarball"));
        if let Some(git_ref) = &options.git_ref {
            url.push('/');
            url.push_str(git_ref);
        }

        self.status.emit(&format!("Getting tarball for {full_name}"));
        let url = url.as_str();
        let response = self
            .retry
            .run(&self.status, "Tarball fetch", || async move {
                let response = self.scheduler.submit(ApiRequest::get(url)?).await?;
                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::http_status(status, body));
                }
                Ok(response)
            })
            .await?;

        self.status.emit(&format!("Download {full_name}"));
        let archive = tempfile::NamedTempFile::new()?;
        let mut file = tokio::fs::File::create(archive.path()).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        self.status.emit(&format!("Unpack {full_name}"));
        let unpacked = tempfile::tempdir()?;
        let output = Command::new("tar")
            .arg("-xf")
            .arg(archive.path())
            .arg("-C")
            .arg(unpacked.path())
            .output()
            .await?;
        if !output.status.success() {
            return Err(Error::archive(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        self.status
            .emit(&format!("Write {full_name} to {}", options.dest.display()));
        copy_tree(
            unpacked.path(),
            &options.dest,
            &mut options.filter,
            &mut options.map,
        )
        .await?;

        Ok(())
    }
}

/// Copy the unpacked tree into `dest`, stripping the single wrapper
/// directory the remote wraps tarballs in.
async fn copy_tree(
    unpacked: &Path,
    dest: &Path,
    filter: &mut Option<FilterFn>,
    map: &mut Option<MapFn>,
) -> Result<()> {
    for entry in WalkDir::new(unpacked) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(inner) = entry.path().strip_prefix(unpacked) else {
            continue;
        };

        // Drop the "<user>-<repo>-<sha>" wrapper component
        let mut components = inner.components();
        components.next();
        let local = components.as_path();
        if local.as_os_str().is_empty() {
            continue;
        }
        let local = local.to_string_lossy().into_owned();

        if let Some(filter) = filter.as_mut() {
            if !filter(&local) {
                continue;
            }
        }

        let target_rel = match map.as_mut() {
            Some(map) => map(&local),
            None => local,
        };
        let target = dest.join(target_rel);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(entry.path(), &target).await?;
    }

    Ok(())
}
