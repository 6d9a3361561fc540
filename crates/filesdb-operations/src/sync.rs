use std::path::{Path, PathBuf};

use filesdb_archive::{transcode_in_place, ArchiveError, TranscodeReport};
use filesdb_config::Repository;
use filesdb_dl::{Fetch, Fetcher, Progress};
use filesdb_events::{EventSinkHandle, SyncEvent};
use filesdb_utils::fs::ensure_writable_dir;
use tracing::{debug, error, info};

use crate::{
    download::Downloader,
    error::{Result, SyncError},
    template::FILES_SUFFIX,
};

/// A repository that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRepo {
    pub name: String,
    pub error: String,
}

/// Per-repository outcome of a sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Repositories downloaded and transcoded, in processing order.
    pub synced: Vec<String>,
    pub failed: Vec<FailedRepo>,
}

impl SyncReport {
    /// Whether every repository made it through both stages.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives the download-then-transcode pipeline over a list of repositories.
pub struct SyncContext {
    cache_dir: PathBuf,
    arch: String,
    events: EventSinkHandle,
    interactive: bool,
}

impl SyncContext {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        arch: impl Into<String>,
        events: EventSinkHandle,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            arch: arch.into(),
            events,
            interactive: false,
        }
    }

    /// Enables per-chunk download progress events.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Syncs `repos` over the network.
    ///
    /// Fails before any request is made if the cache directory is not writable. Every
    /// other failure is local to its repository and recorded in the report.
    pub fn sync(&self, repos: &[Repository]) -> Result<SyncReport> {
        self.check_cache()?;

        let fetcher = self.fetcher();
        let report = self.run(&fetcher, repos);
        drop(fetcher);

        Ok(report)
    }

    /// Same as [`SyncContext::sync`] with a caller-supplied fetcher.
    pub fn sync_with<F: Fetch + ?Sized>(
        &self,
        fetcher: &F,
        repos: &[Repository],
    ) -> Result<SyncReport> {
        self.check_cache()?;
        Ok(self.run(fetcher, repos))
    }

    fn check_cache(&self) -> Result<()> {
        ensure_writable_dir(&self.cache_dir).map_err(SyncError::CacheAccess)
    }

    fn fetcher(&self) -> Fetcher {
        let fetcher = Fetcher::new(&self.cache_dir);
        if !self.interactive {
            return fetcher;
        }

        let events = self.events.clone();
        fetcher.progress(move |progress: Progress<'_>| {
            let repo = progress
                .filename
                .strip_suffix(FILES_SUFFIX)
                .unwrap_or(progress.filename);
            events.emit(SyncEvent::DownloadProgress {
                repo: repo.to_string(),
                filename: progress.filename.to_string(),
                current: progress.current,
                total: progress.total,
            });
        })
    }

    fn run<F: Fetch + ?Sized>(&self, fetcher: &F, repos: &[Repository]) -> SyncReport {
        let downloader = Downloader::new(fetcher, &self.cache_dir, &self.arch, &self.events);
        let mut report = SyncReport::default();

        for repo in repos {
            match self.sync_repo(&downloader, repo) {
                Ok(entries) => {
                    debug!("{} synced with {} entries", repo.name, entries);
                    self.events.emit(SyncEvent::Synced {
                        repo: repo.name.clone(),
                        entries,
                    });
                    report.synced.push(repo.name.clone());
                }
                Err(err) => {
                    error!("failed to sync {}: {}", repo.name, err);
                    self.events.emit(SyncEvent::Failed {
                        repo: repo.name.clone(),
                        error: err.to_string(),
                    });
                    report.failed.push(FailedRepo {
                        name: repo.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            "{} of {} repositories synced",
            report.synced.len(),
            repos.len()
        );
        report
    }

    fn sync_repo<F: Fetch + ?Sized>(
        &self,
        downloader: &Downloader<'_, F>,
        repo: &Repository,
    ) -> Result<usize> {
        let path = downloader.download(repo)?;

        self.events.emit(SyncEvent::Transcoding {
            repo: repo.name.clone(),
        });
        transcoded_entries(transcode_in_place(&path))
    }
}

/// Entry count of a finished transcode.
///
/// A failed final rename is logged and does not fail the repository: the rewritten
/// copy is complete and the previous file is still in place.
fn transcoded_entries(result: filesdb_archive::Result<TranscodeReport>) -> Result<usize> {
    match result {
        Ok(report) => Ok(report.entries),
        Err(ArchiveError::Rename {
            from,
            to,
            entries,
            source,
        }) => {
            error!(
                "failed to rename {} to {}: {}",
                from.display(),
                to.display(),
                source
            );
            Ok(entries)
        }
        Err(err) => Err(err.into()),
    }
}
