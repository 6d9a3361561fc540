use std::path::{Path, PathBuf};

use filesdb_config::Repository;
use filesdb_dl::Fetch;
use filesdb_events::{EventSinkHandle, SyncEvent};
use filesdb_utils::fs::safe_remove;
use tracing::{debug, warn};

use crate::{
    error::{Result, SyncError},
    template::{expand_url, FILES_SUFFIX},
};

/// Fetches a repository's file list, falling back through its mirrors.
///
/// Servers are tried once each, in configuration order, and the first success wins.
/// Any cached copy is removed before every attempt, so after a complete failure the
/// cache holds no file for the repository.
pub struct Downloader<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    cache_dir: &'a Path,
    arch: &'a str,
    events: &'a EventSinkHandle,
}

impl<'a, F: Fetch + ?Sized> Downloader<'a, F> {
    pub fn new(
        fetcher: &'a F,
        cache_dir: &'a Path,
        arch: &'a str,
        events: &'a EventSinkHandle,
    ) -> Self {
        Self {
            fetcher,
            cache_dir,
            arch,
            events,
        }
    }

    /// Downloads `<repo>.files` into the cache directory and returns its path.
    ///
    /// The stored name never depends on the mirror URL.
    pub fn download(&self, repo: &Repository) -> Result<PathBuf> {
        self.events.emit(SyncEvent::Downloading {
            repo: repo.name.clone(),
        });

        if repo.servers.is_empty() {
            return Err(SyncError::NoServers {
                repo: repo.name.clone(),
            });
        }

        let filename = repo.files_name();
        let cached = self.cache_dir.join(&filename);

        for server in &repo.servers {
            let url = expand_url(server, &repo.name, self.arch, FILES_SUFFIX);

            if let Err(err) = safe_remove(&cached) {
                warn!("{}", err);
            }

            debug!("trying {}", url);
            match self.fetcher.fetch(&url, &filename) {
                Ok(path) => {
                    self.events.emit(SyncEvent::Downloaded {
                        repo: repo.name.clone(),
                        url,
                    });
                    return Ok(path);
                }
                Err(err) => {
                    warn!("failed to download: {}", url);
                    debug!("{}: {}", url, err);
                    self.events.emit(SyncEvent::MirrorFailed {
                        repo: repo.name.clone(),
                        url,
                        error: err.to_string(),
                    });
                }
            }
        }

        Err(SyncError::AllMirrorsFailed {
            repo: repo.name.clone(),
            attempts: repo.servers.len(),
        })
    }
}
