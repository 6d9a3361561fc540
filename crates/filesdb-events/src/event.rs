/// Progress of a repository sync, in the order the stages happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Mirror fallback for a repository is starting.
    Downloading { repo: String },
    /// Bytes received for the file currently being fetched.
    DownloadProgress {
        repo: String,
        filename: String,
        current: u64,
        /// `0` when the mirror did not announce a size.
        total: u64,
    },
    /// One mirror failed; the next one will be tried.
    MirrorFailed {
        repo: String,
        url: String,
        error: String,
    },
    /// The archive was stored in the cache.
    Downloaded { repo: String, url: String },
    /// The cached archive is being rewritten uncompressed.
    Transcoding { repo: String },
    /// Both stages finished.
    Synced { repo: String, entries: usize },
    /// The repository could not be synced. Other repositories are unaffected.
    Failed { repo: String, error: String },
}

impl SyncEvent {
    /// Repository the event belongs to.
    pub fn repo(&self) -> &str {
        match self {
            Self::Downloading { repo }
            | Self::DownloadProgress { repo, .. }
            | Self::MirrorFailed { repo, .. }
            | Self::Downloaded { repo, .. }
            | Self::Transcoding { repo }
            | Self::Synced { repo, .. }
            | Self::Failed { repo, .. } => repo,
        }
    }

    /// Whether no further events follow for this repository.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Synced { .. } | Self::Failed { .. })
    }
}
