use filesdb_archive::ArchiveError;
use filesdb_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    #[error("Cache directory is not usable: {0}")]
    #[diagnostic(
        code(filesdb_operations::cache_access),
        help("Run with sufficient privileges or point cache_path / $FILESDB_CACHE elsewhere")
    )]
    CacheAccess(#[source] FileSystemError),

    #[error("Repository {repo} has no servers")]
    #[diagnostic(
        code(filesdb_operations::no_servers),
        help("Add a Server= line or an Include= directive to the [{repo}] section")
    )]
    NoServers { repo: String },

    #[error("Failed to download {repo}.files from any of {attempts} mirror(s)")]
    #[diagnostic(code(filesdb_operations::all_mirrors_failed))]
    AllMirrorsFailed { repo: String, attempts: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
