use std::path::PathBuf;

use filesdb_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ArchiveError {
    #[error("Failed to open {} for reading: {source}", path.display())]
    #[diagnostic(code(filesdb_archive::open))]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    #[diagnostic(
        code(filesdb_archive::empty),
        help("The mirror served an empty file; try syncing again")
    )]
    Empty { path: PathBuf },

    #[error("Failed to read archive {}: {source}", path.display())]
    #[diagnostic(
        code(filesdb_archive::read),
        help("The downloaded archive may be corrupted or truncated")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive {}: {source}", path.display())]
    #[diagnostic(
        code(filesdb_archive::write),
        help("Check free space and permissions of the cache directory")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rotate {} into {}: {source}", from.display(), to.display())]
    #[diagnostic(
        code(filesdb_archive::rename),
        help("The rewritten copy was left next to the original")
    )]
    Rename {
        from: PathBuf,
        to: PathBuf,
        /// Members in the completed copy.
        entries: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(filesdb_archive::fs))]
    FileSystem(#[from] FileSystemError),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
