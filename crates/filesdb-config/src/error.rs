use std::path::PathBuf;

use filesdb_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to open {}: {source}", path.display())]
    #[diagnostic(
        code(filesdb_config::config_access),
        help("Check that the mirror configuration exists and is readable")
    )]
    ConfigAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open include file {}: {reason}", path.display())]
    #[diagnostic(
        code(filesdb_config::include_access),
        help("The repository gains no servers from this include")
    )]
    IncludeAccess { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(filesdb_config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(filesdb_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(filesdb_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Unknown repository: {0}")]
    #[diagnostic(
        code(filesdb_config::unknown_repository),
        help("Run `filesdb repos` to list the repositories found in the mirror configuration")
    )]
    UnknownRepository(String),

    #[error(transparent)]
    #[diagnostic(code(filesdb_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
