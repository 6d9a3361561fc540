use filesdb_config::error::ConfigError;
use filesdb_operations::SyncError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),

    #[error("Invalid proxy {proxy}: {source}")]
    #[diagnostic(
        code(filesdb::invalid_proxy),
        help("Use a URL such as http://host:port or socks5://host:port")
    )]
    InvalidProxy {
        proxy: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Invalid header: {0}")]
    #[diagnostic(code(filesdb::invalid_header), help("Headers take the form `Name: value`"))]
    InvalidHeader(String),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(filesdb::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to sync: {}", .0.join(", "))]
    #[diagnostic(
        code(filesdb::sync_failed),
        help("See the warnings above for the mirrors that were tried")
    )]
    SyncFailed(Vec<String>),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
