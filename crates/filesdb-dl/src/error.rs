use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(filesdb_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(filesdb_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(filesdb_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error("Failed to write {}: {source}", path.display())]
    #[diagnostic(code(filesdb_dl::write), help("Check free space in the cache directory"))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(filesdb_dl::io))]
    Io(#[from] std::io::Error),

    #[error("Not a local file path: {0}")]
    #[diagnostic(code(filesdb_dl::local_path))]
    LocalPath(String),

    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(filesdb_dl::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_invalid_url() {
        let err = DownloadError::InvalidUrl {
            url: "invalid".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        assert_eq!(err.to_string(), "Invalid URL: invalid");
    }

    #[test]
    fn test_download_error_http_error() {
        let err = DownloadError::HttpError {
            status: 404,
            url: "https://example.com/core.files".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: https://example.com/core.files");
    }

    #[test]
    fn test_download_error_local_path() {
        let err = DownloadError::LocalPath("file://mirror.example/core.files".into());
        assert_eq!(
            err.to_string(),
            "Not a local file path: file://mirror.example/core.files"
        );
    }

    #[test]
    fn test_from_ureq_error() {
        let download_err: DownloadError = ureq::Error::ConnectionFailed.into();
        assert!(matches!(download_err, DownloadError::Network(_)));
    }

    #[test]
    fn test_error_source_chain() {
        let err = DownloadError::Write {
            path: PathBuf::from("/var/cache/filesdb/core.files.part"),
            source: std::io::Error::other("disk full"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
