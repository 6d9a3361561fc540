//! Fetching of repository metadata files from mirrors.
//!
//! [`fetch::Fetcher`] downloads a single URL into a registered cache directory,
//! reporting progress through an optional callback. Callers that need to swap the
//! network out (tests, dry runs) program against the [`fetch::Fetch`] trait.

pub mod error;
pub mod fetch;
pub mod http;
pub mod http_client;

pub use error::DownloadError;
pub use fetch::{Fetch, Fetcher, Progress, ProgressCallback};
