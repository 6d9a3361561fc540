//! The sync pipeline: mirror fallback per repository, then an in-place rewrite of the
//! downloaded archive.

pub mod download;
pub mod error;
pub mod sync;
pub mod template;

pub use error::{Result, SyncError};
pub use sync::{FailedRepo, SyncContext, SyncReport};
