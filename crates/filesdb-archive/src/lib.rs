//! Archive handling for cached repository metadata.
//!
//! Downloaded metadata archives are tar streams behind an arbitrary compression
//! layer. [`transcode::transcode_in_place`] rewrites such a file as a plain,
//! uncompressed tar stream with the same members in the same order, replacing the
//! original only once the new copy is complete.

pub mod compression;
pub mod error;
pub mod reader;
pub mod transcode;

pub use compression::Compression;
pub use error::{ArchiveError, Result};
pub use reader::ArchiveReader;
pub use transcode::{transcode_in_place, TranscodeReport};
