//! Configuration for filesdb.
//!
//! Two independent inputs live here:
//! - the application [`config::Config`] (TOML), describing where the cache lives and how
//!   the HTTP client behaves;
//! - the pacman-style mirror configuration, parsed by [`parser`] into an ordered list of
//!   [`repository::Repository`] values.

pub mod config;
pub mod error;
pub mod parser;
pub mod repository;

pub use parser::{parse_file, parse_reader, parse_str};
pub use repository::Repository;

#[cfg(test)]
pub mod test_utils;
