use serde::Serialize;

use crate::error::{ConfigError, Result};

/// A named remote package source with its candidate mirror servers.
///
/// `servers` holds URL templates in configuration order, which is also the order
/// in which they are tried during a sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Section name from the mirror configuration.
    pub name: String,

    /// Mirror URL templates, possibly containing `$repo` and `$arch`.
    pub servers: Vec<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            servers: Vec::new(),
        }
    }

    pub fn add_server(&mut self, server: impl Into<String>) {
        self.servers.push(server.into());
    }

    /// Name of the cached metadata file for this repository.
    pub fn files_name(&self) -> String {
        format!("{}.files", self.name)
    }
}

/// Keeps only the repositories named in `names`, in configuration order.
///
/// An empty `names` selects every repository.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownRepository`] for the first name with no matching
/// repository.
pub fn select_repositories(repos: Vec<Repository>, names: &[String]) -> Result<Vec<Repository>> {
    if names.is_empty() {
        return Ok(repos);
    }

    if let Some(missing) = names
        .iter()
        .find(|name| !repos.iter().any(|repo| &repo.name == *name))
    {
        return Err(ConfigError::UnknownRepository(missing.clone()));
    }

    Ok(repos
        .into_iter()
        .filter(|repo| names.contains(&repo.name))
        .collect())
}
