use std::{
    env, fs,
    path::{Path, PathBuf},
};

use filesdb_utils::{
    path::{resolve_path, xdg_config_home},
    system::machine,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

pub const DEFAULT_MIRROR_CONFIG: &str = "/etc/pacman.conf";
pub const DEFAULT_CACHE_PATH: &str = "/var/cache/filesdb";

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path to the pacman-style mirror configuration.
    /// Default: /etc/pacman.conf
    pub mirror_config: String,

    /// Directory holding one `<repo>.files` archive per repository.
    /// Default: /var/cache/filesdb, overridden by $FILESDB_CACHE
    pub cache_path: String,

    /// Architecture substituted for `$arch`; `auto` uses the host machine type.
    /// Default: auto
    pub architecture: String,

    /// User agent sent with every request.
    pub user_agent: Option<String>,

    /// Proxy URL for all requests.
    pub proxy: Option<String>,

    /// Global per-request timeout in seconds.
    pub timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_config: DEFAULT_MIRROR_CONFIG.into(),
            cache_path: DEFAULT_CACHE_PATH.into(),
            architecture: "auto".into(),
            user_agent: None,
            proxy: None,
            timeout: None,
        }
    }
}

/// Location of the configuration file: `$FILESDB_CONFIG` or
/// `$XDG_CONFIG_HOME/filesdb/config.toml`.
pub fn default_config_path() -> PathBuf {
    match env::var("FILESDB_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("filesdb").join("config.toml"),
    }
}

impl Config {
    /// Loads the configuration from `path`, or from [`default_config_path`] when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_config_path);

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("loading config from {}", path.display());
                Ok(toml::from_str(&content)?)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => {
                Err(ConfigError::Read {
                    path,
                    source,
                })
            }
        }
    }

    pub fn get_mirror_config_path(&self) -> Result<PathBuf> {
        Ok(resolve_path(&self.mirror_config)?)
    }

    pub fn get_cache_path(&self) -> Result<PathBuf> {
        match env::var("FILESDB_CACHE") {
            Ok(path) if !path.trim().is_empty() => Ok(resolve_path(&path)?),
            _ => Ok(resolve_path(&self.cache_path)?),
        }
    }

    /// Architecture substituted for `$arch` in server templates.
    pub fn architecture(&self) -> String {
        match self.architecture.trim() {
            "" | "auto" => machine().to_string(),
            arch => arch.to_string(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mirror_config, "/etc/pacman.conf");
        assert_eq!(config.cache_path, "/var/cache/filesdb");
        assert_eq!(config.architecture, "auto");
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "cache_path = \"/tmp/files-cache\"\narchitecture = \"aarch64\"\ntimeout = 30\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.cache_path, "/tmp/files-cache");
        assert_eq!(config.mirror_config, DEFAULT_MIRROR_CONFIG);
        assert_eq!(config.architecture(), "aarch64");
        assert_eq!(config.timeout, Some(30));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cache_path = [").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_auto_architecture() {
        let config = Config::default();
        assert_eq!(config.architecture(), machine());
    }

    #[test]
    #[serial]
    fn test_cache_path_env_override() {
        with_env(vec![("FILESDB_CACHE", "/tmp/override-cache")], || {
            let config = Config::default();
            assert_eq!(
                config.get_cache_path().unwrap(),
                PathBuf::from("/tmp/override-cache")
            );
        });
    }

    #[test]
    #[serial]
    fn test_default_config_path_env() {
        with_env(vec![("FILESDB_CONFIG", "/tmp/filesdb.toml")], || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/filesdb.toml"));
        });
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let config = Config {
            proxy: Some("http://127.0.0.1:3128".into()),
            ..Config::default()
        };
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
