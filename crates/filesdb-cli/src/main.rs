use std::time::Duration;

use clap::Parser;
use cli::{Args, Commands};
use error::{CliError, CliResult};
use filesdb_config::{config::Config, error::ConfigError};
use filesdb_dl::http_client::configure_http_client;
use filesdb_utils::path::resolve_path;
use logging::setup_logging;
use repos::list_repositories;
use sync::sync_repositories;
use tracing::debug;
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};
use utils::{COLOR, PROGRESS};

mod cli;
mod error;
mod logging;
mod progress;
mod repos;
mod sync;
mod utils;

/// Loads the config file and applies the command line overrides on top.
fn load_config(args: &Args) -> CliResult<Config> {
    let path = args
        .config
        .as_deref()
        .map(resolve_path)
        .transpose()
        .map_err(ConfigError::from)?;

    let mut config = Config::load(path.as_deref())?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ref mirror_config) = args.mirror_config {
        config.mirror_config = mirror_config.clone();
    }
    if let Some(ref cache_path) = args.cache_path {
        config.cache_path = cache_path.clone();
    }
    if let Some(ref arch) = args.arch {
        config.architecture = arch.clone();
    }
    if args.proxy.is_some() {
        config.proxy = args.proxy.clone();
    }
    if args.user_agent.is_some() {
        config.user_agent = args.user_agent.clone();
    }
    if args.timeout.is_some() {
        config.timeout = args.timeout;
    }
}

fn parse_headers(raw: &[String]) -> CliResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for header in raw {
        let invalid = || CliError::InvalidHeader(header.clone());
        let (key, value) = header.split_once(':').ok_or_else(invalid)?;
        let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn configure_http(config: &Config, raw_headers: Option<&[String]>) -> CliResult<()> {
    let proxy = config
        .proxy
        .as_deref()
        .map(|proxy| {
            Proxy::new(proxy).map_err(|source| {
                CliError::InvalidProxy {
                    proxy: proxy.to_string(),
                    source,
                }
            })
        })
        .transpose()?;
    let headers = raw_headers.map(parse_headers).transpose()?;
    let user_agent = config.user_agent.clone();
    let timeout = config.timeout.map(Duration::from_secs);

    configure_http_client(|cfg| {
        if proxy.is_some() {
            cfg.proxy = proxy;
        }
        if user_agent.is_some() {
            cfg.user_agent = user_agent;
        }
        if headers.is_some() {
            cfg.headers = headers;
        }
        if timeout.is_some() {
            cfg.timeout = timeout;
        }
    });

    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    if args.no_progress {
        let mut progress = PROGRESS.write().unwrap();
        *progress = false;
    }

    let config = load_config(&args)?;
    debug!("mirror config: {}", config.mirror_config);

    match args.command {
        Commands::Config => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_toml()?);
            }
        }
        Commands::Repos {
            expand,
        } => list_repositories(&config, expand, args.json)?,
        Commands::Sync {
            repos,
        } => {
            configure_http(&config, args.header.as_deref())?;
            sync_repositories(&config, &repos, args.json)?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        progress::stop();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&["Accept: */*".into(), "X-Mirror-Token:abc".into()]).unwrap();
        assert_eq!(headers.get("accept").unwrap(), "*/*");
        assert_eq!(headers.get("x-mirror-token").unwrap(), "abc");
    }

    #[test]
    fn test_parse_headers_invalid() {
        assert!(matches!(
            parse_headers(&["no-colon".into()]),
            Err(CliError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_headers(&["bad name: x".into()]),
            Err(CliError::InvalidHeader(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_config_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cache_path = \"/srv/files\"\narchitecture = \"i686\"\n").unwrap();

        let args = Args::parse_from([
            "filesdb",
            "-c",
            path.to_str().unwrap(),
            "--arch",
            "aarch64",
            "--mirror-config",
            "/tmp/pacman.conf",
            "--timeout",
            "15",
            "config",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.cache_path, "/srv/files");
        assert_eq!(config.architecture(), "aarch64");
        assert_eq!(config.mirror_config, "/tmp/pacman.conf");
        assert_eq!(config.timeout, Some(15));
    }

    #[test]
    fn test_invalid_proxy() {
        let config = Config {
            proxy: Some("not a proxy".into()),
            ..Config::default()
        };
        assert!(matches!(
            configure_http(&config, None),
            Err(CliError::InvalidProxy { .. })
        ));
    }
}
