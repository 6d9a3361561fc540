use filesdb_config::{config::Config, parse_file, Repository};
use filesdb_operations::template::{expand_url, FILES_SUFFIX};
use nu_ansi_term::Color::{Cyan, Yellow};
use tracing::info;

use crate::{error::CliResult, utils::Colored};

/// Replaces every server template with the URL it downloads from.
fn expand_servers(repos: Vec<Repository>, arch: &str) -> Vec<Repository> {
    repos
        .into_iter()
        .map(|mut repo| {
            repo.servers = repo
                .servers
                .iter()
                .map(|server| expand_url(server, &repo.name, arch, FILES_SUFFIX))
                .collect();
            repo
        })
        .collect()
}

pub fn list_repositories(config: &Config, expand: bool, json: bool) -> CliResult<()> {
    let mut repos = parse_file(config.get_mirror_config_path()?)?;
    if expand {
        repos = expand_servers(repos, &config.architecture());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
        return Ok(());
    }

    for repo in &repos {
        if repo.servers.is_empty() {
            info!("{} {}", Colored(Cyan, &repo.name), Colored(Yellow, "(no servers)"));
            continue;
        }
        info!("{}", Colored(Cyan, &repo.name));
        for server in &repo.servers {
            info!("  {server}");
        }
    }

    Ok(())
}
