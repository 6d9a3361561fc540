use std::sync::Arc;

use filesdb_config::{config::Config, parse_file, repository::select_repositories};
use filesdb_events::{ChannelSink, EventSinkHandle, NullSink};
use filesdb_operations::SyncContext;
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    progress::spawn_event_handler,
    utils::interactive,
};

pub fn sync_repositories(config: &Config, names: &[String], json: bool) -> CliResult<()> {
    let mirror_config = config.get_mirror_config_path()?;
    let repos = select_repositories(parse_file(&mirror_config)?, names)?;
    let cache_dir = config.get_cache_path()?;
    let interactive = !json && interactive();

    debug!(
        "syncing {} repositories into {}",
        repos.len(),
        cache_dir.display()
    );

    let mut guard = None;
    let events: EventSinkHandle = if json {
        Arc::new(NullSink)
    } else {
        let (sink, receiver) = ChannelSink::new();
        guard = Some(spawn_event_handler(receiver, interactive));
        Arc::new(sink)
    };

    let ctx = SyncContext::new(cache_dir, config.architecture(), events).interactive(interactive);
    let result = ctx.sync(&repos);
    drop(ctx);
    if let Some(guard) = guard {
        guard.finish();
    }

    let report = result?;
    if report.is_success() {
        info!("{} repositories synced", report.synced.len());
        Ok(())
    } else {
        Err(CliError::SyncFailed(
            report.failed.into_iter().map(|f| f.name).collect(),
        ))
    }
}
