use std::{
    collections::HashMap,
    sync::{mpsc::Receiver, Arc, LazyLock},
    thread::JoinHandle,
    time::Duration,
};

use filesdb_events::SyncEvent;
use filesdb_utils::bytes::{format_bytes, percentage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::{Cyan, Green, Red};

use crate::utils::Colored;

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background thread started by [`spawn_event_handler`].
///
/// The thread exits once every sender of the event channel is gone, so the
/// `SyncContext` holding the sink must be dropped before [`ProgressGuard::finish`].
pub struct ProgressGuard {
    handle: Option<JoinHandle<()>>,
}

impl ProgressGuard {
    /// Waits for the remaining events to be rendered.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
        stop();
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template("  {prefix:<40} {wide_bar:.cyan/dim} {msg}")
        .unwrap()
        .progress_chars("━━─")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap()
}

/// Transferred size and, when the total is known, the completed share.
fn transfer_message(current: u64, total: u64) -> String {
    let size = format_bytes(current, 2);
    match percentage(current, total) {
        Some(pct) => format!("{size:>11} [{pct:6.2}%]"),
        None => format!("{size:>11}"),
    }
}

fn download_job(filename: &str) -> ProgressBar {
    let pb = MULTI.add(ProgressBar::new(0));
    pb.set_style(download_style());
    pb.set_prefix(filename.to_string());
    pb
}

fn spinner_job(msg: String) -> ProgressBar {
    let pb = MULTI.add(ProgressBar::new_spinner());
    pb.set_style(spinner_style());
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// The one-off line printed in place of a progress bar when output is not interactive.
fn static_line(event: &SyncEvent, interactive: bool) -> Option<String> {
    match event {
        SyncEvent::Downloading {
            repo,
        } if !interactive => Some(format!("downloading {repo}.files...")),
        _ => None,
    }
}

fn clear(jobs: &mut HashMap<String, ProgressBar>, repo: &str) {
    if let Some(pb) = jobs.remove(repo) {
        pb.finish_and_clear();
    }
}

/// Spawns a thread rendering [`SyncEvent`]s.
///
/// With `interactive` set, downloads get a live bar per repository. Otherwise each
/// repository gets a single `downloading <repo>.files...` line.
pub fn spawn_event_handler(receiver: Receiver<SyncEvent>, interactive: bool) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let mut jobs: HashMap<String, ProgressBar> = HashMap::new();

        while let Ok(event) = receiver.recv() {
            if let Some(line) = static_line(&event, interactive) {
                suspend(|| println!("{line}"));
            }

            match event {
                SyncEvent::Downloading {
                    ..
                } => {}
                SyncEvent::DownloadProgress {
                    repo,
                    filename,
                    current,
                    total,
                } => {
                    let pb = jobs.entry(repo).or_insert_with(|| download_job(&filename));
                    if total > 0 {
                        pb.set_length(total);
                    }
                    pb.set_position(current);
                    pb.set_message(transfer_message(current, total));
                }
                SyncEvent::MirrorFailed {
                    repo, ..
                }
                | SyncEvent::Downloaded {
                    repo, ..
                } => clear(&mut jobs, &repo),
                SyncEvent::Transcoding {
                    repo,
                } => {
                    if interactive {
                        let pb = spinner_job(format!("{repo}: unpacking"));
                        jobs.insert(repo, pb);
                    }
                }
                SyncEvent::Synced {
                    repo,
                    entries,
                } => {
                    clear(&mut jobs, &repo);
                    suspend(|| {
                        eprintln!(
                            " {} {}: synced ({entries} entries)",
                            Colored(Green, "✓"),
                            Colored(Cyan, &repo)
                        );
                    });
                }
                SyncEvent::Failed {
                    repo, ..
                } => {
                    clear(&mut jobs, &repo);
                    suspend(|| {
                        eprintln!(" {} {}: failed", Colored(Red, "✗"), Colored(Cyan, &repo));
                    });
                }
            }
        }

        for (_, pb) in jobs.drain() {
            pb.finish_and_clear();
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use filesdb_events::{ChannelSink, EventSink};

    use super::*;

    #[test]
    fn test_transfer_message() {
        assert_eq!(transfer_message(0, 0), "     0.00 B");
        assert_eq!(transfer_message(512, 1024), "   512.00 B [ 50.00%]");
        assert_eq!(transfer_message(1024, 1024), "   1.00 KiB [100.00%]");
    }

    #[test]
    fn test_static_line() {
        let downloading = SyncEvent::Downloading {
            repo: "core".into(),
        };
        assert_eq!(
            static_line(&downloading, false).as_deref(),
            Some("downloading core.files...")
        );
        assert_eq!(static_line(&downloading, true), None);

        let progress = SyncEvent::DownloadProgress {
            repo: "core".into(),
            filename: "core.files".into(),
            current: 10,
            total: 20,
        };
        assert_eq!(static_line(&progress, false), None);
    }

    #[test]
    fn test_handler_drains_and_exits() {
        let (sink, rx) = ChannelSink::new();
        let guard = spawn_event_handler(rx, false);

        sink.emit(SyncEvent::Downloading {
            repo: "core".into(),
        });
        sink.emit(SyncEvent::Failed {
            repo: "core".into(),
            error: "no mirror".into(),
        });
        drop(sink);

        guard.finish();
    }
}
