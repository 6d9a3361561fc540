mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(repo: &str) -> SyncEvent {
        SyncEvent::Downloading {
            repo: repo.to_string(),
        }
    }

    #[test]
    fn test_null_sink() {
        NullSink.emit(downloading("core"));
    }

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(downloading("core"));
        sink.emit(SyncEvent::DownloadProgress {
            repo: "core".into(),
            filename: "core.files".into(),
            current: 512,
            total: 1024,
        });
        sink.emit(SyncEvent::Downloaded {
            repo: "core".into(),
            url: "https://mirror.example/core/os/x86_64/core.files".into(),
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], downloading("core"));
        assert!(matches!(
            &events[1],
            SyncEvent::DownloadProgress {
                current: 512,
                total: 1024,
                ..
            }
        ));
        assert!(matches!(&events[2], SyncEvent::Downloaded { .. }));
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(downloading("orphaned"));
    }

    #[test]
    fn test_collector_sink() {
        let sink = CollectorSink::default();
        assert!(sink.is_empty());

        sink.emit(downloading("core"));
        sink.emit(downloading("extra"));
        sink.emit(SyncEvent::MirrorFailed {
            repo: "extra".into(),
            url: "https://bad.example/extra/os/x86_64/extra.files".into(),
            error: "HTTP 404".into(),
        });
        sink.emit(SyncEvent::Failed {
            repo: "extra".into(),
            error: "no mirror succeeded".into(),
        });

        assert_eq!(sink.len(), 4);
        let extra = sink.events_for("extra");
        assert_eq!(extra.len(), 3);
        assert!(extra[2].is_terminal());
        assert!(!sink.events()[0].is_terminal());
    }

    #[test]
    fn test_event_repo() {
        let events = [
            downloading("a"),
            SyncEvent::Transcoding {
                repo: "a".into(),
            },
            SyncEvent::Synced {
                repo: "a".into(),
                entries: 10,
            },
        ];
        assert!(events.iter().all(|e| e.repo() == "a"));
    }

    #[test]
    fn test_event_sink_handle() {
        let collector = Arc::new(CollectorSink::default());
        let sink: EventSinkHandle = collector.clone();
        sink.emit(SyncEvent::Synced {
            repo: "core".into(),
            entries: 42,
        });
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullSink>();
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }
}
