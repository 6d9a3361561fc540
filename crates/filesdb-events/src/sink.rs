use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::SyncEvent;

/// Consumer of sync events. Frontends implement this to render progress.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Forwards events over an mpsc channel, e.g. to a rendering thread.
///
/// Events sent after the receiver is gone are dropped.
pub struct ChannelSink {
    sender: Sender<SyncEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<SyncEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}

/// Discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SyncEvent) {}
}

/// Keeps every event in memory for later inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events belonging to `repo`, in emission order.
    pub fn events_for(&self, repo: &str) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.repo() == repo)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().unwrap().push(event);
    }
}
