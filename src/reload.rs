//! Live-reload event bus.
//!
//! One [`ReloadBus`] is created per develop session and handed to the task
//! runner, the watchers and the dev server. Publishing never blocks and
//! never fails: with no connected browser the event is simply dropped.

use tokio::sync::broadcast;

/// What connected browsers should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// Stylesheets changed; swap them without a page reload.
    Styles,
    /// Reload the page.
    Full,
}

impl ReloadEvent {
    /// SSE event name understood by the injected client script.
    pub fn event_name(self) -> &'static str {
        match self {
            ReloadEvent::Styles => "css",
            ReloadEvent::Full => "reload",
        }
    }
}

/// Broadcast fan-out of [`ReloadEvent`]s to every live-reload client.
#[derive(Debug, Clone)]
pub struct ReloadBus {
    tx: broadcast::Sender<ReloadEvent>,
}

impl ReloadBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send `event` to all subscribers. Returns how many received it.
    pub fn publish(&self, event: ReloadEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ReloadBus {
    fn default() -> Self {
        Self::new(64)
    }
}
