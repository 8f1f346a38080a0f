//! Theme-scoped event fan-out.
//!
//! Every accepted editing operation is announced to everyone editing the
//! same theme. Delivery is fire-and-forget: a session never fails because
//! nobody is listening.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 256;

/// Wire name of an editing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    BlockAdded,
    BlockRemoved,
    BlockMoved,
    BlockUpdated,
    BlockDuplicated,
    BlocksReordered,
    InlineEdit,
    Undone,
    Redone,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::BlockAdded => "blockAdded",
            EventName::BlockRemoved => "blockRemoved",
            EventName::BlockMoved => "blockMoved",
            EventName::BlockUpdated => "blockUpdated",
            EventName::BlockDuplicated => "blockDuplicated",
            EventName::BlocksReordered => "blocksReordered",
            EventName::InlineEdit => "inlineEdit",
            EventName::Undone => "undone",
            EventName::Redone => "redone",
        }
    }
}

/// One event as delivered to subscribers of a theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEvent {
    pub name: EventName,
    /// The user whose session produced the event.
    pub user_id: String,
    pub payload: Value,
}

/// Outbound side of the event fan-out. Implementations must not block and
/// must not fail the caller.
pub trait Broadcaster: Send + Sync {
    fn broadcast_to_theme(&self, theme_id: &str, event: ThemeEvent);
}

/// Per-theme broadcast channels. Subscribers receive every event published
/// for their theme after the moment they subscribed; slow subscribers that
/// lag more than the channel capacity lose the oldest events.
#[derive(Default)]
pub struct EventBus {
    channels: Mutex<HashMap<String, broadcast::Sender<ThemeEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a theme's events, creating its channel on first use.
    pub fn subscribe(&self, theme_id: &str) -> broadcast::Receiver<ThemeEvent> {
        let mut channels = self.channels.lock().expect("bus lock poisoned");
        channels
            .entry(theme_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop a theme's channel once editing has ended.
    pub fn close_theme(&self, theme_id: &str) {
        let mut channels = self.channels.lock().expect("bus lock poisoned");
        channels.remove(theme_id);
    }
}

impl Broadcaster for EventBus {
    fn broadcast_to_theme(&self, theme_id: &str, event: ThemeEvent) {
        let channels = self.channels.lock().expect("bus lock poisoned");
        if let Some(sender) = channels.get(theme_id) {
            // A send error only means no live receivers.
            let delivered = sender.send(event).unwrap_or(0);
            trace!(theme_id, delivered, "broadcast event");
        }
    }
}

/// Discards every event. For headless uses of the session manager.
#[derive(Default)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn broadcast_to_theme(&self, _theme_id: &str, _event: ThemeEvent) {}
}

/// Records every event for assertions. Test double.
#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(String, ThemeEvent)>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, ThemeEvent)> {
        self.events.lock().expect("recorder lock poisoned").clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .map(|(_, event)| event.name.as_str())
            .collect()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast_to_theme(&self, theme_id: &str, event: ThemeEvent) {
        self.events
            .lock()
            .expect("recorder lock poisoned")
            .push((theme_id.to_string(), event));
    }
}
