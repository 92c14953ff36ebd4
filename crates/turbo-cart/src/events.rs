//! Cart notifications.
//!
//! Every mutation announces itself through an [`EventSink`]. Delivery is
//! fire-and-forget: sinks cannot fail an operation.

use crate::cart::{CartItem, Condition};
use crate::ids::RowId;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Something that happened to a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    /// An item was added or merged into an existing line.
    Added { instance: String, item: CartItem },
    /// An item changed.
    Updated { instance: String, item: CartItem },
    /// An item left the cart.
    Removed { instance: String, row_id: RowId },
    /// The instance state was written to the state store.
    Saved { instance: String },
    /// The instance was emptied.
    Destroyed { instance: String },
    ConditionAdded { instance: String, condition: Condition },
    ConditionRemoved { instance: String, name: String },
    ConditionsCleared { instance: String },
    /// The instance was parked in the record store.
    Stored { instance: String, identifier: String },
    /// A parked cart was restored.
    Restored { instance: String, identifier: String },
    /// A parked cart was deleted.
    Erased { identifier: String },
    /// A parked cart was merged into the active instance.
    Merged { instance: String, identifier: String },
}

impl CartEvent {
    /// Notification name, e.g. `"cart.added"`.
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::Added { .. } => "cart.added",
            CartEvent::Updated { .. } => "cart.updated",
            CartEvent::Removed { .. } => "cart.removed",
            CartEvent::Saved { .. } => "cart.saved",
            CartEvent::Destroyed { .. } => "cart.destroyed",
            CartEvent::ConditionAdded { .. } => "cart.condition_added",
            CartEvent::ConditionRemoved { .. } => "cart.condition_removed",
            CartEvent::ConditionsCleared { .. } => "cart.conditions_cleared",
            CartEvent::Stored { .. } => "cart.stored",
            CartEvent::Restored { .. } => "cart.restored",
            CartEvent::Erased { .. } => "cart.erased",
            CartEvent::Merged { .. } => "cart.merged",
        }
    }

    /// Event payload as JSON.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Receives cart notifications.
pub trait EventSink {
    fn notify(&self, event: &CartEvent);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &CartEvent) {}
}

/// Logs every notification at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &CartEvent) {
        tracing::debug!(event = event.name(), payload = %event.payload(), "cart event");
    }
}

/// Keeps notifications in memory for inspection. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<CartEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<CartEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Recorded event names, oldest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map(|e| e.iter().map(CartEvent::name).collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &CartEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = CartEvent::Removed {
            instance: "default".into(),
            row_id: RowId::new("r1"),
        };
        assert_eq!(event.name(), "cart.removed");
        assert_eq!(
            CartEvent::ConditionsCleared { instance: "x".into() }.name(),
            "cart.conditions_cleared"
        );
    }

    #[test]
    fn test_payload_shape() {
        let event = CartEvent::Stored {
            instance: "default".into(),
            identifier: "user-1".into(),
        };
        let payload = event.payload();
        assert_eq!(payload["event"], "stored");
        assert_eq!(payload["identifier"], "user-1");
    }

    #[test]
    fn test_recording_sink_shares_log() {
        let sink = RecordingSink::new();
        let handle = sink.clone();
        sink.notify(&CartEvent::Saved { instance: "default".into() });
        sink.notify(&CartEvent::Destroyed { instance: "default".into() });

        assert_eq!(handle.names(), vec!["cart.saved", "cart.destroyed"]);
        handle.clear();
        assert!(sink.events().is_empty());
    }
}
