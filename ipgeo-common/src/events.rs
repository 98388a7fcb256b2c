//! Batch event types and the broadcast event bus
//!
//! The resolver emits [`BatchEvent`]s while a batch runs; the presentation
//! layer subscribes and owns all display state, consuming events on its own
//! task.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted during one batch run
///
/// Events are broadcast via [`EventBus`] and serialize to tagged JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchEvent {
    /// Batch accepted and about to dispatch lookups
    BatchStarted {
        batch_id: Uuid,
        /// Number of addresses in the batch
        total: usize,
        /// Requested field names, in column order
        fields: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One address produced its result
    ItemResolved {
        batch_id: Uuid,
        address: String,
        /// `(field, value)` pairs in column order; values may be error markers
        values: Vec<(String, String)>,
        /// Cause when the lookup failed as a whole
        failure: Option<String>,
    },

    /// Completion counter advanced
    BatchProgress {
        batch_id: Uuid,
        completed: usize,
        total: usize,
    },

    /// Batch finished (`complete == false` when cancelled part-way)
    BatchCompleted {
        batch_id: Uuid,
        resolved: usize,
        failed: usize,
        complete: bool,
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl BatchEvent {
    /// Batch this event belongs to
    pub fn batch_id(&self) -> Uuid {
        match self {
            BatchEvent::BatchStarted { batch_id, .. }
            | BatchEvent::ItemResolved { batch_id, .. }
            | BatchEvent::BatchProgress { batch_id, .. }
            | BatchEvent::BatchCompleted { batch_id, .. } => *batch_id,
        }
    }

    /// Event type name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            BatchEvent::BatchStarted { .. } => "BatchStarted",
            BatchEvent::ItemResolved { .. } => "ItemResolved",
            BatchEvent::BatchProgress { .. } => "BatchProgress",
            BatchEvent::BatchCompleted { .. } => "BatchCompleted",
        }
    }
}

/// Event distribution bus backed by `tokio::sync::broadcast`
///
/// Publishing never blocks. A subscriber that falls more than `capacity`
/// events behind observes `RecvError::Lagged` and skips the oldest events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BatchEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use ipgeo_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(1000);
    /// assert_eq!(event_bus.capacity(), 1000);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the number of receivers, or `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: BatchEvent,
    ) -> Result<usize, broadcast::error::SendError<BatchEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
