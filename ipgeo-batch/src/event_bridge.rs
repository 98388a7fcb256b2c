//! Event bridge from engine callbacks to the event bus
//!
//! **Architecture:**
//! - The engine drives an [`EventBridge`] as its [`ProgressReporter`]
//! - Each callback becomes a [`BatchEvent`] on the [`EventBus`]
//! - Presentation subscribes to the bus and owns all display state
//!
//! Emission is lossy: with nobody subscribed the batch still runs.

use crate::fields::FieldSet;
use crate::models::{LookupResult, ProgressState, ResultSet};
use crate::services::progress::ProgressReporter;
use ipgeo_common::events::{BatchEvent, EventBus};
use uuid::Uuid;

/// Smallest bus the CLI allocates
pub const MIN_BUS_CAPACITY: usize = 64;

/// Largest bus the CLI allocates; slots are reserved up front
pub const MAX_BUS_CAPACITY: usize = 1 << 16;

/// Bus capacity that holds every event of a batch of `total` addresses
///
/// Each address produces an `ItemResolved` and a `BatchProgress`, plus one
/// `BatchStarted` and one `BatchCompleted` per batch. Very large batches are
/// clamped; a console that lags there recovers from the next progress event.
pub fn bus_capacity(total: usize) -> usize {
    total
        .saturating_mul(2)
        .saturating_add(2)
        .clamp(MIN_BUS_CAPACITY, MAX_BUS_CAPACITY)
}

/// Reporter that republishes engine notifications as [`BatchEvent`]s
pub struct EventBridge {
    event_bus: EventBus,
    batch_id: Uuid,
}

impl EventBridge {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            event_bus,
            batch_id: Uuid::nil(),
        }
    }

    /// Batch id of the current run (nil before the first batch starts)
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }
}

impl ProgressReporter for EventBridge {
    fn on_started(&mut self, batch_id: Uuid, total: usize, fields: &FieldSet) {
        self.batch_id = batch_id;
        self.event_bus.emit_lossy(BatchEvent::BatchStarted {
            batch_id,
            total,
            fields: fields.names().into_iter().map(str::to_string).collect(),
            timestamp: chrono::Utc::now(),
        });
    }

    fn on_item(&mut self, result: &LookupResult) {
        self.event_bus.emit_lossy(item_event(self.batch_id, result));
    }

    fn on_progress(&mut self, progress: ProgressState) {
        self.event_bus.emit_lossy(BatchEvent::BatchProgress {
            batch_id: self.batch_id,
            completed: progress.completed,
            total: progress.total,
        });
    }

    fn on_finished(&mut self, results: &ResultSet) {
        self.event_bus.emit_lossy(BatchEvent::BatchCompleted {
            batch_id: results.batch_id,
            resolved: results.resolved_count(),
            failed: results.failed_count(),
            complete: results.is_complete(),
            duration_ms: results.duration_ms(),
            timestamp: chrono::Utc::now(),
        });
    }
}

/// Convert one result into an `ItemResolved` event
pub fn item_event(batch_id: Uuid, result: &LookupResult) -> BatchEvent {
    BatchEvent::ItemResolved {
        batch_id,
        address: result.address().to_string(),
        values: result
            .values()
            .map(|(field, value)| (field.as_str().to_string(), value.to_string()))
            .collect(),
        failure: result.failure().map(str::to_string),
    }
}
