//! Progress reporting interface
//!
//! The engine calls a reporter from the task that awaits the batch, one call
//! at a time, so implementations own their state without locking.

use crate::fields::FieldSet;
use crate::models::{LookupResult, ProgressState, ResultSet};
use uuid::Uuid;

/// Receives batch lifecycle, per-item, and progress notifications
pub trait ProgressReporter {
    /// Batch accepted; called once before any lookup is dispatched
    fn on_started(&mut self, _batch_id: Uuid, _total: usize, _fields: &FieldSet) {}

    /// One address finished; called exactly once per result
    fn on_item(&mut self, result: &LookupResult);

    /// Completion count advanced; `completed` strictly increases
    fn on_progress(&mut self, progress: ProgressState);

    /// Batch finished or was cancelled
    fn on_finished(&mut self, _results: &ResultSet) {}
}

/// Adapts a pair of closures to [`ProgressReporter`]
pub struct FnReporter<P, I> {
    on_progress: P,
    on_item: I,
}

impl<P, I> FnReporter<P, I>
where
    P: FnMut(ProgressState),
    I: FnMut(&LookupResult),
{
    pub fn new(on_progress: P, on_item: I) -> Self {
        Self {
            on_progress,
            on_item,
        }
    }
}

impl<P, I> ProgressReporter for FnReporter<P, I>
where
    P: FnMut(ProgressState),
    I: FnMut(&LookupResult),
{
    fn on_item(&mut self, result: &LookupResult) {
        (self.on_item)(result)
    }

    fn on_progress(&mut self, progress: ProgressState) {
        (self.on_progress)(progress)
    }
}
