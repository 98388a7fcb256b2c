//! Concurrent batch resolution
//!
//! # Architecture
//! - One lookup per address, at most `pool_size` in flight via
//!   `futures::stream::buffer_unordered`; excess addresses wait their turn
//! - Results are appended in arrival order, never reordered to input order
//! - The stream is consumed on the awaiting task, so the result accumulator
//!   and completion counter are plain locals and no lock is held across a
//!   network call
//! - Cancellation stops dispatching new lookups; in-flight lookups drain and
//!   the returned [`ResultSet`] is flagged incomplete

use crate::fields::FieldSet;
use crate::models::{AddressRecord, LookupResult, ProgressState, ResultSet};
use crate::services::lookup_client::LookupClient;
use crate::services::progress::{FnReporter, ProgressReporter};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Upper bound on the default worker count
const MAX_DEFAULT_POOL_SIZE: usize = 32;

/// Runs lookups for many addresses over a bounded worker pool
#[derive(Clone)]
pub struct ResolutionEngine {
    client: Arc<LookupClient>,
    pool_size: usize,
}

impl ResolutionEngine {
    /// `pool_size` below 1 is raised to 1
    pub fn new(client: LookupClient, pool_size: usize) -> Self {
        Self::with_shared_client(Arc::new(client), pool_size)
    }

    pub fn with_shared_client(client: Arc<LookupClient>, pool_size: usize) -> Self {
        Self {
            client,
            pool_size: pool_size.max(1),
        }
    }

    /// Host parallelism plus 4, capped at 32
    ///
    /// Lookups are I/O bound, so the pool is wider than the CPU count.
    pub fn default_pool_size() -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cpus + 4).min(MAX_DEFAULT_POOL_SIZE)
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn client(&self) -> &LookupClient {
        &self.client
    }

    /// Resolve a single address directly, bypassing the pool
    pub async fn resolve_one(&self, address: AddressRecord, fields: &FieldSet) -> LookupResult {
        self.client.lookup(address, fields).await
    }

    /// Resolve every address, reporting each completion
    ///
    /// Returns once every address has produced exactly one result.
    pub async fn resolve_batch<P, I>(
        &self,
        addresses: Vec<AddressRecord>,
        fields: &FieldSet,
        on_progress: P,
        on_item: I,
    ) -> ResultSet
    where
        P: FnMut(ProgressState),
        I: FnMut(&LookupResult),
    {
        self.resolve_batch_cancellable(
            addresses,
            fields,
            on_progress,
            on_item,
            &CancellationToken::new(),
        )
        .await
    }

    /// As [`resolve_batch`](Self::resolve_batch), stopping dispatch once
    /// `cancel` fires
    pub async fn resolve_batch_cancellable<P, I>(
        &self,
        addresses: Vec<AddressRecord>,
        fields: &FieldSet,
        on_progress: P,
        on_item: I,
        cancel: &CancellationToken,
    ) -> ResultSet
    where
        P: FnMut(ProgressState),
        I: FnMut(&LookupResult),
    {
        let mut reporter = FnReporter::new(on_progress, on_item);
        self.resolve_with_reporter(addresses, fields, &mut reporter, cancel)
            .await
    }

    /// Core batch loop driving a [`ProgressReporter`]
    pub async fn resolve_with_reporter<R>(
        &self,
        addresses: Vec<AddressRecord>,
        fields: &FieldSet,
        reporter: &mut R,
        cancel: &CancellationToken,
    ) -> ResultSet
    where
        R: ProgressReporter + ?Sized,
    {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = addresses.len();

        info!(
            batch_id = %batch_id,
            total,
            pool_size = self.pool_size,
            fields = %fields.query_param(),
            "Starting batch resolution"
        );
        reporter.on_started(batch_id, total, fields);

        let client = &self.client;
        let mut results: Vec<LookupResult> = Vec::with_capacity(total);

        let completions = stream::iter(addresses)
            .take_until(cancel.cancelled())
            .map(|address| client.lookup(address, fields))
            .buffer_unordered(self.pool_size);
        let mut completions = std::pin::pin!(completions);

        while let Some(result) = completions.next().await {
            results.push(result);
            let completed = results.len();

            if let Some(result) = results.last() {
                debug!(
                    batch_id = %batch_id,
                    address = %result.address(),
                    completed,
                    total,
                    "Address resolved"
                );
                reporter.on_item(result);
            }
            reporter.on_progress(ProgressState::new(completed, total));
        }

        let complete = results.len() == total;
        let result_set = ResultSet::new(batch_id, started_at, results, complete);

        if complete {
            info!(
                batch_id = %batch_id,
                total,
                resolved = result_set.resolved_count(),
                failed = result_set.failed_count(),
                duration_ms = result_set.duration_ms(),
                "Batch resolution completed"
            );
        } else {
            info!(
                batch_id = %batch_id,
                total,
                processed = result_set.len(),
                "Batch resolution cancelled"
            );
        }

        reporter.on_finished(&result_set);
        result_set
    }
}
