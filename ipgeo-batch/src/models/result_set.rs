//! Ordered collection of results from one batch

use super::LookupResult;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Results of one batch run, in arrival order
///
/// Arrival order follows network latency, not input order. Callers that need
/// a stable order call [`ResultSet::sort_by_address`].
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    results: Vec<LookupResult>,
    complete: bool,
}

impl ResultSet {
    /// Wrap finished results
    ///
    /// `complete` is false when the batch stopped early (cancellation).
    pub fn new(
        batch_id: Uuid,
        started_at: DateTime<Utc>,
        results: Vec<LookupResult>,
        complete: bool,
    ) -> Self {
        Self {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            results,
            complete,
        }
    }

    /// Single-entry set, as produced by a one-address lookup
    pub fn single(result: LookupResult) -> Self {
        let now = Utc::now();
        Self {
            batch_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            results: vec![result],
            complete: true,
        }
    }

    pub fn results(&self) -> &[LookupResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// False when the batch was cancelled before every address was dispatched
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn resolved_count(&self) -> usize {
        self.len() - self.failed_count()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Stable sort by address text; duplicates keep arrival order
    pub fn sort_by_address(&mut self) {
        self.results
            .sort_by(|a, b| a.address().as_str().cmp(b.address().as_str()));
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a LookupResult;
    type IntoIter = std::slice::Iter<'a, LookupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
