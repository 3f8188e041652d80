//! Combining per-batch results into one run result.

use crate::output::{AggregateResult, BatchResult, DetectionRow};
use std::collections::BTreeMap;
use tracing::debug;

/// Concatenate batch results in arrival order, skipping empty markers.
pub fn aggregate(results: impl IntoIterator<Item = BatchResult>) -> AggregateResult {
    let rows: Vec<DetectionRow> = results
        .into_iter()
        .filter_map(|result| match result {
            BatchResult::Detections(rows) => Some(rows),
            BatchResult::Empty => None,
        })
        .flatten()
        .collect();

    AggregateResult::from_rows(rows)
}

/// Streaming aggregator that restores batch order.
///
/// Results may be pushed in any order; they are appended to the output
/// strictly by batch index. A batch that failed must be reported with
/// [`Aggregator::mark_failed`] so later batches are not held back.
#[derive(Debug, Default)]
pub struct Aggregator {
    pending: BTreeMap<usize, Option<BatchResult>>,
    next: usize,
    rows: Vec<DetectionRow>,
}

impl Aggregator {
    /// Create an empty aggregator expecting batch 0 first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of batch `index`.
    pub fn push(&mut self, index: usize, result: BatchResult) {
        self.pending.insert(index, Some(result));
        self.drain_ready();
    }

    /// Record that batch `index` produced nothing usable.
    pub fn mark_failed(&mut self, index: usize) {
        self.pending.insert(index, None);
        self.drain_ready();
    }

    /// Rows appended so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn drain_ready(&mut self) {
        while let Some(slot) = self.pending.remove(&self.next) {
            if let Some(BatchResult::Detections(rows)) = slot {
                self.rows.extend(rows);
            }
            self.next += 1;
        }
    }

    /// Finish aggregation.
    ///
    /// Batches still waiting on a missing predecessor are appended in index
    /// order.
    pub fn finish(mut self) -> AggregateResult {
        if !self.pending.is_empty() {
            debug!(
                "Flushing {} batch result(s) after a gap at batch {}",
                self.pending.len(),
                self.next
            );
        }
        for (_, slot) in std::mem::take(&mut self.pending) {
            if let Some(BatchResult::Detections(rows)) = slot {
                self.rows.extend(rows);
            }
        }
        AggregateResult::from_rows(self.rows)
    }
}
