//! Manifest partitioning into bounded-size batches.

use crate::config::validate_batch_size;
use crate::error::Result;
use crate::manifest::ManifestRow;

/// A contiguous slice of the manifest processed as one unit.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Zero-based position of this batch in the run.
    pub index: usize,
    /// Rows in original manifest order.
    pub rows: &'a [ManifestRow],
}

impl Batch<'_> {
    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lazy producer of batches over a manifest.
///
/// Consumed once: iterating moves the cursor forward and it is never
/// rewound.
#[derive(Debug)]
pub struct Batches<'a> {
    chunks: std::slice::Chunks<'a, ManifestRow>,
    next_index: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.chunks.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Batch { index, rows })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}

/// Split `rows` into batches of at most `batch_size` rows.
///
/// Yields `ceil(rows.len() / batch_size)` batches; only the last one may be
/// short. A zero (or oversized) batch size is a configuration error.
pub fn partition(rows: &[ManifestRow], batch_size: usize) -> Result<Batches<'_>> {
    validate_batch_size(batch_size)?;
    Ok(Batches {
        chunks: rows.chunks(batch_size),
        next_index: 0,
    })
}
