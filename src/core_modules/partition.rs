// THEORY:
// The partition planner slices the rows `[0, height)` into a small number of contiguous,
// half-open `RowRange`s for the strided strategy. Fewer, larger units mean fewer task
// dispatches and fewer synchronized writes, at the cost of some parallel granularity.
//
// Plan for a chunk target `T`:
//   stride = max(1, height / T)
//   chunks = ceil(height / stride)
// Every range is `stride` rows except the last, which is clipped to `height`. The ranges
// are pairwise disjoint, cover every row exactly once, and none is empty. A zero-height
// buffer produces no ranges at all.

use std::ops::Range;

/// The default number of chunks the strided strategy aims for.
pub const DEFAULT_CHUNK_TARGET: usize = 20;

/// A half-open span of rows `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Rows per chunk for `height` rows split toward `chunk_target` chunks. Never zero.
pub fn stride(height: usize, chunk_target: usize) -> usize {
    (height / chunk_target.max(1)).max(1)
}

/// Splits `[0, height)` into contiguous row ranges.
pub fn plan(height: usize, chunk_target: usize) -> Vec<RowRange> {
    let stride = stride(height, chunk_target);
    let chunk_count = height.div_ceil(stride);

    (0..chunk_count)
        .map(|chunk| {
            let start = chunk * stride;
            RowRange::new(start, (start + stride).min(height))
        })
        .collect()
}
