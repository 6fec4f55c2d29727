// THEORY:
// A `CountingStrategy` turns a `PixelBuffer` into the number of target pixels it holds.
// All variants must return the same number for the same buffer; they differ only in how
// the work is split and how partial results are combined.
//
// - `Sequential`:      rows outer, columns inner, one local counter. The baseline.
// - `ColumnMajor`:     columns outer, rows inner. Same answer, poor cache locality.
// - `NaiveParallel`:   one parallel task per row, each pushing its subtotal through a
//                      locked accumulator. When rows are short, dispatch and lock
//                      overhead dominate and this is slower than `Sequential`. That is
//                      the point of keeping it.
// - `StridedParallel`: rows grouped into ~20 contiguous chunks, one task and one
//                      accumulator write per chunk.
//
// Parallel strategies use rayon's parallel iterators. `for_each` returns only after every
// unit has run, which is the join barrier before `total()` is read. Which pool the work
// lands on is decided by the caller (the engine runs strategies inside its own pool).

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use thiserror::Error;

use crate::core_modules::accumulator::{Accumulator, AtomicAccumulator, LockedAccumulator};
use crate::core_modules::partition::{self, DEFAULT_CHUNK_TARGET};
use crate::core_modules::pixel_buffer::PixelBuffer;

/// An algorithm that counts target pixels in a buffer.
pub trait CountingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn count(&self, buffer: &PixelBuffer) -> usize;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sequential;

impl CountingStrategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn count(&self, buffer: &PixelBuffer) -> usize {
        let mut count = 0;
        for row in 0..buffer.height() {
            count += buffer.count_row(row);
        }
        count
    }
}

/// Walks the buffer column by column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMajor;

impl CountingStrategy for ColumnMajor {
    fn name(&self) -> &'static str {
        "column-major"
    }

    fn count(&self, buffer: &PixelBuffer) -> usize {
        let mut count = 0;
        for column in 0..buffer.width() {
            for row in 0..buffer.height() {
                if buffer.is_target(row, column) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// One task and one locked write per row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NaiveParallel;

impl CountingStrategy for NaiveParallel {
    fn name(&self) -> &'static str {
        "naive-parallel"
    }

    fn count(&self, buffer: &PixelBuffer) -> usize {
        let accumulator = LockedAccumulator::new();
        count_rows_into(buffer, &accumulator);
        accumulator.total()
    }
}

/// Scans every row as its own parallel job and hands each row's subtotal to `accumulator`.
fn count_rows_into(buffer: &PixelBuffer, accumulator: &impl Accumulator) {
    // `with_max_len(1)` stops rayon from batching rows into larger jobs.
    (0..buffer.height())
        .into_par_iter()
        .with_max_len(1)
        .for_each(|row| {
            let sub_total = buffer.count_row(row);
            accumulator.add(sub_total);
        });
}

/// One task and one write per chunk of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedParallel {
    pub chunk_target: usize,
}

impl StridedParallel {
    pub fn new(chunk_target: usize) -> Self {
        Self { chunk_target }
    }
}

impl Default for StridedParallel {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_TARGET)
    }
}

impl CountingStrategy for StridedParallel {
    fn name(&self) -> &'static str {
        "strided-parallel"
    }

    fn count(&self, buffer: &PixelBuffer) -> usize {
        let ranges = partition::plan(buffer.height(), self.chunk_target);
        let accumulator = AtomicAccumulator::new();

        ranges.par_iter().for_each(|range| {
            let sub_total: usize = range.rows().map(|row| buffer.count_row(row)).sum();
            accumulator.add(sub_total);
        });

        accumulator.total()
    }
}

/// Selects one of the built-in strategies.
///
/// `StridedParallel` here uses the default chunk target; the engine substitutes its
/// configured target when it runs the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Sequential,
    ColumnMajor,
    NaiveParallel,
    StridedParallel,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::ColumnMajor,
        Strategy::NaiveParallel,
        Strategy::StridedParallel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => Sequential.name(),
            Strategy::ColumnMajor => ColumnMajor.name(),
            Strategy::NaiveParallel => NaiveParallel.name(),
            Strategy::StridedParallel => "strided-parallel",
        }
    }

    /// Resolves the selector to a concrete strategy, using `chunk_target` for the strided one.
    pub fn with_chunk_target(self, chunk_target: usize) -> Box<dyn CountingStrategy> {
        match self {
            Strategy::Sequential => Box::new(Sequential),
            Strategy::ColumnMajor => Box::new(ColumnMajor),
            Strategy::NaiveParallel => Box::new(NaiveParallel),
            Strategy::StridedParallel => Box::new(StridedParallel::new(chunk_target)),
        }
    }
}

impl CountingStrategy for Strategy {
    fn name(&self) -> &'static str {
        Strategy::name(self)
    }

    fn count(&self, buffer: &PixelBuffer) -> usize {
        match self {
            Strategy::Sequential => Sequential.count(buffer),
            Strategy::ColumnMajor => ColumnMajor.count(buffer),
            Strategy::NaiveParallel => NaiveParallel.count(buffer),
            Strategy::StridedParallel => StridedParallel::default().count(buffer),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown counting strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}
