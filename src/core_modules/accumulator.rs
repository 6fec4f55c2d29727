// THEORY:
// The accumulator is the only mutable state shared between workers during a count.
// Workers compute partial counts locally and hand each one over exactly once through
// `add`. Addition is associative and commutative, so the order partials arrive in does
// not affect the total. `total` is only meaningful after the join barrier.
//
// Two disciplines are provided:
// - `LockedAccumulator`: a `Mutex` around a plain counter. Every `add` takes the lock.
//   The per-row strategy uses it on purpose to show what lock-per-unit costs.
// - `AtomicAccumulator`: a lock-free `fetch_add`. Used by the strided strategy.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Combines per-worker partial counts into one total.
pub trait Accumulator: Sync {
    /// Adds `partial` to the running total. Safe to call from any number of threads.
    fn add(&self, partial: usize);

    /// The combined total. Call only after every contributor has returned.
    fn total(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct LockedAccumulator {
    count: Mutex<usize>,
}

impl LockedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for LockedAccumulator {
    fn add(&self, partial: usize) {
        // A poisoned lock still holds a consistent counter: the guarded section is one add.
        let mut count = self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *count += partial;
    }

    fn total(&self) -> usize {
        *self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Default)]
pub struct AtomicAccumulator {
    count: AtomicUsize,
}

impl AtomicAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for AtomicAccumulator {
    fn add(&self, partial: usize) {
        self.count.fetch_add(partial, Ordering::Relaxed);
    }

    fn total(&self) -> usize {
        // The join barrier that precedes this read already synchronizes with every add.
        self.count.load(Ordering::Relaxed)
    }
}
