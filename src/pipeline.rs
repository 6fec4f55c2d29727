// THEORY:
// The `pipeline` module is the top-level API of the counting engine. An `Engine` owns a
// dedicated worker pool and, for each call, runs three steps:
//
//   1. start the overall clock, then prepare the buffer (decode / validate). Any failure
//      is returned immediately and no strategy runs.
//   2. start the processing clock and run the chosen strategy inside the worker pool.
//      Parallel strategies block inside the pool until all of their units have finished.
//   3. stop both clocks and return `{ count, processing, total }`.
//
// Because the overall clock starts first and both durations end at the same instant,
// `processing <= total` always holds. The engine keeps nothing from a call once it returns.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core_modules::decoder::BufferSource;
use crate::core_modules::partition::DEFAULT_CHUNK_TARGET;
use crate::core_modules::strategy::{CountingStrategy, Strategy};
use crate::error::ProcessingError;

/// Configuration for the `Engine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Threads in the engine's worker pool. `0` is treated as `1`.
    pub worker_threads: usize,
    /// Chunk target used when a `Strategy::StridedParallel` selector is run.
    pub chunk_target: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            chunk_target: DEFAULT_CHUNK_TARGET,
        }
    }
}

/// The outcome of one successful counting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountResult {
    /// Number of target pixels found.
    pub count: usize,
    /// Time spent inside the strategy.
    pub processing: Duration,
    /// Time spent on the whole call, buffer preparation included.
    pub total: Duration,
}

impl CountResult {
    pub fn processing_seconds(&self) -> f64 {
        self.processing.as_secs_f64()
    }

    pub fn total_seconds(&self) -> f64 {
        self.total.as_secs_f64()
    }
}

/// `1234567` -> `1,234,567`.
fn grouped(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// At most three fractional digits, trailing zeros dropped: `2.0004` -> `2`, `0.25` -> `0.25`.
fn seconds(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let whole = whole.parse::<usize>().map(grouped).unwrap_or_else(|_| whole.to_string());
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

impl fmt::Display for CountResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found: {} pixels.", grouped(self.count))?;
        writeln!(f, "Total: {} sec.", seconds(self.total_seconds()))?;
        write!(f, "For loop: {} sec.", seconds(self.processing_seconds()))
    }
}

/// Runs counting strategies on a dedicated worker pool and times them.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    pool: Arc<ThreadPool>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ProcessingError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads.max(1))
            .thread_name(|index| format!("pixel-census-{index}"))
            .build()
            .map_err(|err| {
                tracing::debug!(error = %err, "worker pool could not be built");
                ProcessingError::ContextCreationFailure
            })?;

        Ok(Self {
            config,
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Prepares `source` and counts its target pixels with `strategy`, blocking until done.
    pub fn count<S, C>(&self, source: S, strategy: &C) -> Result<CountResult, ProcessingError>
    where
        S: BufferSource,
        C: CountingStrategy + ?Sized,
    {
        let start_overall = Instant::now();

        let buffer = source.prepare().inspect_err(|err| {
            tracing::debug!(strategy = strategy.name(), error = %err, "buffer preparation failed");
        })?;

        let span = tracing::debug_span!(
            "count",
            strategy = strategy.name(),
            width = buffer.width(),
            height = buffer.height()
        );
        let _entered = span.enter();

        let start_processing = Instant::now();
        let count = self.pool.install(|| strategy.count(&buffer));
        let now = Instant::now();

        let result = CountResult {
            count,
            processing: now - start_processing,
            total: now - start_overall,
        };
        tracing::debug!(
            count = result.count,
            processing_seconds = result.processing_seconds(),
            total_seconds = result.total_seconds(),
            "count finished"
        );

        Ok(result)
    }

    /// Like `count`, taking a built-in selector and applying this engine's chunk target.
    pub fn count_with<S: BufferSource>(
        &self,
        source: S,
        strategy: Strategy,
    ) -> Result<CountResult, ProcessingError> {
        let resolved = strategy.with_chunk_target(self.config.chunk_target);
        self.count(source, resolved.as_ref())
    }
}
