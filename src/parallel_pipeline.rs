// THEORY:
// Counting a large image can take long enough that a caller driving a UI or an event loop
// must not wait on it. `Engine::spawn` moves the whole call, preparation included, onto
// tokio's blocking thread pool and hands back a `CountHandle`. The handle is a future that
// resolves exactly once with the same `Result` the synchronous `count` would have
// returned. There is no cancellation: dropping the handle discards the outcome but the
// count itself runs to completion.

use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::core_modules::decoder::BufferSource;
use crate::core_modules::strategy::CountingStrategy;
use crate::error::ProcessingError;
use crate::pipeline::{CountResult, Engine};

/// The pending outcome of a counting call running in the background.
#[derive(Debug)]
pub struct CountHandle {
    task: JoinHandle<Result<CountResult, ProcessingError>>,
}

impl Future for CountHandle {
    type Output = Result<CountResult, ProcessingError>;

    /// # Panics
    /// Re-raises a panic from the counting call, and panics if the runtime was shut down
    /// before the call could start.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match futures::ready!(self.task.poll_unpin(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(err) => match err.try_into_panic() {
                Ok(payload) => panic::resume_unwind(payload),
                Err(err) => panic!("counting task did not run: {err}"),
            },
        }
    }
}

impl Engine {
    /// Runs `count` off the current task and returns a handle to its outcome.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, C>(&self, source: S, strategy: C) -> CountHandle
    where
        S: BufferSource + Send + 'static,
        C: CountingStrategy + 'static,
    {
        let engine = self.clone();
        let task = tokio::task::spawn_blocking(move || engine.count(source, &strategy));
        CountHandle { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::decoder::EncodedImage;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::core_modules::strategy::{Strategy, StridedParallel};
    use crate::pipeline::EngineConfig;
    use futures::future::join_all;

    fn engine() -> Engine {
        Engine::new(EngineConfig {
            worker_threads: 2,
            ..EngineConfig::default()
        })
        .expect("engine")
    }

    struct Exploding;

    impl CountingStrategy for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn count(&self, _buffer: &PixelBuffer) -> usize {
            panic!("strategy exploded")
        }
    }

    #[tokio::test]
    async fn background_count_resolves_with_the_result() {
        let engine = engine();
        let buffer = PixelBuffer::filled(40, 30, Pixel::WHITE);

        let result = engine.spawn(buffer, StridedParallel::default()).await.expect("count succeeds");

        assert_eq!(result.count, 1_200);
        assert!(result.processing <= result.total);
    }

    #[tokio::test]
    async fn background_count_delivers_preparation_errors() {
        let engine = engine();
        let outcome = engine.spawn(None::<PixelBuffer>, Strategy::Sequential).await;
        assert_eq!(outcome, Err(ProcessingError::DecodeFailure));
    }

    #[tokio::test]
    async fn concurrent_calls_each_resolve_once() {
        let engine = engine();
        let handles: Vec<CountHandle> = Strategy::ALL
            .into_iter()
            .map(|strategy| {
                let buffer = PixelBuffer::from_fn(50, 60, |row, _| if row < 10 { Pixel::WHITE } else { Pixel::BLACK });
                engine.spawn(buffer, strategy)
            })
            .collect();

        let outcomes = join_all(handles).await;

        assert_eq!(outcomes.len(), Strategy::ALL.len());
        for outcome in outcomes {
            assert_eq!(outcome.map(|result| result.count), Ok(500));
        }
    }

    #[tokio::test]
    async fn static_encoded_bytes_can_be_counted_in_the_background() {
        let engine = engine();
        let outcome = engine.spawn(EncodedImage(b"not an image"), Strategy::Sequential).await;
        assert_eq!(outcome, Err(ProcessingError::DecodeFailure));
    }

    #[tokio::test]
    #[should_panic(expected = "strategy exploded")]
    async fn strategy_panics_reach_the_awaiting_task() {
        let engine = engine();
        let _ = engine.spawn(PixelBuffer::filled(1, 1, Pixel::WHITE), Exploding).await;
    }
}
