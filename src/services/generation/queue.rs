//! Portrait Queue
//!
//! Single-flight serializer for image generation. Jobs run strictly in
//! enqueue order, one at a time, each preceded by a fixed spacing delay so a
//! saturated queue stays under the service's requests-per-minute ceiling.
//!
//! The queue only remembers the completion signal of the most recently
//! enqueued job. Each new job takes that signal as its predecessor and leaves
//! its own in its place, so enqueueing never waits. A job that fails or
//! panics still releases its successor; there is no cancellation.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use archetype_core::{GenerationError, GenerationResult};

use super::timing::{Sleeper, TokioSleeper};

pub const DEFAULT_PORTRAIT_SPACING_MS: u64 = 5_000;

/// FIFO lane that runs at most one job at a time.
pub struct PortraitQueue {
    spacing: Duration,
    sleeper: Arc<dyn Sleeper>,
    tail: Mutex<Option<oneshot::Receiver<()>>>,
    pending: Arc<AtomicUsize>,
}

impl PortraitQueue {
    pub fn new(spacing: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            spacing,
            sleeper,
            tail: Mutex::new(None),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Jobs enqueued but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Append `job` to the lane and return a ticket for its result.
    ///
    /// Must be called from within a tokio runtime. The job runs even if the
    /// ticket is dropped.
    pub fn enqueue<F, Fut, T>(&self, job: F) -> QueueTicket<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = GenerationResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let predecessor = self
            .tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(done_rx);

        let (result_tx, result_rx) = oneshot::channel();
        let position = self.pending.fetch_add(1, Ordering::SeqCst);
        let pending = Arc::clone(&self.pending);
        let sleeper = Arc::clone(&self.sleeper);
        let spacing = self.spacing;

        tracing::debug!(position, "portrait job enqueued");

        tokio::spawn(async move {
            // Dropping `done_tx` on any exit path, including unwinding,
            // releases the next job.
            let _release = ReleaseOnDrop {
                done: Some(done_tx),
                pending,
            };

            if let Some(predecessor) = predecessor {
                // A closed channel means the predecessor panicked; proceed anyway.
                let _ = predecessor.await;
            }
            sleeper.sleep(spacing).await;

            let outcome = job().await;
            if let Err(err) = &outcome {
                tracing::debug!(error = %err, "portrait job failed");
            }
            if result_tx.send(outcome).is_err() {
                tracing::debug!("portrait ticket dropped before completion");
            }
        });

        QueueTicket { result: result_rx }
    }
}

impl Default for PortraitQueue {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_PORTRAIT_SPACING_MS),
            Arc::new(TokioSleeper),
        )
    }
}

struct ReleaseOnDrop {
    done: Option<oneshot::Sender<()>>,
    pending: Arc<AtomicUsize>,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}

/// A caller's claim on one queued job. Resolves to the job's result.
#[must_use = "the job runs regardless, but its result is lost unless the ticket is awaited"]
pub struct QueueTicket<T> {
    result: oneshot::Receiver<GenerationResult<T>>,
}

impl<T> Future for QueueTicket<T> {
    type Output = GenerationResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.result).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(GenerationError::unknown(
                    "portrait job terminated before producing a result",
                ))
            })
        })
    }
}
