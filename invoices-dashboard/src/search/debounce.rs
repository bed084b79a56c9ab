//! Trailing-edge debouncer backed by a single tokio worker task.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Delays a handler until `delay` has passed without a new event, then
/// runs it once with the most recent value.
///
/// Handler invocations run inline on the worker, so they never overlap.
/// Dropping the debouncer aborts the worker and any pending emission.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, mut handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let worker = tokio::spawn(async move {
            let timer = sleep(delay);
            tokio::pin!(timer);
            let mut pending: Option<T> = None;

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(value) => {
                            pending = Some(value);
                            timer.as_mut().reset(Instant::now() + delay);
                        }
                        None => break,
                    },
                    () = &mut timer, if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            handler(value).await;
                        }
                    }
                }
            }
        });

        Self { tx, worker }
    }

    /// Record an event. Returns false once the worker has stopped.
    pub fn call(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
