use super::error::SynthesisError;
use super::model::SynthesisItem;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a caller and a running batch.
///
/// Items already in flight run to completion; items that have not started
/// yet are reported as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ItemOutcome<T> {
    pub item_key: String,
    pub result: Result<T, SynthesisError>,
}

/// Runs per-item work with at most `concurrency` items in flight.
///
/// The first batch-fatal error stops new items from starting; they come
/// back as `SynthesisError::Aborted` and the fatal error is returned
/// alongside the outcomes.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<T, F, Fut>(
        &self,
        items: Vec<SynthesisItem>,
        cancel: &CancellationFlag,
        worker: F,
    ) -> (Vec<ItemOutcome<T>>, Option<SynthesisError>)
    where
        F: Fn(SynthesisItem) -> Fut,
        Fut: Future<Output = Result<T, SynthesisError>>,
    {
        let fatal: Mutex<Option<SynthesisError>> = Mutex::new(None);
        let worker = &worker;
        let fatal_ref = &fatal;

        let outcomes: Vec<ItemOutcome<T>> = stream::iter(items)
            .map(|item| async move {
                let item_key = item.item_key.clone();

                if cancel.is_cancelled() {
                    return ItemOutcome {
                        item_key,
                        result: Err(SynthesisError::Cancelled),
                    };
                }
                if fatal_ref.lock().is_some() {
                    return ItemOutcome {
                        item_key,
                        result: Err(SynthesisError::Aborted),
                    };
                }

                let result = worker(item).await;

                if let Err(e) = &result {
                    if e.is_batch_fatal() {
                        let mut slot = fatal_ref.lock();
                        if slot.is_none() {
                            tracing::error!(
                                item_key = %item_key,
                                error = %e,
                                "Batch-fatal failure, remaining items will not start"
                            );
                            *slot = Some(e.clone());
                        }
                    }
                }

                ItemOutcome { item_key, result }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        (outcomes, fatal.into_inner())
    }
}
