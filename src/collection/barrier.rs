//! One-shot load barrier.
//!
//! The load runs as a spawned task; every waiter shares its single outcome.

use crate::error::StoreError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Outcome of loading a collection's files into its index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    /// Files present on disk that never reached the index.
    pub skipped: usize,
}

/// Handle of the runtime the load will run on.
pub(crate) fn current_runtime(collection: &str) -> Result<Handle, StoreError> {
    Handle::try_current().map_err(|e| {
        StoreError::Runtime(format!(
            "collection '{}' must be opened inside a Tokio runtime: {}",
            collection, e
        ))
    })
}

type LoadOutcome = Result<LoadStats, Arc<StoreError>>;

#[derive(Clone)]
pub(crate) struct LoadBarrier {
    collection: String,
    outcome: Shared<BoxFuture<'static, LoadOutcome>>,
    /// Set by the load task itself, whether or not anyone is waiting.
    finished: Arc<AtomicBool>,
}

impl LoadBarrier {
    /// Spawn `load` on `runtime`.
    pub(crate) fn spawn<F>(runtime: &Handle, collection: &str, load: F) -> Self
    where
        F: Future<Output = Result<LoadStats, StoreError>> + Send + 'static,
    {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let task = runtime.spawn(async move {
            let result = load.await;
            flag.store(true, Ordering::Release);
            result
        });
        let outcome = async move {
            match task.await {
                Ok(result) => result.map_err(Arc::new),
                Err(join) => Err(Arc::new(StoreError::Runtime(format!(
                    "load task did not complete: {}",
                    join
                )))),
            }
        }
        .boxed()
        .shared();

        Self {
            collection: collection.to_string(),
            outcome,
            finished,
        }
    }

    /// Wait for the load to finish, or for `cancel` to fire.
    pub(crate) async fn wait(&self, cancel: &CancellationToken) -> Result<LoadStats, StoreError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            outcome = self.outcome.clone() => outcome.map_err(|source| StoreError::LoadFailed {
                collection: self.collection.clone(),
                source,
            }),
        }
    }

    /// Whether the load task has finished, successfully or not.
    pub(crate) fn is_ready(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
