//! Shared bounded worker pool for fan-out listing.
//!
//! An [`Executor`] is a cheap, cloneable handle over one rayon pool. It is
//! meant to be built once per process and injected into every lister; the
//! pool width bounds the number of remote calls in flight across all of them.

use crate::cloud::helpers::IntoCloudError;
use crate::cloud::traits::{CloudError, CloudResult, ErrorKind};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

/// Worker pool options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Number of worker threads. Defaults to the number of CPUs.
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Handle over the process-wide worker pool that runs fan-out tasks.
///
/// Clones share the same threads.
#[derive(Clone)]
pub struct Executor {
    pool: Arc<ThreadPool>,
}

impl Executor {
    /// Build a pool with `threads` workers (at least one).
    ///
    /// A panicking task does not take the process down: its join reports
    /// `InternalError` instead.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the operating system refuses to spawn the workers.
    pub fn new(threads: usize) -> CloudResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|n| format!("stratus-worker-{n}"))
            .panic_handler(|_| {})
            .build()
            .into_cloud_error(ErrorKind::InternalError)?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Build a pool sized from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the operating system refuses to spawn the workers.
    pub fn from_config(config: &ExecutorConfig) -> CloudResult<Self> {
        Self::new(config.threads.unwrap_or_else(num_cpus::get))
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` once per input on the pool and join the outputs positionally.
    ///
    /// The output order always follows `inputs`, regardless of which task
    /// finishes first. The first error received fails the join and is returned
    /// at once: tasks already running finish in the background and their
    /// results are dropped, tasks not yet started are skipped.
    ///
    /// Must not be called from a task running on the same executor.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed task, unchanged, or `InternalError` if a
    /// task panicked.
    pub fn join_all<I, O, F>(&self, inputs: Vec<I>, task: F) -> CloudResult<Vec<O>>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(I) -> CloudResult<O> + Send + Sync + 'static,
    {
        let total = inputs.len();
        let task = Arc::new(task);
        let failed = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        for (index, input) in inputs.into_iter().enumerate() {
            let task = Arc::clone(&task);
            let failed = Arc::clone(&failed);
            let sender = sender.clone();
            self.pool.spawn(move || {
                if failed.load(Ordering::Acquire) {
                    return;
                }
                let result = task(input);
                if result.is_err() {
                    failed.store(true, Ordering::Release);
                }
                // The receiver is gone once the join has already failed.
                let _ = sender.send((index, result));
            });
        }
        drop(sender);

        let mut slots: Vec<Option<O>> = std::iter::repeat_with(|| None).take(total).collect();
        for _ in 0..total {
            let (index, result) = receiver.recv().map_err(|_| {
                CloudError::new(ErrorKind::InternalError, "A fan-out task panicked")
            })?;
            slots[index] = Some(result?);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("threads", &self.threads())
            .finish()
    }
}
