//! Fixed-size fork-join worker pool.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::ComputeError;

/// Runs data-parallel loops on a fixed number of workers.
///
/// Every call partitions its input into at most `workers` contiguous chunks
/// and blocks until all of them are processed. There is no partial result and
/// no early exit: the supplied function is expected to be infallible.
pub struct WorkerPool {
    workers: usize,
    // `None` for the single-worker case, which runs inline.
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    /// Build a pool with exactly `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ZeroWorkers`] when `workers == 0` and
    /// [`ComputeError::PoolBuild`] if the OS refuses to spawn the threads.
    pub fn new(workers: usize) -> Result<Self, ComputeError> {
        match workers {
            0 => Err(ComputeError::ZeroWorkers),
            1 => Ok(Self::sequential()),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("compute-worker-{i}"))
                    .build()?;
                tracing::info!(workers = n, "Built worker pool.");
                Ok(Self {
                    workers: n,
                    pool: Some(pool),
                })
            }
        }
    }

    /// A pool that runs everything on the calling thread.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            workers: 1,
            pool: None,
        }
    }

    /// Build a pool with one worker per available hardware thread.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::new`].
    pub fn with_available_parallelism() -> Result<Self, ComputeError> {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self::new(workers)
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub const fn is_sequential(&self) -> bool {
        self.pool.is_none()
    }

    /// Invoke `op` once for every item, returning after all invocations finish.
    pub fn for_each<T, F>(&self, items: &[T], op: F)
    where
        T: Sync,
        F: Fn(&T) + Sync,
    {
        if items.is_empty() {
            return;
        }
        match &self.pool {
            None => items.iter().for_each(op),
            Some(pool) => {
                let chunk = self.chunk_len(items.len());
                pool.install(|| {
                    items
                        .par_chunks(chunk)
                        .for_each(|part| part.iter().for_each(&op));
                });
            }
        }
    }

    /// Exclusive-access variant of [`WorkerPool::for_each`].
    pub fn for_each_mut<T, F>(&self, items: &mut [T], op: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync,
    {
        if items.is_empty() {
            return;
        }
        match &self.pool {
            None => items.iter_mut().for_each(op),
            Some(pool) => {
                let chunk = self.chunk_len(items.len());
                pool.install(|| {
                    items
                        .par_chunks_mut(chunk)
                        .for_each(|part| part.iter_mut().for_each(&op));
                });
            }
        }
    }

    fn chunk_len(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("sequential", &self.is_sequential())
            .finish()
    }
}
