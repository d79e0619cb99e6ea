#![deny(clippy::all, clippy::pedantic)]
//! # Compute
//!
//! Fork-join execution for the physics pipeline.
//!
//! The crate exposes a single primitive, [`WorkerPool`], which runs a function
//! over every element of a slice on a fixed number of worker threads and
//! returns only once every invocation has completed. The physics stepper uses
//! one pool per world and calls it once per phase, so each call doubles as the
//! barrier between phases.
//!
//! A pool with a single worker never spawns threads; work runs inline on the
//! caller. This is the mode used for phases whose per-item cost is too small
//! to amortize dispatch.

use thiserror::Error;

pub mod pool;

pub use pool::WorkerPool;

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("worker pool needs at least one worker")]
    ZeroWorkers,
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Returns a pool sized to the machine, falling back to sequential execution.
///
/// Mirrors how the rest of the workspace picks an execution backend: try the
/// parallel option first and log when it has to degrade.
#[must_use]
pub fn default_pool() -> WorkerPool {
    match WorkerPool::with_available_parallelism() {
        Ok(pool) => {
            tracing::info!(workers = pool.workers(), "Using parallel worker pool.");
            pool
        }
        Err(e) => {
            tracing::warn!("Worker pool initialization failed ({e}), falling back to sequential execution.");
            WorkerPool::sequential()
        }
    }
}
