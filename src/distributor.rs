//! Concurrent work distribution for per-element operations
//!
//! Status, diff and install operations across workspace elements are
//! independent of each other, so they are fanned out over a worker pool and
//! joined back in submission order. The pool is built per run and sized to
//! the unit count by default; `--jobs` caps it for very large workspaces.
//!
//! There is no cancellation: once submitted, every unit runs to completion
//! before the distributor returns, success or failure. Retry and robustness
//! policy belong to the caller, which may wrap unit closures to convert
//! failures into ordinary results.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::error::{Result, WsyncError};

/// One independent, self-contained operation over a single element
pub type WorkUnit<'a, T> = Box<dyn FnOnce() -> Result<T> + Send + 'a>;

/// Order-preserving bounded fan-out executor
pub struct Distributor {
    jobs: Option<usize>,
}

impl Distributor {
    /// `jobs = None` runs one worker per unit (the unit count is bounded by
    /// the configuration size, so this is the thread-per-element model)
    pub fn new(jobs: Option<usize>) -> Self {
        Self { jobs }
    }

    /// Run all units to completion and return their individual results in
    /// submission order, regardless of completion order.
    pub fn run_collect<'a, T: Send>(&self, units: Vec<WorkUnit<'a, T>>) -> Result<Vec<Result<T>>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.jobs.unwrap_or(units.len()).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| WsyncError::WorkerPoolFailed {
                reason: e.to_string(),
            })?;

        // into_par_iter + collect joins results back into submission order
        Ok(pool.install(|| units.into_par_iter().map(|unit| unit()).collect()))
    }

    /// Like [`run_collect`](Self::run_collect), but re-raises the first
    /// failure by submission order once every unit has completed.
    pub fn run<'a, T: Send>(&self, units: Vec<WorkUnit<'a, T>>) -> Result<Vec<T>> {
        let results = self.run_collect(units)?;

        let mut outputs = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(outputs),
        }
    }
}
