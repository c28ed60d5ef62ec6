//! Thread pool dispatcher.
//!
//! Runs independent jobs on a bounded set of scoped worker threads and
//! returns their results in job order, or the failure with the lowest job
//! index.

pub mod parallelism;
pub mod pool;
pub mod state;

pub use parallelism::ParallelismProfile;
pub use pool::{run, run_with_profile};
pub use state::DispatchState;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("illegal dispatch transition {from:?} -> {to:?}")]
    IllegalTransition { from: DispatchState, to: DispatchState },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("job {index} produced no result")]
    MissingResult { index: usize },
}
