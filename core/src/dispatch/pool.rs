use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam::channel::bounded;
use tracing::{debug, warn};

use crate::dispatch::{DispatchError, DispatchState, ParallelismProfile};

/// Run `work` over `jobs` on up to `thread_count` workers.
///
/// - `thread_count <= 1` or a single job runs on the caller's thread.
/// - Results come back in job order regardless of completion order.
/// - After a failure no job past the failed index is started; jobs already
///   running finish, queued ones are dropped, and the error with the lowest
///   job index is returned.
/// - A panicking job is reported as `DispatchError::WorkerPanicked` on both
///   the inline and the threaded path.
pub fn run<J, T, E, F>(jobs: Vec<J>, thread_count: usize, work: F) -> Result<Vec<T>, E>
where
    J: Send,
    T: Send,
    E: Send + From<DispatchError>,
    F: Fn(usize, J) -> Result<T, E> + Sync,
{
    run_with_profile(jobs, &ParallelismProfile::with_threads(thread_count), work)
}

pub fn run_with_profile<J, T, E, F>(
    jobs: Vec<J>,
    profile: &ParallelismProfile,
    work: F,
) -> Result<Vec<T>, E>
where
    J: Send,
    T: Send,
    E: Send + From<DispatchError>,
    F: Fn(usize, J) -> Result<T, E> + Sync,
{
    let mut state = DispatchState::Idle;
    state.advance(DispatchState::Dispatching)?;

    let total = jobs.len();
    let workers = profile.worker_count.min(total);

    let outcome = if workers <= 1 {
        run_sequential(jobs, &work)
    } else {
        run_parallel(jobs, workers, profile.inflight_jobs.max(1), &work)
    };

    match outcome {
        Ok(slots) => {
            state.advance(DispatchState::AllSucceeded)?;
            state.advance(DispatchState::Assembling)?;
            let mut results = Vec::with_capacity(total);
            for (index, slot) in slots.into_iter().enumerate() {
                results.push(slot.ok_or(DispatchError::MissingResult { index })?);
            }
            state.advance(DispatchState::Done)?;
            Ok(results)
        }
        Err((index, err)) => {
            state.advance(DispatchState::AnyFailed)?;
            state.advance(DispatchState::Aborting)?;
            debug!(index, total, "dispatch failed");
            state.advance(DispatchState::Failed)?;
            Err(err)
        }
    }
}

type Slots<T> = Vec<Option<T>>;

fn run_sequential<J, T, E, F>(jobs: Vec<J>, work: &F) -> Result<Slots<T>, (usize, E)>
where
    E: From<DispatchError>,
    F: Fn(usize, J) -> Result<T, E>,
{
    let mut slots = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.into_iter().enumerate() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(index, job))).map_err(|_| {
            warn!(index, "dispatch job panicked");
            (index, E::from(DispatchError::WorkerPanicked { worker: 0 }))
        })?;
        slots.push(Some(result.map_err(|e| (index, e))?));
    }
    Ok(slots)
}

fn run_parallel<J, T, E, F>(
    jobs: Vec<J>,
    workers: usize,
    capacity: usize,
    work: &F,
) -> Result<Slots<T>, (usize, E)>
where
    J: Send,
    T: Send,
    E: Send + From<DispatchError>,
    F: Fn(usize, J) -> Result<T, E> + Sync,
{
    let total = jobs.len();
    // Lowest failed job index, `usize::MAX` while every job has succeeded.
    let failed_at = AtomicUsize::new(usize::MAX);
    let mut slots: Slots<T> = (0..total).map(|_| None).collect();
    let mut first_err: Option<(usize, E)> = None;

    let (job_tx, job_rx) = bounded::<(usize, J)>(capacity);
    let (out_tx, out_rx) = bounded::<(usize, Result<T, E>)>(capacity);

    debug!(workers, total, capacity, "dispatching");

    thread::scope(|scope| {
        // ---- Feeder ----
        let failed_at = &failed_at;
        scope.spawn(move || {
            for (index, job) in jobs.into_iter().enumerate() {
                if failed_at.load(Ordering::Acquire) != usize::MAX {
                    break;
                }
                if job_tx.send((index, job)).is_err() {
                    break;
                }
            }
        });

        // ---- Workers ----
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = job_rx.clone();
                let tx = out_tx.clone();
                scope.spawn(move || {
                    for (index, job) in rx.iter() {
                        // Drain without running anything queued past a failure.
                        if index > failed_at.load(Ordering::Acquire) {
                            continue;
                        }
                        let result = work(index, job);
                        if result.is_err() {
                            failed_at.fetch_min(index, Ordering::AcqRel);
                        }
                        if tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(job_rx);
        drop(out_tx);

        // ---- Collector ----
        for (index, result) in out_rx.iter() {
            match result {
                Ok(value) => slots[index] = Some(value),
                Err(err) => {
                    if first_err.as_ref().map_or(true, |(i, _)| index < *i) {
                        first_err = Some((index, err));
                    }
                }
            }
        }

        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                warn!(worker, "dispatch worker panicked");
                if first_err.is_none() {
                    first_err = Some((total, DispatchError::WorkerPanicked { worker }.into()));
                }
            }
        }
    });

    match first_err {
        Some(failure) => Err(failure),
        None => Ok(slots),
    }
}
