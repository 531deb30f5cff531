//! Per-call isolation: deadlines and batches.

use super::{RelaxConfig, RelaxRunner, SolveResult};
use crate::cp::BoundsSolver;
use crate::error::EngineError;
use crate::problem::Problem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Solves `problem` on a dedicated thread and waits at most `deadline`.
///
/// On timeout the result is an `ERROR` status and the worker is cancelled;
/// it stops at its next search node and its result is discarded.
pub fn solve_with_deadline(problem: Problem, config: RelaxConfig, deadline: Duration) -> SolveResult {
    run_with_deadline(problem, config, deadline).0
}

fn run_with_deadline(
    problem: Problem,
    config: RelaxConfig,
    deadline: Duration,
) -> (SolveResult, Option<JoinHandle<()>>) {
    if deadline.is_zero() {
        let err = EngineError::Config("deadline must be positive".to_string());
        return (SolveResult::from_error(&err), None);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("u-relax-solve".to_string())
        .spawn(move || {
            let result =
                RelaxRunner::run_with(&BoundsSolver::new(), &problem, &config, Some(worker_cancel));
            // The receiver is gone once the deadline has passed.
            let _ = tx.send(result);
        });

    let handle = match spawned {
        Ok(handle) => handle,
        Err(err) => {
            let err = EngineError::Solver(format!("failed to start solver thread: {err}"));
            return (SolveResult::from_error(&err), None);
        }
    };

    let result = match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            let err = EngineError::Solver(format!(
                "deadline of {} ms exceeded",
                deadline.as_millis()
            ));
            tracing::warn!(%err, "abandoning solve");
            SolveResult::from_error(&err)
        }
        Err(RecvTimeoutError::Disconnected) => SolveResult::from_error(&EngineError::Solver(
            "solver thread ended without a result".to_string(),
        )),
    };
    (result, Some(handle))
}

/// Solves independent problems, in parallel when the `parallel` feature is
/// enabled. Results are returned in input order.
pub fn solve_batch(problems: &[Problem], config: &RelaxConfig) -> Vec<SolveResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        problems
            .par_iter()
            .map(|p| RelaxRunner::run(p, config))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        problems.iter().map(|p| RelaxRunner::run(p, config)).collect()
    }
}
