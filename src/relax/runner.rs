//! Relaxation loop.

use super::builder::{BuiltModel, ModelBuilder};
use super::config::RelaxConfig;
use super::result::SolveResult;
use crate::cp::{BoundsSolver, CpSolution, CpSolver, SolverStatus, VarId};
use crate::error::EngineError;
use crate::problem::{Constraint, Problem};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State of a finished relaxation loop, before result assembly.
#[derive(Debug, Clone)]
pub struct RelaxOutcome<'p> {
    /// Solution of the final attempt.
    pub solution: CpSolution,
    /// Variable handles of the final attempt's model.
    pub vars: Vec<(String, VarId)>,
    /// Soft constraints still active in the final attempt, highest
    /// importance first.
    pub active: Vec<&'p Constraint>,
    /// Soft constraints dropped, in drop order.
    pub dropped: Vec<&'p Constraint>,
    /// Number of attempts made.
    pub attempts: usize,
    /// Solver time summed over all attempts, in seconds.
    pub wall_time: f64,
}

/// Drives solving attempts, shedding soft constraints until one succeeds.
pub struct RelaxRunner;

impl RelaxRunner {
    /// Solves `problem` with the built-in [`BoundsSolver`].
    pub fn run(problem: &Problem, config: &RelaxConfig) -> SolveResult {
        Self::run_with(&BoundsSolver::new(), problem, config, None)
    }

    /// Solves `problem` with `solver` and an optional cancellation token.
    ///
    /// The token is checked before each attempt and by the solver while it
    /// searches; once set, the run ends with an `ERROR` status. Every failure is reported through the result
    /// status.
    pub fn run_with<S: CpSolver>(
        solver: &S,
        problem: &Problem,
        config: &RelaxConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SolveResult {
        let outcome = problem
            .validate()
            .map_err(EngineError::from)
            .and_then(|()| Self::relax(solver, problem, config, cancel.as_deref()));

        match outcome {
            Ok(outcome) => SolveResult::assemble(problem, &outcome),
            Err(err) => {
                tracing::warn!(%err, "solve failed");
                SolveResult::from_error(&err)
            }
        }
    }

    /// Runs the relaxation loop without converting failures.
    ///
    /// Soft constraints are ordered by ascending priority, ties keeping
    /// declaration order. After every failed attempt the last one is
    /// dropped and the model is rebuilt from scratch, so a problem with `n`
    /// soft constraints takes at most `n + 1` attempts.
    pub fn relax<'p, S: CpSolver>(
        solver: &S,
        problem: &'p Problem,
        config: &RelaxConfig,
        cancel: Option<&AtomicBool>,
    ) -> Result<RelaxOutcome<'p>, EngineError> {
        let mut active: Vec<&Constraint> = problem.soft_constraints().collect();
        active.sort_by_key(|c| c.priority);

        let mut dropped = Vec::new();
        let mut attempts = 0usize;
        let mut wall_time = 0.0;

        loop {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(EngineError::Solver("cancelled".to_string()));
            }

            attempts += 1;
            tracing::debug!(attempt = attempts, active = active.len(), "building model");

            let BuiltModel { model, vars } = ModelBuilder::build(problem, &active)?;
            let solution = solver.solve_with_cancel(&model, &config.solver, cancel);
            wall_time += solution.wall_time;
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(EngineError::Solver("cancelled".to_string()));
            }

            tracing::trace!(
                attempt = attempts,
                status = %solution.status,
                nodes = solution.nodes,
                "attempt finished"
            );

            if solution.status == SolverStatus::ModelInvalid {
                let detail = match model.validate() {
                    Err(err) => err.to_string(),
                    Ok(()) => solution.status.name().to_string(),
                };
                return Err(EngineError::Solver(format!("model rejected: {detail}")));
            }

            if solution.is_solution_found() || active.is_empty() {
                return Ok(RelaxOutcome {
                    solution,
                    vars,
                    active,
                    dropped,
                    attempts,
                    wall_time,
                });
            }

            if let Some(removed) = active.pop() {
                tracing::info!(
                    priority = removed.priority,
                    expression = %removed.expression,
                    "dropping soft constraint"
                );
                dropped.push(removed);
            }
        }
    }
}
