//! Priority-driven constraint relaxation over bounded integer problems.
//!
//! Provides a small, deterministic pipeline from declarative problem text to
//! a solution:
//!
//! - **Problem**: bounded integer variables, hard and soft linear
//!   constraints written as expression text, an optional linear objective.
//! - **Expressions**: a closed-grammar parser and evaluator that accepts only
//!   linear integer arithmetic with a single comparison. Caller text is never
//!   executed.
//! - **CP**: a linear integer model and an exact branch-and-bound solver with
//!   bounds propagation.
//! - **Relaxation**: repeated solving that sheds soft constraints in
//!   descending priority-value order until an attempt succeeds, reporting
//!   what was kept and what was dropped.
//!
//! # Usage
//!
//! ```
//! use u_relax::problem::{Constraint, Objective, Problem, Variable};
//! use u_relax::relax::ResultStatus;
//!
//! let problem = Problem::new(vec![
//!     Variable::new("rent", 0, 5000),
//!     Variable::new("savings", 0, 5000),
//! ])
//! .with_constraint(Constraint::hard("rent == 1500"))
//! .with_constraint(Constraint::hard("rent + savings <= 2500"))
//! .with_objective(Objective::maximize("savings"));
//!
//! let result = u_relax::solve(&problem);
//! assert_eq!(result.status, ResultStatus::Optimal);
//! assert_eq!(result.solution["savings"], 1000);
//! ```
//!
//! Failures never panic: validation, expression, and solver errors come back
//! as `VALIDATION_ERROR: ...` or `ERROR: ...` statuses.

pub mod cp;
pub mod error;
pub mod expr;
pub mod problem;
pub mod relax;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{EngineError, ExprError, ValidationError};

use problem::Problem;
use relax::{RelaxConfig, RelaxRunner, SolveResult};

/// Solves `problem` with default limits.
pub fn solve(problem: &Problem) -> SolveResult {
    RelaxRunner::run(problem, &RelaxConfig::default())
}

/// Solves `problem` with the given configuration.
pub fn solve_with_config(problem: &Problem, config: &RelaxConfig) -> SolveResult {
    RelaxRunner::run(problem, config)
}

/// Decodes a problem from JSON text and solves it. Malformed input yields a
/// `VALIDATION_ERROR` result.
pub fn solve_json(input: &str) -> SolveResult {
    match Problem::from_json(input) {
        Ok(problem) => solve(&problem),
        Err(err) => reject(err.into()),
    }
}

/// Like [`solve_json`], for an already parsed JSON value.
pub fn solve_value(value: serde_json::Value) -> SolveResult {
    match Problem::from_value(value) {
        Ok(problem) => solve(&problem),
        Err(err) => reject(err.into()),
    }
}

fn reject(err: EngineError) -> SolveResult {
    tracing::warn!(%err, "problem rejected");
    SolveResult::from_error(&err)
}
