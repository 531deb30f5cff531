//! Result assembly.

use super::runner::RelaxOutcome;
use crate::cp::SolverStatus;
use crate::error::EngineError;
use crate::problem::Problem;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Terminal status of a relaxation run.
///
/// Serializes as its display string: `"OPTIMAL"`, `"FEASIBLE"`,
/// `"INFEASIBLE"`, `"UNKNOWN"`, `"ERROR: <detail>"` or
/// `"VALIDATION_ERROR: <detail>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
    /// Expression, solver, or configuration failure.
    Error(String),
    /// The problem description was rejected before solving.
    ValidationError(String),
}

impl ResultStatus {
    /// Maps the status of the final solving attempt.
    ///
    /// [`RelaxRunner`](super::RelaxRunner) turns `MODEL_INVALID` into an
    /// engine error before it gets here; the arm keeps the mapping total for
    /// callers that drive their own [`CpSolver`](crate::cp::CpSolver).
    pub fn from_solver(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Optimal => ResultStatus::Optimal,
            SolverStatus::Feasible => ResultStatus::Feasible,
            SolverStatus::Infeasible => ResultStatus::Infeasible,
            SolverStatus::Unknown => ResultStatus::Unknown,
            SolverStatus::ModelInvalid => ResultStatus::Error(status.name().to_string()),
        }
    }

    /// Maps an engine failure to `ERROR` or `VALIDATION_ERROR`.
    pub fn from_error(err: &EngineError) -> Self {
        match err {
            EngineError::Validation(_) => ResultStatus::ValidationError(err.to_string()),
            _ => ResultStatus::Error(err.to_string()),
        }
    }

    pub fn is_solution_found(&self) -> bool {
        matches!(self, ResultStatus::Optimal | ResultStatus::Feasible)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultStatus::Error(_) | ResultStatus::ValidationError(_))
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Optimal => f.write_str("OPTIMAL"),
            ResultStatus::Feasible => f.write_str("FEASIBLE"),
            ResultStatus::Infeasible => f.write_str("INFEASIBLE"),
            ResultStatus::Unknown => f.write_str("UNKNOWN"),
            ResultStatus::Error(detail) => write!(f, "ERROR: {detail}"),
            ResultStatus::ValidationError(detail) => write!(f, "VALIDATION_ERROR: {detail}"),
        }
    }
}

impl Serialize for ResultStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of a relaxation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    /// Terminal status.
    pub status: ResultStatus,

    /// Objective value of the returned assignment. `None` when the problem
    /// has no objective or no assignment was found.
    pub objective_value: Option<f64>,

    /// Value of every declared variable, keyed by name. Empty unless a
    /// solution was found.
    pub solution: BTreeMap<String, i64>,

    /// Solver time summed over all attempts, in seconds.
    pub wall_time: f64,

    /// Labels of the hard constraints and the surviving soft constraints, in
    /// declaration order and priority order respectively. Empty unless a
    /// solution was found.
    pub satisfied_constraints: Vec<String>,

    /// Labels of the dropped soft constraints, in drop order.
    pub dropped_constraints: Vec<String>,

    /// Number of solving attempts made.
    pub attempts: usize,
}

impl SolveResult {
    /// Builds the result of a run that ended in an error. No partial
    /// solution is reported.
    pub fn from_error(err: &EngineError) -> Self {
        Self {
            status: ResultStatus::from_error(err),
            objective_value: None,
            solution: BTreeMap::new(),
            wall_time: 0.0,
            satisfied_constraints: Vec::new(),
            dropped_constraints: Vec::new(),
            attempts: 0,
        }
    }

    /// Builds the result of a completed run from its final attempt.
    pub(crate) fn assemble(problem: &Problem, outcome: &RelaxOutcome<'_>) -> Self {
        let dropped_constraints = outcome
            .dropped
            .iter()
            .map(|c| c.label().to_string())
            .collect();

        let mut result = Self {
            status: ResultStatus::from_solver(outcome.solution.status),
            objective_value: None,
            solution: BTreeMap::new(),
            wall_time: outcome.wall_time,
            satisfied_constraints: Vec::new(),
            dropped_constraints,
            attempts: outcome.attempts,
        };

        if outcome.solution.is_solution_found() {
            result.objective_value = outcome.solution.objective_value;
            result.solution = outcome
                .vars
                .iter()
                .filter_map(|(name, id)| outcome.solution.value(*id).map(|v| (name.clone(), v)))
                .collect();
            result.satisfied_constraints = problem
                .hard_constraints()
                .chain(outcome.active.iter().copied())
                .map(|c| c.label().to_string())
                .collect();
        }

        result
    }

    /// Whether an assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution_found()
    }

    /// Encodes the result as JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
