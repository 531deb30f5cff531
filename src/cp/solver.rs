//! CP solver interface and the built-in branch-and-bound solver.

use super::model::CpModel;
use super::search::Search;
use super::variables::VarId;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Proven optimal solution found. Also reported for a satisfaction
    /// model (no objective) once any solution is found.
    Optimal,
    /// Feasible (but not proven optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// No solution found before a limit was reached.
    Unknown,
}

impl SolverStatus {
    /// Upper-case status name as reported in results.
    pub fn name(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::ModelInvalid => "MODEL_INVALID",
            SolverStatus::Unknown => "UNKNOWN",
        }
    }

    /// Whether the status carries an assignment.
    pub fn is_solution_found(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if the model has an objective and a
    /// solution was found).
    pub objective_value: Option<f64>,
    /// Integer variable assignments indexed by [`VarId`]. Empty unless a
    /// solution was found.
    pub values: Vec<i64>,
    /// Solve time in seconds.
    pub wall_time: f64,
    /// Search nodes explored.
    pub nodes: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            wall_time: 0.0,
            nodes: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution_found()
    }

    /// Assigned value of `var`, if a solution was found.
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied()
    }
}

/// Time limit applied when none is configured.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 10_000;

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_relax::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_node_limit(1_000_000);
/// assert!(!config.stop_after_first);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. 0 = no limit. Defaults to
    /// [`DEFAULT_TIME_LIMIT_MS`].
    pub time_limit_ms: u64,
    /// Maximum number of search nodes. 0 = no limit.
    pub node_limit: u64,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            node_limit: 0,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = nodes;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. A call must
/// not keep search state beyond its own return: the relaxation loop hands
/// every attempt a freshly built model.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;

    /// Like [`solve`](CpSolver::solve), but stops early once `cancel` is
    /// set. The default implementation ignores the token.
    fn solve_with_cancel(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        cancel: Option<&AtomicBool>,
    ) -> CpSolution {
        let _ = cancel;
        self.solve(model, config)
    }
}

/// Exact solver for linear integer models.
///
/// Depth-first branch-and-bound: bounds propagation over the linear rows,
/// bisection of the smallest open domain, and an objective cut after every
/// improving solution. Deterministic: the same model always yields the same
/// assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsSolver;

impl BoundsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BoundsSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        self.solve_with_cancel(model, config, None)
    }

    fn solve_with_cancel(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        cancel: Option<&AtomicBool>,
    ) -> CpSolution {
        if let Err(err) = model.validate() {
            tracing::debug!(model = %model.name, %err, "model rejected");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let started = Instant::now();
        let outcome = Search::new(model, config, started, cancel).run();

        CpSolution {
            status: outcome.status,
            objective_value: outcome.objective.map(|v| v as f64),
            values: outcome.values,
            wall_time: started.elapsed().as_secs_f64(),
            nodes: outcome.nodes,
        }
    }
}
