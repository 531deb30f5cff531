//! Relaxation configuration.

use crate::cp::SolverConfig;

/// Configuration for a relaxation run.
///
/// The limits apply to each solving attempt separately; a run performs at
/// most `n + 1` attempts for `n` soft constraints. By default each attempt
/// is capped at [`DEFAULT_TIME_LIMIT_MS`](crate::cp::DEFAULT_TIME_LIMIT_MS)
/// and ends `UNKNOWN` when the cap is hit.
///
/// # Examples
///
/// ```
/// use u_relax::relax::RelaxConfig;
///
/// let config = RelaxConfig::default()
///     .with_time_limit_ms(2_000)
///     .with_node_limit(500_000);
/// assert_eq!(config.solver.time_limit_ms, 2_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaxConfig {
    /// Limits handed to the solver on every attempt.
    pub solver: SolverConfig,
}

impl RelaxConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.solver.time_limit_ms = ms;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.solver.node_limit = nodes;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.solver.stop_after_first = stop;
        self
    }
}
