//! Priority-driven constraint relaxation.
//!
//! A [`RelaxRunner`] solves a [`Problem`](crate::problem::Problem) with all
//! of its constraints first. While the attempt fails, the active soft
//! constraint with the highest priority value is dropped and a fresh model
//! is built by [`ModelBuilder`] from the remaining set. Hard constraints are
//! never dropped.
//!
//! # Examples
//!
//! ```
//! use u_relax::problem::{Constraint, Problem, Variable};
//! use u_relax::relax::{RelaxConfig, RelaxRunner, ResultStatus};
//!
//! let problem = Problem::new(vec![Variable::new("a", 0, 10), Variable::new("b", 0, 10)])
//!     .with_constraint(Constraint::hard("a + b <= 10"))
//!     .with_constraint(Constraint::soft("a >= 8", 0))
//!     .with_constraint(Constraint::soft("b >= 8", 1));
//!
//! let result = RelaxRunner::run(&problem, &RelaxConfig::default());
//! assert_eq!(result.status, ResultStatus::Optimal);
//! assert_eq!(result.dropped_constraints, ["b >= 8"]);
//! ```

mod builder;
mod config;
mod result;
mod runner;
mod worker;

pub use builder::{BuiltModel, ModelBuilder};
pub use config::RelaxConfig;
pub use result::{ResultStatus, SolveResult};
pub use runner::{RelaxOutcome, RelaxRunner};
pub use worker::{solve_batch, solve_with_deadline};
