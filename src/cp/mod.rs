//! Constraint Programming (CP) layer.
//!
//! Provides the solvable model the relaxation loop builds for every attempt:
//! bounded integer variables, linear constraints, and an optional linear
//! objective.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`] with [`VarId`] handles
//! - **Expressions**: [`LinearExpr`], [`LinearConstraint`], [`CmpOp`]
//! - **Model**: [`CpModel`], the container for variables, constraints and the objective
//! - **Solver**: [`CpSolver`] trait, with [`BoundsSolver`] as the built-in
//!   implementation
//!
//! # Design
//!
//! The [`CpSolver`] trait is the seam to the solving engine. [`BoundsSolver`]
//! is an exact branch-and-bound search with bounds propagation, adequate for
//! the small models produced from problem descriptions. External engines can
//! be plugged in by implementing the trait.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod linear;
mod model;
mod search;
mod solver;
mod variables;

pub use linear::{CmpOp, LinearConstraint, LinearExpr};
pub use model::{CpModel, ModelError, Objective};
pub use solver::{
    BoundsSolver, CpSolution, CpSolver, SolverConfig, SolverStatus, DEFAULT_TIME_LIMIT_MS,
};
pub use variables::{IntVar, VarId};
