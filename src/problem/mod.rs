//! Problem descriptions.
//!
//! A [`Problem`] is the declarative input of the engine: bounded integer
//! [`Variable`]s, hard and soft [`Constraint`]s given as expression text, and
//! an optional [`Objective`]. It deserializes from the JSON shape
//!
//! ```json
//! {
//!   "variables":   [{"name": "x", "lower_bound": 0, "upper_bound": 10}],
//!   "constraints": [{"expression": "x >= 3", "constraint_type": "soft",
//!                    "priority": 1, "description": "at least three"}],
//!   "objective":   {"expression": "x", "direction": "minimize"}
//! }
//! ```
//!
//! `constraint_type`, `priority`, and `description` default to `"hard"`,
//! `0`, and `""`; `objective` may be omitted or `null`.

mod types;
mod validate;

pub use types::{Constraint, ConstraintType, Direction, Objective, Problem, Variable};
pub use validate::is_identifier;
