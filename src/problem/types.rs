//! Problem description types.

use serde::{Deserialize, Serialize};

/// A bounded integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Bare identifier, unique within the problem.
    pub name: String,
    /// Smallest admissible value.
    pub lower_bound: i64,
    /// Largest admissible value.
    pub upper_bound: i64,
}

impl Variable {
    pub fn new(name: impl Into<String>, lower_bound: i64, upper_bound: i64) -> Self {
        Self {
            name: name.into(),
            lower_bound,
            upper_bound,
        }
    }
}

/// Whether a constraint may be relaxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Must hold in every accepted solution.
    #[default]
    Hard,
    /// A preference that may be dropped, least important first.
    Soft,
}

/// A linear constraint given as expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Comparison such as `dining <= 500`.
    pub expression: String,
    #[serde(default)]
    pub constraint_type: ConstraintType,
    /// Importance among soft constraints; lower is kept longer. Ignored for
    /// hard constraints.
    #[serde(default)]
    pub priority: i64,
    /// Human-readable label.
    #[serde(default)]
    pub description: String,
}

impl Constraint {
    /// A hard constraint.
    pub fn hard(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            constraint_type: ConstraintType::Hard,
            priority: 0,
            description: String::new(),
        }
    }

    /// A soft constraint with the given priority.
    pub fn soft(expression: impl Into<String>, priority: i64) -> Self {
        Self {
            expression: expression.into(),
            constraint_type: ConstraintType::Soft,
            priority,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_soft(&self) -> bool {
        self.constraint_type == ConstraintType::Soft
    }

    /// The description, or the raw expression when no description was given.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.expression
        } else {
            &self.description
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Maximize,
    Minimize,
}

/// Linear objective given as expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub expression: String,
    pub direction: Direction,
}

impl Objective {
    pub fn maximize(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            direction: Direction::Maximize,
        }
    }

    pub fn minimize(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            direction: Direction::Minimize,
        }
    }
}

/// A complete problem description.
///
/// # Examples
///
/// ```
/// use u_relax::problem::{Constraint, Objective, Problem, Variable};
///
/// let problem = Problem::new(vec![Variable::new("savings", 0, 5000)])
///     .with_constraint(Constraint::hard("savings <= 1000"))
///     .with_objective(Objective::maximize("savings"));
/// assert!(problem.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub objective: Option<Objective>,
}

impl Problem {
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn hard_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| !c.is_soft())
    }

    pub fn soft_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_soft())
    }
}
