//! CP model definition.

use super::linear::{LinearConstraint, LinearExpr};
use super::variables::{IntVar, VarId};
use thiserror::Error;

/// Objective function for the CP model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Minimize a linear expression.
    Minimize {
        /// Expression to minimize.
        expr: LinearExpr,
    },

    /// Maximize a linear expression.
    Maximize {
        /// Expression to maximize.
        expr: LinearExpr,
    },
}

impl Objective {
    /// The optimized expression.
    pub fn expr(&self) -> &LinearExpr {
        match self {
            Objective::Minimize { expr } | Objective::Maximize { expr } => expr,
        }
    }

    /// Whether larger values are better.
    pub fn is_maximize(&self) -> bool {
        matches!(self, Objective::Maximize { .. })
    }
}

/// Reasons a model is rejected by [`CpModel::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A variable with `min > max`.
    #[error("variable '{name}' has an empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },

    /// A constraint or objective mentions a handle from another model.
    #[error("undefined variable handle {0}")]
    UndefinedVariable(VarId),

    /// An expression whose extreme values leave no headroom for exact
    /// search arithmetic.
    #[error("expression '{0}' can reach values too large to solve exactly")]
    TooLarge(String),
}

/// Largest absolute value any constraint or objective may reach over the
/// variable domains. Keeps every search quantity well inside `i128`.
const MAGNITUDE_LIMIT: i128 = 1 << 120;

/// A constraint programming model over bounded integer variables.
///
/// Contains variables, linear constraints, and an optional objective.
/// A model is built once per solving attempt and then discarded.
///
/// # Examples
///
/// ```
/// use u_relax::cp::{CmpOp, CpModel, LinearConstraint, LinearExpr};
///
/// let mut model = CpModel::new("example");
/// let x = model.new_int_var("x", 0, 10);
/// let c = LinearConstraint::compare(&LinearExpr::var(x), CmpOp::Le, &LinearExpr::constant(5))
///     .unwrap();
/// model.add_constraint(c);
/// model.maximize(LinearExpr::var(x));
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Integer variables, indexed by [`VarId`].
    pub int_vars: Vec<IntVar>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            int_vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a bounded integer variable and returns its handle.
    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> VarId {
        let id = VarId(self.int_vars.len());
        self.int_vars.push(IntVar::new(name, min, max));
        id
    }

    /// Looks up a variable by handle.
    pub fn var(&self, id: VarId) -> Option<&IntVar> {
        self.int_vars.get(id.0)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Convenience: minimize `expr`.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.set_objective(Objective::Minimize { expr });
    }

    /// Convenience: maximize `expr`.
    pub fn maximize(&mut self, expr: LinearExpr) {
        self.set_objective(Objective::Maximize { expr });
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every domain is non-empty, that all referenced handles
    /// belong to this model, and that no expression can overflow the
    /// solver's arithmetic.
    pub fn validate(&self) -> Result<(), ModelError> {
        for var in &self.int_vars {
            if var.min > var.max {
                return Err(ModelError::EmptyDomain {
                    name: var.name.clone(),
                    min: var.min,
                    max: var.max,
                });
            }
        }
        let exprs = self
            .constraints
            .iter()
            .map(|c| &c.expr)
            .chain(self.objective.as_ref().map(Objective::expr));
        for expr in exprs {
            if let Some(id) = expr.vars().find(|id| id.0 >= self.int_vars.len()) {
                return Err(ModelError::UndefinedVariable(id));
            }
            match self.magnitude(expr) {
                Some(m) if m <= MAGNITUDE_LIMIT => {}
                _ => return Err(ModelError::TooLarge(expr.to_string())),
            }
        }
        Ok(())
    }

    /// Upper bound on `|expr|` over the variable domains.
    fn magnitude(&self, expr: &LinearExpr) -> Option<i128> {
        expr.terms()
            .iter()
            .try_fold(expr.constant_term().unsigned_abs() as i128, |acc, &(v, c)| {
                let var = self.int_vars.get(v.0)?;
                let reach = (var.min as i128).abs().max((var.max as i128).abs());
                acc.checked_add((c as i128).abs().checked_mul(reach)?)
            })
    }

    /// Returns the number of integer variables.
    pub fn var_count(&self) -> usize {
        self.int_vars.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::CmpOp;

    fn le(x: VarId, k: i64) -> LinearConstraint {
        LinearConstraint::compare(&LinearExpr::var(x), CmpOp::Le, &LinearExpr::constant(k))
            .unwrap()
    }

    #[test]
    fn test_model_creation() {
        let mut model = CpModel::new("test");
        let a = model.new_int_var("a", 0, 10);
        let b = model.new_int_var("b", 0, 10);
        model.add_constraint(le(a, 5));
        model.minimize(LinearExpr::var(b));

        assert_eq!(model.var_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert_eq!(model.var(b).unwrap().name, "b");
        assert!(!model.objective.as_ref().unwrap().is_maximize());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_handles_are_sequential() {
        let mut model = CpModel::new("test");
        assert_eq!(model.new_int_var("a", 0, 1).index(), 0);
        assert_eq!(model.new_int_var("b", 0, 1).index(), 1);
    }

    #[test]
    fn test_empty_domain_rejected() {
        let mut model = CpModel::new("test");
        model.new_int_var("x", 5, 1);
        assert!(matches!(
            model.validate(),
            Err(ModelError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut other = CpModel::new("other");
        other.new_int_var("a", 0, 1);
        let foreign = other.new_int_var("b", 0, 1);

        let mut model = CpModel::new("test");
        model.new_int_var("x", 0, 1);
        model.add_constraint(le(foreign, 0));
        assert_eq!(
            model.validate(),
            Err(ModelError::UndefinedVariable(foreign))
        );
    }

    #[test]
    fn test_huge_expression_rejected() {
        let mut model = CpModel::new("test");
        let x = model.new_int_var("x", i64::MIN, i64::MAX);
        let y = model.new_int_var("y", i64::MIN, i64::MAX);
        let expr = LinearExpr::from_terms([(x, i64::MAX), (y, i64::MAX)], 0).unwrap();
        model.maximize(expr);
        assert!(matches!(model.validate(), Err(ModelError::TooLarge(_))));
    }

    #[test]
    fn test_undefined_objective_var() {
        let mut model = CpModel::new("test");
        model.maximize(LinearExpr::var(VarId(3)));
        assert!(model.validate().is_err());
    }
}
