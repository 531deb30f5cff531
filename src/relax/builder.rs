//! Translation of a problem plus an active soft set into a solvable model.

use crate::cp::{CpModel, VarId};
use crate::error::{EngineError, ValidationError};
use crate::expr::{self, Binding, Scope};
use crate::problem::{is_identifier, Constraint, Direction, Problem};

/// A freshly built model and the handles of the declared variables.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: CpModel,
    /// Declared variables and their handles, in declaration order.
    pub vars: Vec<(String, VarId)>,
}

/// Builds one [`CpModel`] per solving attempt.
pub struct ModelBuilder;

impl ModelBuilder {
    /// Builds a model with every hard constraint, the given active soft
    /// constraints, and the objective.
    ///
    /// Nothing is shared with earlier builds: variables, handles and
    /// evaluated constraints are all created anew.
    pub fn build(problem: &Problem, active_soft: &[&Constraint]) -> Result<BuiltModel, EngineError> {
        let mut model = CpModel::new("relaxation_attempt");
        let mut scope = Scope::with_capacity(problem.variables.len());
        let mut vars = Vec::with_capacity(problem.variables.len());

        for var in &problem.variables {
            if !is_identifier(&var.name) {
                return Err(ValidationError::InvalidName(var.name.clone()).into());
            }
            if scope.contains_key(&var.name) {
                return Err(ValidationError::DuplicateName(var.name.clone()).into());
            }
            let id = model.new_int_var(var.name.as_str(), var.lower_bound, var.upper_bound);
            scope.insert(var.name.clone(), Binding::Var(id));
            vars.push((var.name.clone(), id));
        }

        for constraint in problem.hard_constraints().chain(active_soft.iter().copied()) {
            let evaluated = expr::comparison(&constraint.expression, &scope)
                .map_err(|e| EngineError::expression(&constraint.expression, e))?;
            model.add_constraint(evaluated);
        }

        if let Some(objective) = &problem.objective {
            let evaluated = expr::linear_term(&objective.expression, &scope)
                .map_err(|e| EngineError::expression(&objective.expression, e))?;
            match objective.direction {
                Direction::Maximize => model.maximize(evaluated),
                Direction::Minimize => model.minimize(evaluated),
            }
        }

        Ok(BuiltModel { model, vars })
    }
}
