//! Structural validation of problem descriptions.

use super::types::Problem;
use crate::error::ValidationError;
use crate::expr::is_reserved;
use std::collections::HashSet;

/// Whether `name` is a bare identifier the expression language can refer to:
/// `[A-Za-z_][A-Za-z0-9_]*` and not a reserved word.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_well && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_reserved(name)
}

impl Problem {
    /// Checks bounds and names. Expressions are checked later, when they
    /// are evaluated against a model.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.variables.len());
        for var in &self.variables {
            if var.lower_bound > var.upper_bound {
                return Err(ValidationError::InvalidBounds {
                    name: var.name.clone(),
                    lower: var.lower_bound,
                    upper: var.upper_bound,
                });
            }
            if !is_identifier(&var.name) {
                return Err(ValidationError::InvalidName(var.name.clone()));
            }
            if !seen.insert(var.name.as_str()) {
                return Err(ValidationError::DuplicateName(var.name.clone()));
            }
        }
        Ok(())
    }

    /// Decodes and validates a problem from JSON text.
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let problem: Problem =
            serde_json::from_str(input).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        problem.validate()?;
        Ok(problem)
    }

    /// Decodes and validates a problem from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let problem: Problem =
            serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        problem.validate()?;
        Ok(problem)
    }
}
