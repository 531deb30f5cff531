//! CP variable types.

use std::fmt;

/// Handle to an integer variable inside one [`CpModel`](super::CpModel).
///
/// Handles are indices into the model's variable table. They are only
/// meaningful for the model that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in its model.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An integer variable with a domain [min, max].
///
/// Represents a decision variable that takes integer values within
/// the specified bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    /// Variable name (unique identifier within a model).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether the domain holds a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1). Zero for an empty domain.
    pub fn domain_size(&self) -> i128 {
        (self.max as i128 - self.min as i128 + 1).max(0)
    }
}
