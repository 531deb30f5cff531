//! Linear integer expressions and comparisons over model variables.

use super::variables::VarId;
use std::fmt;

/// A linear expression `sum(coef * var) + constant`.
///
/// Terms are kept merged by variable and sorted by [`VarId`], with zero
/// coefficients removed, so two equal expressions compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// The constant expression `value`.
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// The expression `1 * var`.
    pub fn var(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1)],
            constant: 0,
        }
    }

    /// Builds an expression from raw terms, merging duplicates.
    ///
    /// Returns `None` on coefficient overflow.
    pub fn from_terms(terms: impl IntoIterator<Item = (VarId, i64)>, constant: i64) -> Option<Self> {
        let mut terms: Vec<(VarId, i64)> = terms.into_iter().collect();
        terms.sort_by_key(|&(v, _)| v);
        let mut merged: Vec<(VarId, i64)> = Vec::with_capacity(terms.len());
        for (v, c) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == v => *acc = acc.checked_add(c)?,
                _ => merged.push((v, c)),
            }
        }
        merged.retain(|&(_, c)| c != 0);
        Some(Self {
            terms: merged,
            constant,
        })
    }

    /// Variable terms, sorted by variable.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// Constant offset.
    pub fn constant_term(&self) -> i64 {
        self.constant
    }

    /// Coefficient of `var`, zero if absent.
    pub fn coefficient(&self, var: VarId) -> i64 {
        self.terms
            .binary_search_by_key(&var, |&(v, _)| v)
            .map(|i| self.terms[i].1)
            .unwrap_or(0)
    }

    /// `self + other`, or `None` on overflow.
    pub fn checked_add(&self, other: &LinearExpr) -> Option<Self> {
        let constant = self.constant.checked_add(other.constant)?;
        Self::from_terms(
            self.terms.iter().chain(other.terms.iter()).copied(),
            constant,
        )
    }

    /// `self - other`, or `None` on overflow.
    pub fn checked_sub(&self, other: &LinearExpr) -> Option<Self> {
        self.checked_add(&other.checked_neg()?)
    }

    /// `-self`, or `None` on overflow.
    pub fn checked_neg(&self) -> Option<Self> {
        self.checked_scale(-1)
    }

    /// `factor * self`, or `None` on overflow.
    pub fn checked_scale(&self, factor: i64) -> Option<Self> {
        let terms = self
            .terms
            .iter()
            .map(|&(v, c)| c.checked_mul(factor).map(|c| (v, c)))
            .collect::<Option<Vec<_>>>()?;
        Self::from_terms(terms, self.constant.checked_mul(factor)?)
    }

    /// Evaluates the expression for a full assignment indexed by [`VarId`].
    /// The sum saturates at the `i128` limits.
    ///
    /// # Panics
    ///
    /// Panics if a term refers to a variable outside `values`.
    pub fn evaluate(&self, values: &[i64]) -> i128 {
        self.terms
            .iter()
            .map(|&(v, c)| c as i128 * values[v.0] as i128)
            .fold(self.constant as i128, i128::saturating_add)
    }

    /// Variables mentioned by the expression.
    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|&(v, _)| v)
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &(v, c) in &self.terms {
            match (first, c) {
                (true, 1) => write!(f, "{v}")?,
                (true, -1) => write!(f, "-{v}")?,
                (true, c) => write!(f, "{c}*{v}")?,
                (false, 1) => write!(f, " + {v}")?,
                (false, -1) => write!(f, " - {v}")?,
                (false, c) if c < 0 => write!(f, " - {}*{v}", c.unsigned_abs())?,
                (false, c) => write!(f, " + {c}*{v}")?,
            }
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant < 0 {
            write!(f, " - {}", self.constant.unsigned_abs())
        } else if self.constant > 0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Le,
    Ge,
    Eq,
    Lt,
    Gt,
    Ne,
}

impl CmpOp {
    /// Source-level spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Ne => "!=",
        }
    }

    /// Applies the operator to two concrete values.
    pub fn holds(self, left: i128, right: i128) -> bool {
        match self {
            CmpOp::Le => left <= right,
            CmpOp::Ge => left >= right,
            CmpOp::Eq => left == right,
            CmpOp::Lt => left < right,
            CmpOp::Gt => left > right,
            CmpOp::Ne => left != right,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A linear constraint `expr <op> 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Left-hand side with the right-hand side already moved over.
    pub expr: LinearExpr,
    /// Comparison against zero.
    pub op: CmpOp,
}

impl LinearConstraint {
    /// Builds `left <op> right` as `(left - right) <op> 0`.
    ///
    /// Returns `None` on overflow.
    pub fn compare(left: &LinearExpr, op: CmpOp, right: &LinearExpr) -> Option<Self> {
        Some(Self {
            expr: left.checked_sub(right)?,
            op,
        })
    }

    /// Whether a full assignment satisfies the constraint.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.op.holds(self.expr.evaluate(values), 0)
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.expr, self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_cancel() {
        let x = VarId(0);
        let y = VarId(1);
        let e = LinearExpr::from_terms([(y, 2), (x, 3), (y, -2)], 4).unwrap();
        assert_eq!(e.terms(), &[(x, 3)]);
        assert_eq!(e.coefficient(y), 0);
        assert_eq!(e.constant_term(), 4);
    }

    #[test]
    fn test_scale_and_add() {
        let x = VarId(0);
        let e = LinearExpr::var(x)
            .checked_scale(3)
            .unwrap()
            .checked_add(&LinearExpr::constant(7))
            .unwrap();
        assert_eq!(e.evaluate(&[2]), 13);
        assert_eq!(e.to_string(), "3*v0 + 7");
    }

    #[test]
    fn test_overflow_detected() {
        let e = LinearExpr::var(VarId(0)).checked_scale(i64::MAX).unwrap();
        assert!(e.checked_scale(2).is_none());
        assert!(LinearExpr::constant(i64::MIN).checked_neg().is_none());
    }

    #[test]
    fn test_constraint_satisfaction() {
        let a = LinearExpr::var(VarId(0));
        let b = LinearExpr::var(VarId(1));
        let sum = a.checked_add(&b).unwrap();
        let c = LinearConstraint::compare(&sum, CmpOp::Le, &LinearExpr::constant(10)).unwrap();
        assert!(c.is_satisfied(&[4, 6]));
        assert!(!c.is_satisfied(&[5, 6]));
        assert_eq!(c.to_string(), "v0 + v1 - 10 <= 0");
    }

    #[test]
    fn test_cmp_ops() {
        assert!(CmpOp::Ne.holds(1, 2));
        assert!(!CmpOp::Lt.holds(2, 2));
        assert!(CmpOp::Ge.holds(2, 2));
        assert_eq!(CmpOp::Eq.symbol(), "==");
    }
}
