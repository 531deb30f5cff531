//! Tree-walking evaluator into linear terms and comparisons.

use super::ast::{BinaryOp, ChainView, Expr, UnaryOp};
use crate::cp::{LinearConstraint, LinearExpr, VarId};
use crate::error::ExprError;
use std::collections::HashMap;

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A known integer.
    Value(i64),
    /// A model variable.
    Var(VarId),
}

/// Name → binding lookup used during evaluation.
pub type Scope = HashMap<String, Binding>;

/// An evaluated arithmetic term.
///
/// `Const` is only produced from literals, constant bindings, and
/// arithmetic over constants. Anything that mentions a variable is
/// `Linear`, even when its coefficients cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Const(i64),
    Linear(LinearExpr),
}

impl Operand {
    /// Widens the operand into a linear expression.
    pub fn into_linear(self) -> LinearExpr {
        match self {
            Operand::Const(v) => LinearExpr::constant(v),
            Operand::Linear(e) => e,
        }
    }
}

/// Result of evaluating a whole expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluated {
    /// An arithmetic term.
    Term(Operand),
    /// A single comparison between two terms.
    Comparison(LinearConstraint),
}

/// Evaluates a parsed expression against `scope`.
///
/// Fails on the first unknown name, non-linear product, or overflow; no
/// partial result is returned.
pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Evaluated, ExprError> {
    match expr {
        Expr::Compare { op, left, right } => {
            let left = term(left, scope)?.into_linear();
            let right = term(right, scope)?.into_linear();
            LinearConstraint::compare(&left, *op, &right)
                .map(Evaluated::Comparison)
                .ok_or_else(|| overflow(expr))
        }
        _ => term(expr, scope).map(Evaluated::Term),
    }
}

fn overflow(expr: &Expr) -> ExprError {
    ExprError::Overflow {
        fragment: expr.to_string(),
    }
}

fn term(expr: &Expr, scope: &Scope) -> Result<Operand, ExprError> {
    match expr {
        Expr::Int(v) => Ok(Operand::Const(*v)),
        Expr::Name(name) => match scope.get(name) {
            Some(Binding::Value(v)) => Ok(Operand::Const(*v)),
            Some(Binding::Var(id)) => Ok(Operand::Linear(LinearExpr::var(*id))),
            None => Err(ExprError::UnknownVariable(name.clone())),
        },
        Expr::Unary { op, operand } => {
            let value = term(operand, scope)?;
            match (op, value) {
                (UnaryOp::Plus, value) => Ok(value),
                (UnaryOp::Neg, Operand::Const(v)) => {
                    v.checked_neg().map(Operand::Const).ok_or_else(|| overflow(expr))
                }
                (UnaryOp::Neg, Operand::Linear(e)) => {
                    e.checked_neg().map(Operand::Linear).ok_or_else(|| overflow(expr))
                }
            }
        }
        Expr::Chain { first, rest } => {
            let mut acc = term(first, scope)?;
            for (k, (op, operand)) in rest.iter().enumerate() {
                let value = term(operand, scope)?;
                acc = binary(*op, acc, value, || {
                    ChainView { first, rest: &rest[..=k] }.to_string()
                })?;
            }
            Ok(acc)
        }
        Expr::Compare { .. } => Err(ExprError::NestedComparison(expr.to_string())),
    }
}

/// Applies `op`; `fragment` renders the source text for an error.
fn binary(
    op: BinaryOp,
    left: Operand,
    right: Operand,
    fragment: impl FnOnce() -> String,
) -> Result<Operand, ExprError> {
    use Operand::{Const, Linear};

    let result = match (op, left, right) {
        (BinaryOp::Add, Const(a), Const(b)) => a.checked_add(b).map(Const),
        (BinaryOp::Sub, Const(a), Const(b)) => a.checked_sub(b).map(Const),
        (BinaryOp::Mul, Const(a), Const(b)) => a.checked_mul(b).map(Const),
        (BinaryOp::Mul, Const(k), Linear(e)) | (BinaryOp::Mul, Linear(e), Const(k)) => {
            e.checked_scale(k).map(Linear)
        }
        (BinaryOp::Mul, Linear(_), Linear(_)) => {
            return Err(ExprError::NonLinear(fragment()));
        }
        (BinaryOp::Add, a, b) => a.into_linear().checked_add(&b.into_linear()).map(Linear),
        (BinaryOp::Sub, a, b) => a.into_linear().checked_sub(&b.into_linear()).map(Linear),
    };
    result.ok_or_else(|| ExprError::Overflow {
        fragment: fragment(),
    })
}
