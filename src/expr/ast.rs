//! Syntax tree of the restricted expression language.

use crate::cp::CmpOp;
use std::fmt;

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

/// Arithmetic operator. Division, modulo and power are not part of the
/// language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul => 2,
        }
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Variable reference.
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Left-associative run of operators of one precedence level, such as
    /// `a + b - c` or `2 * x * 3`. Stored flat so long sums stay shallow.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
    /// A single, non-chained comparison. Only valid at the top level.
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Compare { .. } => 0,
            Expr::Chain { first, rest } => match rest.first() {
                Some((op, _)) => op.precedence(),
                None => first.precedence(),
            },
            Expr::Unary { .. } => 3,
            Expr::Int(_) | Expr::Name(_) => 4,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Name(name) => f.write_str(name),
            Expr::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                })?;
                operand.fmt_child(f, operand.precedence() < 3)
            }
            Expr::Chain { first, rest } => write!(f, "{}", ChainView { first, rest }),
            Expr::Compare { op, left, right } => {
                left.fmt_child(f, left.precedence() == 0)?;
                write!(f, " {op} ")?;
                right.fmt_child(f, right.precedence() == 0)
            }
        }
    }
}

/// Borrowed view of a chain or of its leading operators, used to render
/// error fragments.
pub(crate) struct ChainView<'a> {
    pub first: &'a Expr,
    pub rest: &'a [(BinaryOp, Expr)],
}

impl fmt::Display for ChainView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((lead, _)) = self.rest.first() else {
            return write!(f, "{}", self.first);
        };
        let p = lead.precedence();
        self.first.fmt_child(f, self.first.precedence() < p)?;
        for (op, operand) in self.rest {
            write!(f, " {} ", op.symbol())?;
            // a - (b + c) keeps its parentheses
            let parens = if *op == BinaryOp::Sub {
                operand.precedence() <= p
            } else {
                operand.precedence() < p
            };
            operand.fmt_child(f, parens)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Box<Expr> {
        Box::new(Expr::Name(n.into()))
    }

    #[test]
    fn test_display_keeps_grouping() {
        let sum = Expr::Chain {
            first: name("a"),
            rest: vec![(BinaryOp::Add, Expr::Name("b".into()))],
        };
        let product = Expr::Chain {
            first: Box::new(Expr::Int(2)),
            rest: vec![(BinaryOp::Mul, sum.clone())],
        };
        assert_eq!(product.to_string(), "2 * (a + b)");

        let diff = Expr::Chain {
            first: name("c"),
            rest: vec![(BinaryOp::Sub, sum.clone()), (BinaryOp::Add, Expr::Int(1))],
        };
        assert_eq!(diff.to_string(), "c - (a + b) + 1");

        let leading = Expr::Chain {
            first: Box::new(sum),
            rest: vec![(BinaryOp::Sub, Expr::Name("c".into()))],
        };
        assert_eq!(leading.to_string(), "a + b - c");
    }

    #[test]
    fn test_display_long_chain() {
        let rest = (0..20_000).map(|_| (BinaryOp::Add, Expr::Name("x".into()))).collect();
        let chain = Expr::Chain { first: name("x"), rest };
        let text = chain.to_string();
        assert_eq!(text.matches('x').count(), 20_001);
        assert!(text.starts_with("x + x"));
    }

    #[test]
    fn test_display_comparison() {
        let cmp = Expr::Compare {
            op: CmpOp::Le,
            left: Box::new(Expr::Unary {
                op: UnaryOp::Neg,
                operand: name("x"),
            }),
            right: Box::new(Expr::Int(10)),
        };
        assert_eq!(cmp.to_string(), "-x <= 10");
    }
}
