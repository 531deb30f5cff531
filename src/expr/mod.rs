//! Restricted expression language.
//!
//! Caller-supplied constraint and objective text is parsed by a dedicated
//! recursive-descent parser over a closed grammar: integer literals, names,
//! unary `+`/`-`, binary `+`, `-`, `*`, and at most one comparison
//! (`<=`, `>=`, `==`, `<`, `>`, `!=`). Everything else is rejected while
//! lexing or parsing. The evaluator then folds the tree into a
//! [`LinearExpr`] or a [`LinearConstraint`], refusing variable × variable
//! products.
//!
//! # Examples
//!
//! ```
//! use u_relax::cp::CpModel;
//! use u_relax::expr::{self, Binding, Scope};
//!
//! let mut model = CpModel::new("demo");
//! let mut scope = Scope::new();
//! scope.insert("x".into(), Binding::Var(model.new_int_var("x", 0, 10)));
//!
//! let c = expr::comparison("2 * x + 1 <= 9", &scope).unwrap();
//! assert_eq!(c.to_string(), "2*v0 - 8 <= 0");
//!
//! assert!(expr::comparison("x / 2 <= 1", &scope).is_err());
//! assert!(expr::comparison("x * x <= 1", &scope).is_err());
//! ```

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::{evaluate, Binding, Evaluated, Operand, Scope};
pub use lexer::is_reserved;
pub use parser::parse;

use crate::cp::{LinearConstraint, LinearExpr};
use crate::error::ExprError;

/// Parses and evaluates `src` in one step.
pub fn evaluate_str(src: &str, scope: &Scope) -> Result<Evaluated, ExprError> {
    evaluate(&parse(src)?, scope)
}

/// Evaluates a constraint expression, which must be a comparison.
pub fn comparison(src: &str, scope: &Scope) -> Result<LinearConstraint, ExprError> {
    match evaluate_str(src, scope)? {
        Evaluated::Comparison(c) => Ok(c),
        Evaluated::Term(_) => Err(ExprError::ExpectedComparison(src.trim().to_string())),
    }
}

/// Evaluates an objective expression, which must be a plain term.
pub fn linear_term(src: &str, scope: &Scope) -> Result<LinearExpr, ExprError> {
    match evaluate_str(src, scope)? {
        Evaluated::Term(t) => Ok(t.into_linear()),
        Evaluated::Comparison(_) => Err(ExprError::ExpectedTerm(src.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::VarId;
    use proptest::prelude::*;

    fn scope() -> Scope {
        let mut scope = Scope::new();
        scope.insert("savings".into(), Binding::Var(VarId(0)));
        scope
    }

    #[test]
    fn test_comparison_required() {
        assert_eq!(
            comparison("savings + 1", &scope()),
            Err(ExprError::ExpectedComparison("savings + 1".into()))
        );
    }

    #[test]
    fn test_term_required() {
        assert_eq!(
            linear_term(" savings >= 3 ", &scope()),
            Err(ExprError::ExpectedTerm("savings >= 3".into()))
        );
        assert_eq!(
            linear_term("savings", &scope()),
            Ok(LinearExpr::var(VarId(0)))
        );
        assert_eq!(linear_term("42", &scope()), Ok(LinearExpr::constant(42)));
    }

    #[test]
    fn test_rejection_laws() {
        for src in [
            "savings / 2 <= 1",
            "savings % 2 == 0",
            "savings ** 2 <= 4",
            "savings * savings <= 4",
            "0 <= savings <= 4",
            "savings <= 1.5",
            "savings == True",
        ] {
            assert!(comparison(src, &scope()).is_err(), "{src} should be rejected");
        }
    }

    proptest! {
        #[test]
        fn prop_forbidden_operators_rejected(
            op in prop::sample::select(vec!["/", "//", "%", "**", "&", "|", "^", "<<", ">>", "and", "or", "@"]),
            lhs in prop::sample::select(vec!["savings", "3", "(savings + 1)"]),
            rhs in prop::sample::select(vec!["savings", "2", "(1 - savings)"]),
            bound in -100i64..100,
        ) {
            let src = format!("{lhs} {op} {rhs} <= {bound}");
            prop_assert!(comparison(&src, &scope()).is_err(), "{}", src);
        }

        #[test]
        fn prop_constants_fold_exactly(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
            let src = format!("({a}) * ({b}) - ({c}) + ({b})");
            prop_assert_eq!(
                evaluate_str(&src, &scope()),
                Ok(Evaluated::Term(Operand::Const(a * b - c + b)))
            );
        }
    }
}
