//! Recursive-descent parser.
//!
//! ```text
//! comparison := sum [ cmp_op sum ]
//! sum        := product { ("+" | "-") product }
//! product    := unary { "*" unary }
//! unary      := ("+" | "-") unary | atom
//! atom       := INTEGER | IDENT | "(" sum ")"
//! ```

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::ExprError;

/// Maximum nesting of parentheses and prefix operators.
const MAX_DEPTH: usize = 256;

/// Parses `src` into a syntax tree.
///
/// Rejects anything outside the grammar; see [`ExprError`] for the cases.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let mut tokens = tokenize(src)?;
    if tokens.len() == 1 {
        return Err(ExprError::Empty);
    }
    unwrap_comparison(&mut tokens);
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.comparison()?;
    parser.expect(|k| matches!(k, TokenKind::Eof), "end of expression")?;
    Ok(expr)
}

/// Removes parentheses around the whole input when they hold a top-level
/// comparison, so `((x <= 5))` reads as `x <= 5`. A parenthesized
/// comparison inside arithmetic is still rejected by the parser.
fn unwrap_comparison(tokens: &mut Vec<Token>) {
    let eof = tokens.len() - 1;
    let mut layers = 0;
    while layers < MAX_DEPTH && 2 * layers + 2 <= eof && encloses(&tokens[layers..eof - layers]) {
        layers += 1;
    }
    if layers == 0 || !has_outer_comparison(&tokens[layers..eof - layers]) {
        return;
    }
    tokens.drain(eof - layers..eof);
    tokens.drain(..layers);
}

/// Whether `span` opens with `(` whose matching `)` is its last token.
fn encloses(span: &[Token]) -> bool {
    if !matches!(span.first().map(|t| &t.kind), Some(TokenKind::LParen)) {
        return false;
    }
    let mut depth = 0usize;
    for (i, token) in span.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == span.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn has_outer_comparison(span: &[Token]) -> bool {
    let mut depth = 0usize;
    span.iter().any(|token| {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Cmp(_) => return depth == 0,
            _ => {}
        }
        false
    })
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain {
            first: Box::new(first),
            rest,
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let i = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[i].kind
    }

    // Never advances past Eof.
    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &'static str) -> ExprError {
        let token = &self.tokens[self.pos];
        ExprError::UnexpectedToken {
            found: token.kind.describe(),
            expected,
            offset: token.offset,
        }
    }

    fn expect(&mut self, pred: impl Fn(&TokenKind) -> bool, expected: &'static str) -> Result<(), ExprError> {
        if pred(self.peek()) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let left = self.sum()?;
        let TokenKind::Cmp(op) = *self.peek() else {
            return Ok(left);
        };
        self.bump();
        let right = self.sum()?;
        if matches!(self.peek(), TokenKind::Cmp(_)) {
            return Err(ExprError::ChainedComparison);
        }
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn sum(&mut self) -> Result<Expr, ExprError> {
        let first = self.product()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(chain(first, rest)),
            };
            self.bump();
            rest.push((op, self.product()?));
        }
    }

    fn product(&mut self) -> Result<Expr, ExprError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        while matches!(self.peek(), TokenKind::Star) {
            self.bump();
            rest.push((BinaryOp::Mul, self.unary()?));
        }
        Ok(chain(first, rest))
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.atom(),
        };
        self.bump();
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        match self.peek().clone() {
            TokenKind::Int(v) => {
                self.bump();
                Ok(Expr::Int(v))
            }
            TokenKind::Ident(name) => {
                if matches!(self.peek_nth(1), TokenKind::LParen) {
                    return Err(ExprError::FunctionCall(name));
                }
                self.bump();
                Ok(Expr::Name(name))
            }
            TokenKind::LParen => {
                self.bump();
                self.enter()?;
                let inner = self.comparison()?;
                if matches!(inner, Expr::Compare { .. }) {
                    return Err(ExprError::NestedComparison(inner.to_string()));
                }
                self.expect(|k| matches!(k, TokenKind::RParen), "')'")?;
                self.leave();
                Ok(inner)
            }
            _ => Err(self.unexpected("a number, a variable or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::CmpOp;

    #[test]
    fn test_precedence() {
        let expr = parse("a + 2 * b - c").unwrap();
        assert_eq!(expr.to_string(), "a + 2 * b - c");
        let Expr::Chain { first, rest } = expr else {
            panic!("expected chain");
        };
        assert_eq!(*first, Expr::Name("a".into()));
        let ops: Vec<BinaryOp> = rest.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, [BinaryOp::Add, BinaryOp::Sub]);
        assert!(matches!(rest[0].1, Expr::Chain { .. }));
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(parse("2 * (a + b)").unwrap().to_string(), "2 * (a + b)");
        assert_eq!(parse("((x))").unwrap(), Expr::Name("x".into()));
    }

    #[test]
    fn test_comparison() {
        let expr = parse("2 * x + 7 * y <= 50").unwrap();
        assert!(matches!(expr, Expr::Compare { op: CmpOp::Le, .. }));
    }

    #[test]
    fn test_unary_chain() {
        assert_eq!(parse("--x").unwrap().to_string(), "--x");
        assert_eq!(parse("-+3").unwrap().to_string(), "-+3");
    }

    #[test]
    fn test_chained_comparison_rejected() {
        assert_eq!(parse("0 < x < 5"), Err(ExprError::ChainedComparison));
        assert_eq!(parse("a == b == c"), Err(ExprError::ChainedComparison));
    }

    #[test]
    fn test_nested_comparison_rejected() {
        assert_eq!(
            parse("(a < b) + 1"),
            Err(ExprError::NestedComparison("a < b".into()))
        );
    }

    #[test]
    fn test_wrapped_comparison() {
        let bare = parse("x <= 5").unwrap();
        assert_eq!(parse("(x <= 5)").unwrap(), bare);
        assert_eq!(parse(" ( ( x <= 5 ) ) ").unwrap(), bare);
        assert_eq!(parse("((x) <= 5)").unwrap(), bare);
        assert_eq!(parse("(2 * (x + 1) != y)").unwrap().to_string(), "2 * (x + 1) != y");
        // the outer pair does not enclose the whole input
        assert_eq!(
            parse("(a < b) + (c < d)"),
            Err(ExprError::NestedComparison("a < b".into()))
        );
        assert_eq!(parse("(0 < x < 5)"), Err(ExprError::ChainedComparison));
        assert!(parse("(x <= 5").is_err());
    }

    #[test]
    fn test_long_sum_stays_flat() {
        let src = format!("x{} <= 5", " + x".repeat(20_000));
        let Expr::Compare { left, .. } = parse(&src).unwrap() else {
            panic!("expected comparison");
        };
        let Expr::Chain { rest, .. } = *left else {
            panic!("expected chain");
        };
        assert_eq!(rest.len(), 20_000);
    }

    #[test]
    fn test_function_call_rejected() {
        assert_eq!(parse("abs(x) <= 3"), Err(ExprError::FunctionCall("abs".into())));
        assert_eq!(parse("max (x)"), Err(ExprError::FunctionCall("max".into())));
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(""), Err(ExprError::Empty));
        assert_eq!(parse("   "), Err(ExprError::Empty));
    }

    #[test]
    fn test_trailing_and_missing_tokens() {
        assert!(matches!(
            parse("x y"),
            Err(ExprError::UnexpectedToken { offset: 2, .. })
        ));
        assert!(matches!(
            parse("x <="),
            Err(ExprError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse("(x + 1"),
            Err(ExprError::UnexpectedToken { expected: "')'", .. })
        ));
        assert!(matches!(parse(")"), Err(ExprError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&deep), Err(ExprError::TooDeep));
        let negs = format!("{}x", "-".repeat(1000));
        assert_eq!(parse(&negs), Err(ExprError::TooDeep));
        assert!(parse(&format!("{}x{}", "(".repeat(50), ")".repeat(50))).is_ok());
        let wrapped = format!("{}x <= 1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&wrapped), Err(ExprError::TooDeep));
    }
}
