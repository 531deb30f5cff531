//! Error types for the relaxation engine.

use thiserror::Error;

/// Structural problems detected before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input could not be decoded into a problem description.
    #[error("malformed problem: {0}")]
    Malformed(String),

    /// A variable's lower bound exceeds its upper bound.
    #[error(
        "variable '{name}': lower_bound must be <= upper_bound \
         (got lower_bound={lower}, upper_bound={upper})"
    )]
    InvalidBounds {
        /// Offending variable.
        name: String,
        /// Declared lower bound.
        lower: i64,
        /// Declared upper bound.
        upper: i64,
    },

    /// A variable name is not a bare identifier.
    #[error("invalid variable name: '{0}'")]
    InvalidName(String),

    /// Two variables share a name.
    #[error("duplicate variable name: '{0}'")]
    DuplicateName(String),
}

/// Errors raised while lexing, parsing, or evaluating one expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The expression contains no tokens.
    #[error("empty expression")]
    Empty,

    /// A character outside the grammar.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// An operator the linear grammar does not admit (`/`, `%`, `**`, `and`, ...).
    #[error("unsupported operator '{op}' at offset {offset}")]
    UnsupportedOperator { op: String, offset: usize },

    /// A literal that is not a plain integer (float, boolean, string).
    #[error("only integer literals are supported, got '{literal}'")]
    NonIntegerLiteral { literal: String },

    /// An integer literal or intermediate value outside the `i64` range.
    #[error("integer overflow in '{fragment}'")]
    Overflow { fragment: String },

    /// A name that is not in the variable mapping.
    #[error("unknown variable: '{0}'")]
    UnknownVariable(String),

    /// `f(...)` style calls.
    #[error("function calls are not supported: '{0}(...)'")]
    FunctionCall(String),

    /// `a < b < c`.
    #[error("only single comparisons are supported (e.g. a < b), chained comparisons are not")]
    ChainedComparison,

    /// A comparison used as an arithmetic operand.
    #[error("comparison not allowed inside an arithmetic term: '{0}'")]
    NestedComparison(String),

    /// Variable times variable.
    #[error(
        "non-linear multiplication '{0}': at least one operand must be an integer constant"
    )]
    NonLinear(String),

    /// The token stream does not match the grammar.
    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    /// Parenthesis or unary nesting beyond the parser's depth limit.
    #[error("expression nested too deeply")]
    TooDeep,

    /// A constraint expression that is not a comparison.
    #[error("expected a comparison (e.g. x <= 10), got the term '{0}'")]
    ExpectedComparison(String),

    /// An objective expression that is a comparison.
    #[error("expected a linear term, got the comparison '{0}'")]
    ExpectedTerm(String),
}

/// Top-level engine error.
///
/// Every variant is caught at the solve entry points and turned into a
/// terminal result status; none of them escapes to the caller as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Structural validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A specific expression failed to evaluate.
    #[error("failed to evaluate expression '{expression}': {source}")]
    Expression {
        expression: String,
        #[source]
        source: ExprError,
    },

    /// The solving engine reported an unrecoverable state.
    #[error("solver failure: {0}")]
    Solver(String),

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Wraps an expression error together with the expression text.
    pub fn expression(expression: impl Into<String>, source: ExprError) -> Self {
        EngineError::Expression {
            expression: expression.into(),
            source,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
