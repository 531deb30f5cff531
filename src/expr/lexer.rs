//! Tokenizer for the expression language.
//!
//! Operators outside the linear grammar are recognized here only so they can
//! be rejected with a precise message.

use crate::cp::CmpOp;
use crate::error::ExprError;
use std::iter::Peekable;
use std::str::CharIndices;

/// Keywords that look like names but denote booleans or nothing.
const LITERAL_KEYWORDS: &[&str] = &["true", "false", "True", "False", "None"];

/// Logical and control keywords the language does not admit.
const OPERATOR_KEYWORDS: &[&str] = &["and", "or", "not", "in", "is", "if", "else", "lambda"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TokenKind {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    LParen,
    RParen,
    Cmp(CmpOp),
    Eof,
}

impl TokenKind {
    pub(super) fn describe(&self) -> String {
        match self {
            TokenKind::Int(v) => format!("number {v}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Cmp(op) => format!("'{op}'"),
            TokenKind::Eof => "end of expression".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Token {
    pub kind: TokenKind,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Whether `name` is reserved and can never be a variable name.
pub fn is_reserved(name: &str) -> bool {
    LITERAL_KEYWORDS.contains(&name) || OPERATOR_KEYWORDS.contains(&name)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `pred` holds and returns the covered slice.
    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let mut end = self.src.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                end = i;
                break;
            }
            self.chars.next();
        }
        &self.src[start..end]
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        let text = self.take_while(start, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        let well_formed = text.chars().all(|c| c.is_ascii_digit() || c == '_')
            && !text.ends_with('_')
            && !text.contains("__");
        if !well_formed {
            return Err(ExprError::NonIntegerLiteral {
                literal: text.to_string(),
            });
        }
        text.replace('_', "")
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| ExprError::Overflow {
                fragment: text.to_string(),
            })
    }

    fn word(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        let text = self.take_while(start, is_ident_continue);
        if LITERAL_KEYWORDS.contains(&text) {
            return Err(ExprError::NonIntegerLiteral {
                literal: text.to_string(),
            });
        }
        if OPERATOR_KEYWORDS.contains(&text) {
            return Err(ExprError::UnsupportedOperator {
                op: text.to_string(),
                offset: start,
            });
        }
        Ok(TokenKind::Ident(text.to_string()))
    }

    fn string(&mut self, start: usize, quote: char) -> ExprError {
        let mut end = self.src.len();
        while let Some((i, c)) = self.chars.next() {
            if c == quote {
                end = i + c.len_utf8();
                break;
            }
        }
        ExprError::NonIntegerLiteral {
            literal: self.src[start..end].to_string(),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ExprError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
        let Some((offset, c)) = self.chars.next() else {
            return Ok(None);
        };
        let unsupported = |op: &str| ExprError::UnsupportedOperator {
            op: op.to_string(),
            offset,
        };

        let kind = match c {
            '0'..='9' => self.number(offset)?,
            '.' if self.peek_char().is_some_and(|n| n.is_ascii_digit()) => {
                let text = self.take_while(offset, |c| c.is_ascii_alphanumeric() || c == '.');
                return Err(ExprError::NonIntegerLiteral {
                    literal: text.to_string(),
                });
            }
            c if is_ident_start(c) => self.word(offset)?,
            '"' | '\'' => return Err(self.string(offset, c)),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' if self.bump_if('*') => return Err(unsupported("**")),
            '*' => TokenKind::Star,
            '/' if self.bump_if('/') => return Err(unsupported("//")),
            '/' | '%' | '@' | '&' | '|' | '^' | '~' => return Err(unsupported(&c.to_string())),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '<' if self.bump_if('=') => TokenKind::Cmp(CmpOp::Le),
            '<' if self.bump_if('<') => return Err(unsupported("<<")),
            '<' => TokenKind::Cmp(CmpOp::Lt),
            '>' if self.bump_if('=') => TokenKind::Cmp(CmpOp::Ge),
            '>' if self.bump_if('>') => return Err(unsupported(">>")),
            '>' => TokenKind::Cmp(CmpOp::Gt),
            '=' if self.bump_if('=') => TokenKind::Cmp(CmpOp::Eq),
            '=' => return Err(unsupported("=")),
            '!' if self.bump_if('=') => TokenKind::Cmp(CmpOp::Ne),
            ch => return Err(ExprError::UnexpectedChar { ch, offset }),
        };
        Ok(Some(Token { kind, offset }))
    }
}

/// Splits `src` into tokens, ending with [`TokenKind::Eof`].
pub(super) fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut lexer = Lexer {
        src,
        chars: src.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}
