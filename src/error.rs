//! Error types for scanning, parsing, and compiling a query.
//!
//! `matches()` on a compiled filter tree never returns a `Result`: a
//! compiled filter applied to any host object is total (see the
//! invariants in the data model). Errors only occur while turning query
//! text into a filter tree.

use thiserror::Error;

/// Errors raised while scanning or parsing query text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty query")]
    EmptyQuery,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string literal starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid escape sequence '\\{ch}' at position {pos}")]
    InvalidEscape { ch: char, pos: usize },

    #[error("invalid hex escape at position {pos}, expected two hex digits")]
    InvalidHexEscape { pos: usize },

    #[error("malformed numeric literal at position {pos}")]
    MalformedNumber { pos: usize },

    #[error("nested list literals are not supported (at position {pos})")]
    NestedList { pos: usize },

    #[error("expected {expected} at position {pos}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("trailing tokens after a complete query, starting at position {pos}")]
    TrailingTokens { pos: usize },
}

/// Errors raised while resolving a parse tree against a
/// [`crate::filter_impl::FilterImplementation`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid number of operands for {operator}: expected {expected}, got {got}")]
    InvalidNumberOfOperands {
        operator: String,
        expected: String,
        got: usize,
    },

    #[error("invalid regular expression '{pattern}': {message}")]
    BadRegex { pattern: String, message: String },
}

/// Top-level error covering the whole `query text -> filter tree` pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}
