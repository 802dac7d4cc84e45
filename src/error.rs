//! Compile and evaluation error types.
//!
//! Applicability failures are not represented here: per spec.md §4.4 an
//! unresolvable field during an applicability check folds into `Ok(false)`,
//! not an error.

use std::error::Error;
use std::fmt;

use crate::span::Span;

/// A compile-time failure, always anchored to a byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub span: Span,
    pub msg: ParseErrorMsg,
}
impl ParseError {
    pub fn new(span: Span, msg: ParseErrorMsg) -> Self {
        Self { span, msg }
    }

    /// Renders the error with a 1-indexed line and column, derived by
    /// counting newlines in `source`'s prefix (never by re-lexing).
    pub fn with_location(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{} (line {line}, column {col})", self.msg)
    }
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorMsg {
    UnterminatedField,
    UnterminatedString,
    UnknownToken(String),
    UnbalancedParens,
    DanglingOperator,
    UnhandledReduce,
    UnknownError,
}
impl fmt::Display for ParseErrorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedField => write!(f, "Unterminated field"),
            Self::UnterminatedString => write!(f, "Unterminated string"),
            Self::UnknownToken(text) => write!(f, "Unknown function or token: '{text}'"),
            Self::UnbalancedParens => write!(f, "Unknown error"),
            Self::DanglingOperator => write!(f, "Dangling operator"),
            Self::UnhandledReduce => write!(f, "Unhandled reduce situation"),
            Self::UnknownError => write!(f, "Unknown error"),
        }
    }
}

/// A runtime failure raised while evaluating a compiled formula against
/// concrete records.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub span: Option<Span>,
    pub msg: EvalErrorMsg,
}
impl EvalError {
    pub fn new(msg: EvalErrorMsg) -> Self {
        Self { span: None, msg }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}
impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "column {} to {}: {}", span.start, span.end, self.msg),
            None => write!(f, "{}", self.msg),
        }
    }
}
impl Error for EvalError {}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalErrorMsg {
    /// A field path the caller previously asserted was applicable turned
    /// out not to resolve against this concrete record.
    UnresolvableField(String),
    /// A built-in rejected an argument's type.
    TypeMismatch { func_name: &'static str },
    /// The head of a `Call` node names no built-in.
    UnknownFunction(String),
    /// `SUMIF`'s trailing filter argument isn't a boolean list of the right
    /// length.
    BadFilterShape { func_name: &'static str },
    /// Internal invariant violation; should never be reachable in practice.
    Internal(String),
}
impl fmt::Display for EvalErrorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvableField(path) => write!(f, "Field is unresolvable: '{path}'"),
            Self::TypeMismatch { func_name } => {
                write!(f, "Type mismatch: argument to '{func_name}' is not a number")
            }
            Self::UnknownFunction(name) => write!(f, "Unknown function: '{name}'"),
            Self::BadFilterShape { func_name } => {
                write!(f, "'{func_name}' filter does not match argument count")
            }
            Self::Internal(s) => write!(f, "Internal error: {s}"),
        }
    }
}
