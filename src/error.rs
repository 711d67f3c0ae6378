//! Error types shared by the record model, the parsers and the stream adapter.
//!
//! Five categories exist:
//!
//! - **Parse errors** ([`ParseError`]) carry the byte offset, line and column
//!   of the offending input.
//! - **Key lookup errors** ([`Error::MissingKey`], [`Error::NonStringKey`],
//!   [`Error::EmptyKey`]) come from mapping operations on a
//!   [`ClassAd`](crate::ClassAd).
//! - **Type mismatches** ([`Error::TypeMismatch`]) come from converting an
//!   unsupported external value into an expression.
//! - **Evaluation defects** ([`Error::Eval`]) come from an
//!   [`Evaluate`](crate::Evaluate) engine handed a malformed expression.
//! - **I/O errors** ([`Error::Io`]) come from draining or repositioning a
//!   seekable source.
//!
//! The `Error` and `Undefined` ClassAd values are data, not errors; they are
//! represented by [`Value::Error`](crate::Value::Error) and
//! [`Value::Undefined`](crate::Value::Undefined).

use thiserror::Error;

/// A malformed expression or record.
///
/// Positions are relative to the text handed to the parser that failed.
///
/// # Examples
///
/// ```
/// use classad_lang::ClassAd;
///
/// let err = ClassAd::parse("[a = 1").unwrap_err();
/// assert_eq!(err.line, 1);
/// assert!(err.to_string().contains("line 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Byte offset into the parsed text.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Human readable diagnostic.
    pub message: String,
}

impl ParseError {
    /// Build an error for `offset` within `source`, computing line and column.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        ParseError {
            offset,
            line,
            column,
            message: message.into(),
        }
    }

    /// Re-express the position relative to `source`, given that the failing
    /// text started `base` bytes into it.
    ///
    /// Used when a sub-parser ran on a slice of a larger buffer.
    pub fn relocate(mut self, source: &str, base: usize) -> Self {
        let relocated = ParseError::at(source, base + self.offset, String::new());
        self.offset = relocated.offset;
        self.line = relocated.line;
        self.column = relocated.column;
        self
    }
}

/// Errors produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed record or expression text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `get` or `delete` on an attribute the record does not have.
    #[error("No attribute named {0:?}")]
    MissingKey(String),

    /// A mapping operation was given a key that is not a string.
    #[error("ClassAd keys are strings, got {0}")]
    NonStringKey(&'static str),

    /// Attribute names cannot be empty.
    #[error("Attribute names must not be empty")]
    EmptyKey,

    /// An external value has no ClassAd representation.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// An evaluation engine rejected a malformed expression.
    #[error(transparent)]
    Eval(#[from] crate::eval::EvalDefect),

    /// Reading or repositioning a stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for every key lookup failure.
    pub fn is_key_lookup(&self) -> bool {
        matches!(
            self,
            Error::MissingKey(_) | Error::NonStringKey(_) | Error::EmptyKey
        )
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_on_later_line() {
        let err = ParseError::at("[\n  a = ]", 8, "unexpected ']'");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 7);
    }

    #[test]
    fn test_relocate() {
        let source = "[a=1]\n\n[b=";
        let inner = ParseError::at("[b=", 3, "unexpected end of input");
        let err = inner.relocate(source, 7);
        assert_eq!(err.offset, 10);
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 4);
    }
}
