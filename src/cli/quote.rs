//! Convert between raw text and ClassAd string literals

use crate::{quote, Expr, Literal};

use super::CliError;

pub fn execute_quote(raw: &str) -> String {
    quote(raw)
}

/// Decode a double-quoted string literal back to its raw text.
pub fn execute_unquote(literal: &str) -> Result<String, CliError> {
    match Expr::parse(literal)? {
        Expr::Literal(Literal::String(raw)) => Ok(raw),
        other => Err(CliError::NotAString(other.to_string())),
    }
}
