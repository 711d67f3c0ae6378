//! CLI support for classad-lang
//!
//! Each subcommand of the `classad` binary is a plain function here taking an
//! options struct, so the commands can be driven from tests and other tools
//! without spawning a process.

mod check;
mod parse;
mod quote;

pub use check::{execute_check, CheckOptions, CheckReport};
pub use parse::{execute_parse, Access, OutputFormat, ParseOptions};
pub use quote::{execute_quote, execute_unquote};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Malformed record text
    #[error(transparent)]
    Parse(#[from] crate::ParseError),

    /// Record operation or conversion failure
    #[error(transparent)]
    ClassAd(#[from] crate::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Pass a file, use --input or pipe ads to stdin.")]
    NoInput,

    /// `unquote` was given something other than a string literal
    #[error("Not a string literal: {0}")]
    NotAString(String),
}
