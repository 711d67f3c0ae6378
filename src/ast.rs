//! # ClassAd Expression Language - Abstract Syntax Tree
//!
//! The attribute values of a ClassAd are expressions. This module defines
//! the tree those expressions parse into.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, operations,
//!   records, lists)
//! - **[operators]** - Unary and binary operators with their precedence
//!
//! ## Quick Start
//!
//! ```text
//! [ Cpus = 4; Memory = 2048; Requirements = TARGET.Memory >= Memory ]
//! ```
//!
//! A record is a bracketed, `;`-separated list of `name = expression`
//! assignments. Each expression is stored unevaluated.
//!
//! ## Precedence
//!
//! From loosest to tightest:
//!
//! ```text
//! ?:
//! ||
//! &&
//! |
//! ^
//! &
//! == != =?= =!= is isnt
//! < <= > >=
//! << >> >>>
//! + -
//! * / %
//! unary - + ! ~
//! a.b  a[i]  f(x)
//! ```
//!
//! ## Literal Folding
//!
//! A few call forms denote constants and parse straight into literals:
//!
//! ```text
//! absTime("2024-06-01 10:00:00+00:00")
//! relTime("1+02:03:04")
//! real("INF")
//! -5
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::{Span, Token};
pub use expressions::{Expr, Literal};
pub use operators::{BinOp, UnaryOp};
