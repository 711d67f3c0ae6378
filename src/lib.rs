pub mod ast;
pub mod convert;
pub mod error;
pub mod eval;
pub mod incremental;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod record;
pub mod stream;
pub mod time;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Literal, Token, UnaryOp};
pub use error::{Error, ParseError, Result};
pub use eval::{EvalDefect, Evaluate, LiteralEvaluator};
pub use incremental::{parse_next, ParserMode};
pub use lexer::Lexer;
pub use output::{quote, Unparser};
pub use parser::Parser;
pub use record::{AsKey, AttributeMap, ClassAd};
pub use stream::{parse_ads, parse_next_ad, parse_one, read_ads, read_next, read_one, AdCursor, Ads, ReadAds};
pub use time::{AbsTime, RelTime};
pub use value::{IntoExpr, Value};
