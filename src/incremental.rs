//! Extracting one record at a time from a buffer holding several.
//!
//! [`parse_next`] reads the first record of a buffer and reports how many
//! bytes it used, so the caller can continue on the remainder. Three textual
//! forms are understood, selected by [`ParserMode`]:
//!
//! - **New**: `[ a = 1; b = 2 ]`
//! - **Long**: one `a = 1` per line; a blank line or the end of the input
//!   closes the record. Lines starting with `#` are comments.
//! - **Json**: one JSON object per record
//!
//! Records are separated by whitespace, typically a blank line.

use std::fmt;
use std::str::FromStr;

use serde_json::Deserializer;
use tracing::trace;

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::record::ClassAd;

/// Which textual form to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ParserMode {
    /// Decide per record from its first character: `[` or `/` selects New,
    /// `{` selects Json, anything else Long.
    #[default]
    Auto,
    New,
    Long,
    Json,
}

impl ParserMode {
    /// The concrete mode for a record starting at `first`.
    fn resolve(self, first: char) -> ParserMode {
        match self {
            ParserMode::Auto => match first {
                '[' | '/' => ParserMode::New,
                '{' => ParserMode::Json,
                _ => ParserMode::Long,
            },
            mode => mode,
        }
    }
}

impl fmt::Display for ParserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserMode::Auto => "auto",
            ParserMode::New => "new",
            ParserMode::Long => "long",
            ParserMode::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ParserMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ParserMode::Auto),
            "new" => Ok(ParserMode::New),
            "long" | "old" => Ok(ParserMode::Long),
            "json" => Ok(ParserMode::Json),
            other => Err(format!(
                "Unknown parser mode '{}' (expected auto, new, long or json)",
                other
            )),
        }
    }
}

/// Parse the first record in `buffer`.
///
/// Returns the record and the number of bytes consumed, which covers the
/// separators before the record, the record itself and the whitespace after
/// it. `(None, 0)` means the buffer holds nothing but whitespace and
/// comments. Malformed text is always an error.
///
/// ```
/// use classad_lang::{parse_next, AttributeMap, ParserMode};
///
/// let text = "[a = 1]\n\n[b = 2]";
/// let (ad, used) = parse_next(text, ParserMode::Auto).unwrap();
/// assert_eq!(ad.unwrap().keys(), vec!["a"]);
/// assert_eq!(&text[used..], "[b = 2]");
///
/// assert_eq!(parse_next("  \n", ParserMode::Auto).unwrap(), (None, 0));
/// assert!(parse_next("[a = 1", ParserMode::Auto).is_err());
/// ```
pub fn parse_next(buffer: &str, mode: ParserMode) -> Result<(Option<ClassAd>, usize), ParseError> {
    let start = skip_separators(buffer)?;
    let rest = &buffer[start..];
    let Some(first) = rest.chars().next() else {
        return Ok((None, 0));
    };

    let resolved = mode.resolve(first);
    trace!(%mode, %resolved, offset = start, "parsing next ad");

    let (ad, len) = match resolved {
        ParserMode::Long => parse_long(rest),
        ParserMode::Json => parse_json(rest),
        _ => parse_new(rest),
    }
    .map_err(|e| e.relocate(buffer, start))?;

    let end = start + len;
    let trailing = buffer[end..].len() - buffer[end..].trim_start().len();
    Ok((Some(ad), end + trailing))
}

/// Length of the whitespace, comments and `#` lines at the front of `text`.
fn skip_separators(text: &str) -> Result<usize, ParseError> {
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.starts_with("//") || trimmed.starts_with('#') {
            pos += trimmed.find('\n').unwrap_or(trimmed.len());
        } else if let Some(body) = trimmed.strip_prefix("/*") {
            match body.find("*/") {
                Some(close) => pos += 2 + close + 2,
                None => return Err(ParseError::at(text, pos, "Unterminated comment")),
            }
        } else {
            return Ok(pos);
        }
    }
}

fn parse_new(text: &str) -> Result<(ClassAd, usize), ParseError> {
    Parser::new(Lexer::new(text))?.parse_record_prefix()
}

/// Attribute lines up to the first blank line.
fn parse_long(text: &str) -> Result<(ClassAd, usize), ParseError> {
    let mut ad = ClassAd::new();
    let mut end = 0;

    for line in text.split_inclusive('\n') {
        let content = line.trim();
        if content.is_empty() {
            break;
        }
        if !content.starts_with('#') && !content.starts_with("//") {
            let (name, expr) = Parser::new(Lexer::new(line))
                .and_then(|mut parser| parser.parse_assignment())
                .map_err(|e| e.relocate(text, end))?;
            ad.insert(name, expr);
        }
        end += line.len();
    }
    Ok((ad, end))
}

/// One JSON object; whatever follows it is left alone.
fn parse_json(text: &str) -> Result<(ClassAd, usize), ParseError> {
    let mut stream = Deserializer::from_str(text).into_iter::<serde_json::Value>();
    let json = match stream.next() {
        Some(Ok(json)) => json,
        Some(Err(e)) => {
            return Err(ParseError::at(
                text,
                stream.byte_offset(),
                format!("Invalid JSON ad: {}", e),
            ));
        }
        None => return Err(ParseError::at(text, 0, "Expected a JSON object")),
    };
    let end = stream.byte_offset();
    let ad = ClassAd::try_from(json).map_err(|e| ParseError::at(text, 0, e.to_string()))?;
    Ok((ad, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AttributeMap;

    #[test]
    fn test_comments_only_is_empty() {
        assert_eq!(
            parse_next("  // note\n/* block */\n# hash\n", ParserMode::Auto).unwrap(),
            (None, 0)
        );
    }

    #[test]
    fn test_unterminated_leading_comment() {
        assert!(parse_next("/* never closed", ParserMode::Auto).is_err());
    }

    #[test]
    fn test_long_form_stops_at_blank_line() {
        let text = "a = 1\n# skipped\nb = \"two\"\n\nc = 3\n";
        let (ad, used) = parse_next(text, ParserMode::Auto).unwrap();
        let ad = ad.unwrap();
        assert_eq!(ad.keys(), vec!["a", "b"]);
        assert_eq!(&text[used..], "c = 3\n");
    }

    #[test]
    fn test_long_form_error_position() {
        let text = "a = 1\nb = = 2\n";
        let err = parse_next(text, ParserMode::Long).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_json_object() {
        let text = "{\"a\": 1}\n\n{\"b\": 2}";
        let (ad, used) = parse_next(text, ParserMode::Auto).unwrap();
        assert_eq!(ad.unwrap().keys(), vec!["a"]);
        assert_eq!(&text[used..], "{\"b\": 2}");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("LONG".parse::<ParserMode>(), Ok(ParserMode::Long));
        assert_eq!(ParserMode::Json.to_string(), "json");
        assert!("xml".parse::<ParserMode>().is_err());
    }
}
