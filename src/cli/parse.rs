//! Parse ads and print them back in a chosen form

use crate::{parse_ads, parse_next_ad, parse_one, ClassAd, ParserMode};

use super::CliError;

/// Which records of the input to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Access {
    /// Every record
    #[default]
    All,
    /// All records merged into one
    One,
    /// Only the first record
    Next,
}

/// How to print records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Multi-line, indented
    #[default]
    Display,
    /// One line per record
    Canonical,
    /// JSON objects, expressions as "/Expr(...)/" strings
    Json,
}

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Text holding one or more records
    pub input: String,
    pub mode: ParserMode,
    pub access: Access,
    pub format: OutputFormat,
}

fn render(ads: &[ClassAd], format: OutputFormat) -> Result<String, CliError> {
    let text = match format {
        OutputFormat::Display => ads
            .iter()
            .map(ClassAd::to_display_string)
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Canonical => ads
            .iter()
            .map(ClassAd::to_canonical_string)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let objects: Vec<_> = ads.iter().map(ClassAd::to_json).collect();
            match objects.as_slice() {
                [single] => serde_json::to_string_pretty(single)?,
                _ => serde_json::to_string_pretty(&objects)?,
            }
        }
    };
    Ok(text)
}

/// Parse the input and render the selected records.
///
/// `Next` with no record in the input renders an empty document.
pub fn execute_parse(options: &ParseOptions) -> Result<String, CliError> {
    let ads = match options.access {
        Access::All => parse_ads(&options.input, options.mode).collect::<Result<Vec<_>, _>>()?,
        Access::One => vec![parse_one(&options.input, options.mode)?],
        Access::Next => {
            let mut input = options.input.as_str();
            parse_next_ad(&mut input, options.mode)?.into_iter().collect()
        }
    };
    render(&ads, options.format)
}
