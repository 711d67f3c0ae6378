//! Validate a stream of ads without printing them

use crate::{parse_ads, AttributeMap, ParserMode};

use super::CliError;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Text holding one or more records
    pub input: String,
    pub mode: ParserMode,
}

/// What a successful check found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub ads: usize,
    pub attributes: usize,
}

/// Parse every record, stopping at the first malformed one.
pub fn execute_check(options: &CheckOptions) -> Result<CheckReport, CliError> {
    let mut report = CheckReport { ads: 0, attributes: 0 };
    for ad in parse_ads(&options.input, options.mode) {
        let ad = ad?;
        report.ads += 1;
        report.attributes += ad.len();
    }
    Ok(report)
}
