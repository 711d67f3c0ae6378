// tests/cli_tests.rs

#![cfg(feature = "cli")]

use classad_lang::cli::{
    execute_check, execute_parse, execute_quote, execute_unquote, Access, CheckOptions, CheckReport,
    CliError, OutputFormat, ParseOptions,
};
use classad_lang::ParserMode;
use pretty_assertions::assert_eq;

const ADS: &str = "[a = 1; b = \"x\"]\n\n[a = 2; c = a + 1]\n";

fn parse_with(access: Access, format: OutputFormat) -> String {
    execute_parse(&ParseOptions {
        input: ADS.to_string(),
        mode: ParserMode::Auto,
        access,
        format,
    })
    .unwrap()
}

#[test]
fn test_parse_all_canonical() {
    assert_eq!(
        parse_with(Access::All, OutputFormat::Canonical),
        "[ a = 1; b = \"x\" ]\n[ a = 2; c = a + 1 ]"
    );
}

#[test]
fn test_parse_one_display() {
    assert_eq!(
        parse_with(Access::One, OutputFormat::Display),
        "[\n    a = 2;\n    b = \"x\";\n    c = a + 1\n]"
    );
}

#[test]
fn test_parse_next_json() {
    assert_eq!(
        parse_with(Access::Next, OutputFormat::Json),
        "{\n  \"a\": 1,\n  \"b\": \"x\"\n}"
    );
}

#[test]
fn test_parse_all_json_is_an_array() {
    let output = parse_with(Access::All, OutputFormat::Json);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[1]["c"], "/Expr(a + 1)/");
}

#[test]
fn test_parse_error() {
    let result = execute_parse(&ParseOptions {
        input: "[a = ".to_string(),
        ..ParseOptions::default()
    });
    assert!(matches!(result, Err(CliError::Parse(_))));
}

#[test]
fn test_check() {
    let report = execute_check(&CheckOptions {
        input: ADS.to_string(),
        mode: ParserMode::New,
    })
    .unwrap();
    assert_eq!(report, CheckReport { ads: 2, attributes: 4 });

    let err = execute_check(&CheckOptions {
        input: "Cpus = 4\n".to_string(),
        mode: ParserMode::New,
    })
    .unwrap_err();
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn test_quote_and_unquote() {
    let quoted = execute_quote("a \"b\"\n");
    assert_eq!(quoted, "\"a \\\"b\\\"\\n\"");
    assert_eq!(execute_unquote(&quoted).unwrap(), "a \"b\"\n");
    assert!(matches!(execute_unquote("1 + 2"), Err(CliError::NotAString(_))));
}
