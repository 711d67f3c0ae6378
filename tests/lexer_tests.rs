// tests/lexer_tests.rs

use classad_lang::ast::Token;
use classad_lang::lexer::Lexer;

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            return out;
        }
        out.push(token);
    }
}

// ============================================================================
// Operators and punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("^", Token::Caret),
        ("~", Token::Tilde),
        ("!", Token::Bang),
        ("|", Token::Pipe),
        ("&", Token::Ampersand),
        ("?", Token::Question),
        (":", Token::Colon),
        (";", Token::Semicolon),
        (",", Token::Comma),
        ("=", Token::Assign),
        ("<", Token::Lt),
        (">", Token::Gt),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (".", Token::Dot),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_multi_char_operators() {
    let test_cases = vec![
        ("||", Token::OrOr),
        ("&&", Token::AndAnd),
        ("==", Token::EqEq),
        ("!=", Token::NotEq),
        ("=?=", Token::MetaEq),
        ("=!=", Token::MetaNotEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("<<", Token::Shl),
        (">>", Token::Shr),
        (">>>", Token::UShr),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokens(input), vec![expected], "Failed for input: {}", input);
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(tokens("42"), vec![Token::Integer(42)]);
    assert_eq!(tokens("0x1F"), vec![Token::Integer(31)]);
    assert_eq!(tokens("2.5"), vec![Token::Real(2.5)]);
    assert_eq!(tokens(".5"), vec![Token::Real(0.5)]);
    assert_eq!(tokens("1e3"), vec![Token::Real(1000.0)]);
    assert_eq!(tokens("1.5E-2"), vec![Token::Real(0.015)]);
}

#[test]
fn test_integer_then_select() {
    assert_eq!(
        tokens("5.a"),
        vec![Token::Integer(5), Token::Dot, Token::Identifier("a".to_string())]
    );
}

#[test]
fn test_integer_overflow() {
    assert_eq!(tokens("9223372036854775808"), vec![Token::Integer(i64::MIN)]);
    assert!(Lexer::new("9223372036854775809").next_token().is_err());
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        tokens(r#""a\"b\\c\n\t\101\/""#),
        vec![Token::String("a\"b\\c\n\tA/".to_string())]
    );
}

#[test]
fn test_bad_escapes() {
    assert!(Lexer::new(r#""\q""#).next_token().is_err());
    assert!(Lexer::new(r#""\777""#).next_token().is_err());
    assert!(Lexer::new(r#""open"#).next_token().is_err());
}

#[test]
fn test_quoted_names() {
    assert_eq!(tokens("'odd name'"), vec![Token::Identifier("odd name".to_string())]);
    assert!(Lexer::new("''").next_token().is_err());
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        tokens("TRUE False UNDEFINED Error IS Isnt"),
        vec![
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Undefined,
            Token::Error,
            Token::Is,
            Token::Isnt,
        ]
    );
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        tokens("a // line\n /* block\n */ b"),
        vec![
            Token::Identifier("a".to_string()),
            Token::Identifier("b".to_string()),
        ]
    );
}

#[test]
fn test_unterminated_comment() {
    let mut lexer = Lexer::new("a /* open");
    lexer.next_token().unwrap();
    assert!(lexer.next_token().is_err());
}

#[test]
fn test_error_position() {
    let mut lexer = Lexer::new("a\n  @");
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 3);
    assert_eq!(err.offset, 4);
}
