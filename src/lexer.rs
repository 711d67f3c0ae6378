use crate::ast::{Span, Token};
use crate::error::ParseError;

/// Tokenizer for the ClassAd expression language.
///
/// Positions are byte offsets into the input so that callers can slice the
/// source at token boundaries.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn source(&self) -> &'a str {
        self.input
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::at(self.input, offset, message)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.position;
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => {
                                return Err(self.error(start, "Unterminated comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.position]
    }

    /// Read a quoted string or quoted attribute name, decoding escapes.
    fn read_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some(d) if d.is_digit(8) => {
                            result.push(self.read_octal_escape(escape_at)?);
                            continue;
                        }
                        Some(other) => {
                            return Err(self.error(
                                escape_at,
                                format!("Invalid escape sequence: \\{}", other),
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(start, "Unterminated string: missing closing quote"))
    }

    /// Up to three octal digits naming an ASCII character.
    fn read_octal_escape(&mut self, escape_at: usize) -> Result<char, ParseError> {
        let mut code = 0u32;
        let mut digits = 0;
        while digits < 3 {
            match self.current_char().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    code = code * 8 + d;
                    digits += 1;
                    self.advance();
                }
                None => break,
            }
        }
        if code > 0x7f {
            return Err(self.error(escape_at, "Octal escape outside the ASCII range"));
        }
        char::from_u32(code).ok_or_else(|| self.error(escape_at, "Invalid octal escape"))
    }

    /// Numbers are lexed without sign. The one magnitude that only fits as a
    /// negative i64, 9223372036854775808, comes back as `i64::MIN`; the
    /// parser accepts it only directly after a unary minus.
    fn read_number(&mut self) -> Result<Token, ParseError> {
        let start = self.position;

        if self.current_char() == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let digits_start = self.position;
            while self.current_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.input[digits_start..self.position];
            return u64::from_str_radix(digits, 16)
                .ok()
                .and_then(|n| i64::try_from(n).ok())
                .map(Token::Integer)
                .ok_or_else(|| self.error(start, "Invalid hexadecimal literal"));
        }

        let mut is_real = false;
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_real = true;
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            let exponent_digit = match self.peek_char(1) {
                Some('+' | '-') => self.peek_char(2),
                other => other,
            };
            if exponent_digit.is_some_and(|c| c.is_ascii_digit()) {
                is_real = true;
                self.advance();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = &self.input[start..self.position];
        if is_real {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|_| self.error(start, format!("Invalid real literal '{}'", text)))
        } else {
            match text.parse::<u64>() {
                Ok(n) if n <= i64::MAX as u64 => Ok(Token::Integer(n as i64)),
                Ok(n) if n == i64::MIN.unsigned_abs() => Ok(Token::Integer(i64::MIN)),
                _ => Err(self.error(start, format!("Integer literal '{}' out of range", text))),
            }
        }
    }

    /// Consume `second` if it is the next character.
    fn pair(&mut self, second: char, matched: Token, single: Token) -> Token {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            matched
        } else {
            single
        }
    }

    /// Next token together with its byte span.
    pub fn next_spanned(&mut self) -> Result<(Token, Span), ParseError> {
        self.skip_trivia()?;
        let start = self.position;
        let token = self.read_token()?;
        Ok((
            token,
            Span {
                start,
                end: self.position,
            },
        ))
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.next_spanned().map(|(token, _)| token)
    }

    fn read_token(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let token = match self.current_char() {
            None => Token::Eof,
            Some('+') => {
                self.advance();
                Token::Plus
            }
            Some('-') => {
                self.advance();
                Token::Minus
            }
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some('/') => {
                self.advance();
                Token::Slash
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some('^') => {
                self.advance();
                Token::Caret
            }
            Some('~') => {
                self.advance();
                Token::Tilde
            }
            Some('?') => {
                self.advance();
                Token::Question
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some(';') => {
                self.advance();
                Token::Semicolon
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('|') => self.pair('|', Token::OrOr, Token::Pipe),
            Some('&') => self.pair('&', Token::AndAnd, Token::Ampersand),
            Some('!') => self.pair('=', Token::NotEq, Token::Bang),
            Some('=') => match (self.peek_char(1), self.peek_char(2)) {
                (Some('='), _) => {
                    self.advance();
                    self.advance();
                    Token::EqEq
                }
                (Some('?'), Some('=')) => {
                    self.advance();
                    self.advance();
                    self.advance();
                    Token::MetaEq
                }
                (Some('!'), Some('=')) => {
                    self.advance();
                    self.advance();
                    self.advance();
                    Token::MetaNotEq
                }
                _ => {
                    self.advance();
                    Token::Assign
                }
            },
            Some('<') => match self.peek_char(1) {
                Some('<') => {
                    self.advance();
                    self.advance();
                    Token::Shl
                }
                Some('=') => {
                    self.advance();
                    self.advance();
                    Token::LtEq
                }
                _ => {
                    self.advance();
                    Token::Lt
                }
            },
            Some('>') => match (self.peek_char(1), self.peek_char(2)) {
                (Some('>'), Some('>')) => {
                    self.advance();
                    self.advance();
                    self.advance();
                    Token::UShr
                }
                (Some('>'), _) => {
                    self.advance();
                    self.advance();
                    Token::Shr
                }
                (Some('='), _) => {
                    self.advance();
                    self.advance();
                    Token::GtEq
                }
                _ => {
                    self.advance();
                    Token::Gt
                }
            },
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('{') => {
                self.advance();
                Token::LBrace
            }
            Some('}') => {
                self.advance();
                Token::RBrace
            }
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some('.') => {
                self.advance();
                Token::Dot
            }
            Some('"') => Token::String(self.read_quoted('"')?),
            Some('\'') => {
                let name = self.read_quoted('\'')?;
                if name.is_empty() {
                    return Err(self.error(start, "Empty attribute name"));
                }
                Token::Identifier(name)
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.to_ascii_lowercase().as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "undefined" => Token::Undefined,
                    "error" => Token::Error,
                    "is" => Token::Is,
                    "isnt" => Token::Isnt,
                    _ => Token::Identifier(ident.to_string()),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(self.error(start, format!("Unexpected character '{}'", ch)));
            }
        };
        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true FALSE Undefined error is isnt");
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Undefined);
    assert_eq!(lexer.next_token().unwrap(), Token::Error);
    assert_eq!(lexer.next_token().unwrap(), Token::Is);
    assert_eq!(lexer.next_token().unwrap(), Token::Isnt);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_record() {
    let mut lexer = Lexer::new("[a = 1; b = TARGET.x >= 2.5]");
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Assign);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(1));
    assert_eq!(lexer.next_token().unwrap(), Token::Semicolon);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("b".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Assign);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("TARGET".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Dot);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("x".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Real(2.5));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
}

#[test]
fn test_spans_are_byte_offsets() {
    let mut lexer = Lexer::new("  \"é\" ]");
    let (token, span) = lexer.next_spanned().unwrap();
    assert_eq!(token, Token::String("é".to_string()));
    assert_eq!(span, Span { start: 2, end: 6 });
    let (token, span) = lexer.next_spanned().unwrap();
    assert_eq!(token, Token::RBracket);
    assert_eq!(span, Span { start: 7, end: 8 });
}
