use crate::{
    ast::{BinOp, Expr, Literal, Span, Token, UnaryOp},
    error::ParseError,
    lexer::Lexer,
    record::ClassAd,
    time::{AbsTime, RelTime},
};
use std::mem;
use std::str::FromStr;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    current_span: Span,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let (current_token, current_span) = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current_token,
            current_span,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, span) = self.lexer.next_spanned()?;
        self.current_token = token;
        self.current_span = span;
        Ok(())
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.lexer.source(), self.current_span.start, message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.error_here(format!(
                "Expected {:?}, got {:?}",
                expected, self.current_token
            )));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect_name(&mut self, what: &str) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            token => {
                self.current_token = token;
                Err(self.error_here(format!(
                    "Expected {}, got {:?}",
                    what, self.current_token
                )))
            }
        }
    }

    /// Parse primary expressions (atoms): literals, references, calls,
    /// parentheses, records and lists
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Integer(i64::MIN) => {
                self.current_token = Token::Integer(i64::MIN);
                return Err(self.error_here("Integer literal out of range"));
            }
            Token::Integer(n) => {
                self.advance()?;
                Expr::integer(n)
            }
            Token::Real(n) => {
                self.advance()?;
                Expr::real(n)
            }
            Token::String(s) => {
                self.advance()?;
                Expr::string(s)
            }
            Token::Boolean(b) => {
                self.advance()?;
                Expr::boolean(b)
            }
            Token::Undefined => {
                self.advance()?;
                Expr::undefined()
            }
            Token::Error => {
                self.advance()?;
                Expr::error()
            }

            // `name` or `name(args)`
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_sequence(Token::RParen)?;
                    fold_call(name, args)
                } else {
                    Expr::Attribute {
                        name,
                        absolute: false,
                    }
                }
            }

            // `.name` resolves from the outermost record
            Token::Dot => {
                self.advance()?;
                let name = self.expect_name("attribute name after '.'")?;
                Expr::Attribute {
                    name,
                    absolute: true,
                }
            }

            Token::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Expr::Parens(Box::new(inner))
            }

            Token::LBracket => {
                self.advance()?;
                let record = self.parse_record_body()?;
                self.expect(Token::RBracket)?;
                Expr::Record(record)
            }

            Token::LBrace => {
                self.advance()?;
                Expr::List(self.parse_sequence(Token::RBrace)?)
            }

            token => {
                self.current_token = token;
                return Err(self.error_here(format!(
                    "Unexpected token in primary expression: {:?}",
                    self.current_token
                )));
            }
        };
        Ok(expr)
    }

    /// Comma separated expressions up to `close`, which is consumed.
    fn parse_sequence(&mut self, close: Token) -> Result<Vec<Expr>, ParseError> {
        let mut elements = vec![];

        while !self.check(&close) {
            elements.push(self.parse_expression()?);

            if !self.check(&close) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(close)?;
        Ok(elements)
    }

    /// Apply `.name` and `[index]` suffixes to `expr`.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            if self.check(&Token::Dot) {
                self.advance()?;
                let attr = self.expect_name("attribute name after '.'")?;
                expr = Expr::Select {
                    base: Box::new(expr),
                    attr,
                };
            } else if self.check(&Token::LBracket) {
                self.advance()?;
                let index = self.parse_expression()?;
                self.expect(Token::RBracket)?;
                expr = Expr::Subscript {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current_token {
            Token::Minus => UnaryOp::Minus,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
            Token::Tilde => UnaryOp::BitNot,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance()?;

        // A minus directly before a numeric literal is part of the literal,
        // unless the literal carries a suffix.
        if op == UnaryOp::Minus {
            let negated = match self.current_token {
                Token::Integer(n) => Some(Literal::Integer(n.wrapping_neg())),
                Token::Real(n) => Some(Literal::Real(-n)),
                _ => None,
            };
            if let Some(literal) = negated {
                let positive = match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Integer(n) => Literal::Integer(n),
                    Token::Real(n) => Literal::Real(n),
                    _ => unreachable!(),
                };
                self.advance()?;
                if self.check(&Token::Dot) || self.check(&Token::LBracket) {
                    if positive == Literal::Integer(i64::MIN) {
                        return Err(self.error_here("Integer literal out of range"));
                    }
                    let operand = self.parse_postfix(Expr::Literal(positive))?;
                    return Ok(Expr::unary(op, operand));
                }
                return Ok(Expr::Literal(literal));
            }
        }

        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn binary_op(&self) -> Option<BinOp> {
        let op = match &self.current_token {
            Token::OrOr => BinOp::Or,
            Token::AndAnd => BinOp::And,
            Token::Pipe => BinOp::BitOr,
            Token::Caret => BinOp::BitXor,
            Token::Ampersand => BinOp::BitAnd,
            Token::EqEq => BinOp::Equal,
            Token::NotEq => BinOp::NotEqual,
            Token::MetaEq => BinOp::MetaEqual,
            Token::MetaNotEq => BinOp::MetaNotEqual,
            Token::Is => BinOp::Is,
            Token::Isnt => BinOp::Isnt,
            Token::Lt => BinOp::LessThan,
            Token::LtEq => BinOp::LessEqual,
            Token::Gt => BinOp::GreaterThan,
            Token::GtEq => BinOp::GreaterEqual,
            Token::Shl => BinOp::ShiftLeft,
            Token::Shr => BinOp::ShiftRight,
            Token::UShr => BinOp::UnsignedShiftRight,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Subtract,
            Token::Star => BinOp::Multiply,
            Token::Slash => BinOp::Divide,
            Token::Percent => BinOp::Modulo,
            _ => return None,
        };
        Some(op)
    }

    /// Left-associative binary operators binding at least as tight as
    /// `min_precedence`.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(1)?;

        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_conditional()?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional()
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

impl Parser<'_> {
    /// `name = expr` pairs separated by `;`, up to (not including) `]`.
    fn parse_record_body(&mut self) -> Result<ClassAd, ParseError> {
        let mut record = ClassAd::new();

        while !self.check(&Token::RBracket) {
            let name = self.expect_name("attribute name")?;
            self.expect(Token::Assign)?;
            let value = self.parse_expression()?;
            record.insert(name, value);

            if self.check(&Token::Semicolon) {
                self.advance()?;
            } else if !self.check(&Token::RBracket) {
                return Err(self.error_here(format!(
                    "Expected ';' or ']' after attribute, got {:?}",
                    self.current_token
                )));
            }
        }
        Ok(record)
    }

    /// Parse one record and stop on its closing bracket without reading
    /// further. Returns the record and the byte offset just past `]`.
    ///
    /// Whatever follows the record is left untouched, so trailing text that
    /// would not even tokenize does not affect the result.
    pub fn parse_record_prefix(&mut self) -> Result<(ClassAd, usize), ParseError> {
        if !self.check(&Token::LBracket) {
            return Err(self.error_here(format!(
                "Expected '[' to open a ClassAd, got {:?}",
                self.current_token
            )));
        }
        self.advance()?;
        let record = self.parse_record_body()?;
        if !self.check(&Token::RBracket) {
            return Err(self.error_here("Unterminated ClassAd: missing ']'"));
        }
        Ok((record, self.current_span.end))
    }

    /// Parse text that must consist of exactly one record.
    pub fn parse_classad(&mut self) -> Result<ClassAd, ParseError> {
        let (record, _) = self.parse_record_prefix()?;
        self.advance()?;
        self.expect(Token::Eof)?;
        Ok(record)
    }

    /// Parse one `name = expr` line of the long (old) ad form.
    pub fn parse_assignment(&mut self) -> Result<(String, Expr), ParseError> {
        let name = self.expect_name("attribute name")?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok((name, value))
    }
}

/// Calls whose single string argument denotes a constant become literals.
fn fold_call(name: String, args: Vec<Expr>) -> Expr {
    let literal = match args.as_slice() {
        [Expr::Literal(Literal::String(text))] => {
            if name.eq_ignore_ascii_case("absTime") {
                AbsTime::parse(text).map(Literal::AbsTime)
            } else if name.eq_ignore_ascii_case("relTime") {
                RelTime::parse(text).map(Literal::RelTime)
            } else if name.eq_ignore_ascii_case("real") {
                special_real(text).map(Literal::Real)
            } else {
                None
            }
        }
        _ => None,
    };

    match literal {
        Some(literal) => Expr::Literal(literal),
        None => Expr::Call { name, args },
    }
}

fn special_real(text: &str) -> Option<f64> {
    match text.to_ascii_lowercase().as_str() {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    }
}

impl Expr {
    /// Parse a single expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use classad_lang::Expr;
    ///
    /// let a = Expr::parse("2 + 2").unwrap();
    /// let b = Expr::parse("2+2").unwrap();
    /// assert_eq!(a, b);
    /// assert_ne!(a, Expr::parse("2 + 3").unwrap());
    /// ```
    pub fn parse(text: &str) -> Result<Expr, ParseError> {
        Parser::new(Lexer::new(text))?.parse()
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}
