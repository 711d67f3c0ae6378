#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal, decimal or hexadecimal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0x2A
    /// ```
    Integer(i64),

    /// Real literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e-3
    /// 6.02E23
    /// ```
    Real(f64),

    /// String literal enclosed in double quotes, escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "tab\there"
    /// ```
    String(String),

    /// Boolean keywords (case-insensitive)
    ///
    /// # Examples
    /// ```text
    /// true
    /// FALSE
    /// ```
    Boolean(bool),

    /// The `undefined` keyword
    Undefined,

    /// The `error` keyword
    Error,

    // Identifiers
    /// Attribute name
    ///
    /// Either a plain identifier (letter or underscore, then letters, digits,
    /// underscores) or any text enclosed in single quotes.
    ///
    /// # Examples
    /// ```text
    /// Memory
    /// _internal
    /// 'name with spaces'
    /// ```
    Identifier(String),

    // Logical
    /// `||`
    OrOr,
    /// `&&`
    AndAnd,
    /// `!`
    Bang,

    // Bitwise
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `&`
    Ampersand,
    /// `~`
    Tilde,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,

    // Comparison
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `=?=` (identical to, never undefined)
    MetaEq,
    /// `=!=` (not identical to)
    MetaNotEq,
    /// `is` keyword, same meaning as `=?=`
    Is,
    /// `isnt` keyword, same meaning as `=!=`
    Isnt,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,

    // Conditional
    /// `?`
    Question,
    /// `:`
    Colon,

    // Delimiters
    /// `=` separating an attribute name from its expression
    Assign,
    /// `;` separating attributes inside a record
    Semicolon,
    /// Left bracket, opens a record or a subscript
    LBracket,
    /// Right bracket
    RBracket,
    /// Left brace, opens a list
    LBrace,
    /// Right brace
    RBrace,
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Dot for attribute selection (`a.b`) or absolute references (`.b`)
    Dot,
    /// Comma between list elements and call arguments
    Comma,

    /// End of input
    Eof,
}

/// Byte range of a token within the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}
