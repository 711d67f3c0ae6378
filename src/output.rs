//! Rendering expressions and records back to ClassAd text.
//!
//! Two forms are produced:
//!
//! - **Canonical** via [`Expr::to_canonical_string`] and
//!   [`ClassAd::to_canonical_string`]: one line, `[ a = 1; b = 2 ]`.
//! - **Display** via [`Expr::to_display_string`] and
//!   [`ClassAd::to_display_string`]: records span several lines with one
//!   attribute per line, indented four spaces per nesting level.
//!
//! Both forms parse back to a structurally equal node. Parentheses present
//! in the source are kept as [`Expr::Parens`] nodes; trees built in code get
//! the parentheses their operator precedence requires.
//!
//! # Examples
//!
//! ```
//! use classad_lang::ClassAd;
//!
//! let ad = ClassAd::parse("[a=1;b=[c=\"x\"]]").unwrap();
//! assert_eq!(ad.to_canonical_string(), r#"[ a = 1; b = [ c = "x" ] ]"#);
//! assert_eq!(
//!     ad.to_display_string(),
//!     "[\n    a = 1;\n    b = [\n        c = \"x\"\n    ]\n]"
//! );
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Expr, Literal};
use crate::record::ClassAd;

static PLAIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("attribute name pattern is valid")
});

const KEYWORDS: [&str; 6] = ["true", "false", "undefined", "error", "is", "isnt"];

pub struct Unparser {
    pretty: bool,
}

impl Unparser {
    pub fn new(pretty: bool) -> Self {
        Unparser { pretty }
    }

    pub fn expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr, 0);
        out
    }

    pub fn record(&self, ad: &ClassAd) -> String {
        let mut out = String::new();
        self.write_record(&mut out, ad, 0);
        out
    }

    fn write_expr(&self, out: &mut String, expr: &Expr, indent: usize) {
        match expr {
            Expr::Literal(literal) => write_literal(out, literal),
            Expr::Attribute { name, absolute } => {
                if *absolute {
                    out.push('.');
                }
                out.push_str(&attribute_name(name));
            }
            Expr::Select { base, attr } => {
                self.write_postfix_base(out, base, indent);
                out.push('.');
                out.push_str(&attribute_name(attr));
            }
            Expr::Subscript { base, index } => {
                self.write_postfix_base(out, base, indent);
                out.push('[');
                self.write_expr(out, index, indent);
                out.push(']');
            }
            Expr::Unary { op, operand } => {
                out.push_str(op.symbol());
                let wrap = matches!(**operand, Expr::Binary { .. } | Expr::Conditional { .. });
                self.write_wrapped(out, operand, indent, wrap);
            }
            Expr::Binary { op, left, right } => {
                let precedence = op.precedence();
                self.write_wrapped(out, left, indent, left.binding() < precedence);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                self.write_wrapped(out, right, indent, right.binding() <= precedence);
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let wrap = condition.binding() == 0;
                self.write_wrapped(out, condition, indent, wrap);
                out.push_str(" ? ");
                self.write_expr(out, then, indent);
                out.push_str(" : ");
                self.write_expr(out, otherwise, indent);
            }
            Expr::Call { name, args } => {
                out.push_str(&attribute_name(name));
                out.push('(');
                self.write_items(out, args, indent);
                out.push(')');
            }
            Expr::Parens(inner) => self.write_wrapped(out, inner, indent, true),
            Expr::Record(ad) => self.write_record(out, ad, indent),
            Expr::List(items) => {
                if items.is_empty() {
                    out.push_str("{}");
                } else {
                    out.push_str("{ ");
                    self.write_items(out, items, indent);
                    out.push_str(" }");
                }
            }
        }
    }

    fn write_wrapped(&self, out: &mut String, expr: &Expr, indent: usize, wrap: bool) {
        if wrap {
            out.push('(');
            self.write_expr(out, expr, indent);
            out.push(')');
        } else {
            self.write_expr(out, expr, indent);
        }
    }

    /// `-5.a` would read back as `-(5.a)`, so signed literals and operator
    /// nodes are wrapped before a suffix.
    fn write_postfix_base(&self, out: &mut String, base: &Expr, indent: usize) {
        let wrap = match base {
            Expr::Literal(Literal::Integer(n)) => *n < 0,
            Expr::Literal(Literal::Real(n)) => n.is_sign_negative() && n.is_finite(),
            Expr::Unary { .. } | Expr::Binary { .. } | Expr::Conditional { .. } => true,
            _ => false,
        };
        self.write_wrapped(out, base, indent, wrap);
    }

    fn write_items(&self, out: &mut String, items: &[Expr], indent: usize) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(out, item, indent);
        }
    }

    fn write_record(&self, out: &mut String, ad: &ClassAd, indent: usize) {
        if ad.iter().next().is_none() {
            out.push_str("[]");
            return;
        }

        if self.pretty {
            out.push_str("[\n");
            for (i, (name, expr)) in ad.iter().enumerate() {
                if i > 0 {
                    out.push_str(";\n");
                }
                out.push_str(&self.indent(indent + 1));
                out.push_str(&attribute_name(name));
                out.push_str(" = ");
                self.write_expr(out, expr, indent + 1);
            }
            out.push('\n');
            out.push_str(&self.indent(indent));
            out.push(']');
        } else {
            out.push_str("[ ");
            for (i, (name, expr)) in ad.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(&attribute_name(name));
                out.push_str(" = ");
                self.write_expr(out, expr, indent);
            }
            out.push_str(" ]");
        }
    }

    fn indent(&self, level: usize) -> String {
        "    ".repeat(level)
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Literal::Integer(n) => out.push_str(&n.to_string()),
        Literal::Real(n) => out.push_str(&render_real(*n)),
        Literal::String(s) => out.push_str(&quote(s)),
        Literal::AbsTime(t) => {
            out.push_str("absTime(");
            out.push_str(&quote(&t.to_string()));
            out.push(')');
        }
        Literal::RelTime(t) => {
            out.push_str("relTime(");
            out.push_str(&quote(&t.to_string()));
            out.push(')');
        }
        Literal::Error => out.push_str("error"),
        Literal::Undefined => out.push_str("undefined"),
    }
}

/// Shortest text that reads back as the same `f64`, always recognizable as
/// a real (`1.0`, not `1`).
pub fn render_real(n: f64) -> String {
    if n.is_nan() {
        "real(\"NaN\")".to_string()
    } else if n == f64::INFINITY {
        "real(\"INF\")".to_string()
    } else if n == f64::NEG_INFINITY {
        "real(\"-INF\")".to_string()
    } else {
        // Debug keeps the ".0" that Display drops
        format!("{:?}", n)
    }
}

/// Attribute names that would not lex back as a single identifier are
/// single-quoted.
fn attribute_name(name: &str) -> String {
    let keyword = KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name));
    if PLAIN_NAME.is_match(name) && !keyword {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    escape_into(&mut out, name, '\'');
    out.push('\'');
    out
}

fn escape_into(out: &mut String, raw: &str, delimiter: char) {
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
}

/// Wrap `raw` as a double-quoted ClassAd string literal.
///
/// Parsing the result yields a string equal to `raw`.
///
/// ```
/// use classad_lang::{quote, Expr};
///
/// let text = quote("say \"hi\"\n");
/// assert_eq!(text, r#""say \"hi\"\n""#);
/// assert_eq!(Expr::parse(&text).unwrap(), Expr::string("say \"hi\"\n"));
/// ```
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    escape_into(&mut out, raw, '"');
    out.push('"');
    out
}

impl Expr {
    /// Single-line form.
    pub fn to_canonical_string(&self) -> String {
        Unparser::new(false).expr(self)
    }

    /// Nested records on separate lines.
    pub fn to_display_string(&self) -> String {
        Unparser::new(true).expr(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl ClassAd {
    /// `[ a = 1; b = 2 ]`; the empty record is `[]`.
    pub fn to_canonical_string(&self) -> String {
        Unparser::new(false).record(self)
    }

    pub fn to_display_string(&self) -> String {
        Unparser::new(true).record(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    #[test]
    fn test_precedence_parens_for_built_trees() {
        let sum = Expr::binary(BinOp::Add, Expr::attr("a"), Expr::attr("b"));
        let product = Expr::binary(BinOp::Multiply, sum.clone(), Expr::attr("c"));
        assert_eq!(product.to_string(), "(a + b) * c");

        let right = Expr::binary(BinOp::Subtract, Expr::attr("a"), sum);
        assert_eq!(right.to_string(), "a - (a + b)");
    }

    #[test]
    fn test_odd_names_are_quoted() {
        assert_eq!(attribute_name("Memory"), "Memory");
        assert_eq!(attribute_name("odd name"), "'odd name'");
        assert_eq!(attribute_name("TRUE"), "'TRUE'");
        assert_eq!(attribute_name("it's"), "'it\\'s'");
    }

    #[test]
    fn test_real_forms() {
        assert_eq!(render_real(1.0), "1.0");
        assert_eq!(render_real(-0.5), "-0.5");
        assert_eq!(render_real(f64::NEG_INFINITY), "real(\"-INF\")");
    }

    #[test]
    fn test_quote_octal_escape() {
        assert_eq!(quote("\u{1}\u{7f}"), "\"\\001\\177\"");
    }
}
