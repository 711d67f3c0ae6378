//! Conversion between records and JSON.
//!
//! JSON has no syntax for ClassAd expressions, so anything that is not a
//! plain constant travels as a string wrapped in `/Expr(` and `)/`:
//!
//! ```json
//! { "Cpus": 4, "Requirements": "/Expr(Memory > 1024)/", "Owner": null }
//! ```
//!
//! `null` is `undefined`. Objects are nested records and arrays are lists.
//! A string literal whose text itself looks like `/Expr(...)/` is written in
//! the wrapped form too (`"/Expr(\"/Expr(1)/\")/"`), so it reads back as a
//! string and not as the expression it spells.

use serde_json::{Map, Number, Value as Json};

use crate::ast::{Expr, Literal};
use crate::error::{Error, Result};
use crate::record::{AttributeMap, ClassAd};
use crate::value::{sealed, IntoExpr};

const EXPR_PREFIX: &str = "/Expr(";
const EXPR_SUFFIX: &str = ")/";

/// Text of an expression embedded in a JSON string, if it is one.
fn embedded_expr(text: &str) -> Option<&str> {
    text.strip_prefix(EXPR_PREFIX)?.strip_suffix(EXPR_SUFFIX)
}

fn json_number(n: &Number) -> Result<Expr> {
    if let Some(i) = n.as_i64() {
        Ok(Expr::integer(i))
    } else if n.is_u64() {
        Err(Error::type_mismatch(format!(
            "JSON number {} does not fit in 64 signed bits",
            n
        )))
    } else {
        n.as_f64()
            .map(Expr::real)
            .ok_or_else(|| Error::type_mismatch(format!("JSON number {} has no ClassAd form", n)))
    }
}

fn json_to_expr(json: &Json) -> Result<Expr> {
    match json {
        Json::Null => Ok(Expr::undefined()),
        Json::Bool(b) => Ok(Expr::boolean(*b)),
        Json::Number(n) => json_number(n),
        Json::String(s) => match embedded_expr(s) {
            Some(text) => Ok(Expr::parse(text)?),
            None => Ok(Expr::string(s.as_str())),
        },
        Json::Array(items) => items
            .iter()
            .map(json_to_expr)
            .collect::<Result<Vec<_>>>()
            .map(Expr::List),
        Json::Object(fields) => {
            let mut ad = ClassAd::new();
            for (name, value) in fields {
                ad.set(name, value)?;
            }
            Ok(Expr::Record(ad))
        }
    }
}

fn wrap_expr(expr: &Expr) -> Json {
    Json::String(format!("{}{}{}", EXPR_PREFIX, expr.to_canonical_string(), EXPR_SUFFIX))
}

fn expr_to_json(expr: &Expr) -> Json {
    match expr {
        Expr::Literal(Literal::Boolean(b)) => Json::Bool(*b),
        Expr::Literal(Literal::Integer(n)) => Json::Number((*n).into()),
        Expr::Literal(Literal::Real(n)) => match Number::from_f64(*n) {
            Some(n) => Json::Number(n),
            None => wrap_expr(expr),
        },
        Expr::Literal(Literal::String(s)) if embedded_expr(s).is_some() => wrap_expr(expr),
        Expr::Literal(Literal::String(s)) => Json::String(s.clone()),
        Expr::Literal(Literal::Undefined) => Json::Null,
        Expr::Record(ad) => ad.to_json(),
        Expr::List(items) => Json::Array(items.iter().map(expr_to_json).collect()),
        other => wrap_expr(other),
    }
}

impl sealed::Sealed for Json {}
impl IntoExpr for Json {
    fn into_expr(self) -> Result<Expr> {
        json_to_expr(&self)
    }
}

impl sealed::Sealed for &Json {}
impl IntoExpr for &Json {
    fn into_expr(self) -> Result<Expr> {
        json_to_expr(self)
    }
}

impl TryFrom<Json> for ClassAd {
    type Error = Error;

    /// Only JSON objects convert.
    fn try_from(json: Json) -> Result<Self> {
        match json {
            Json::Object(_) => ClassAd::from_map(json),
            other => Err(Error::type_mismatch(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

impl ClassAd {
    /// JSON object with the attributes in iteration order.
    ///
    /// ```
    /// use classad_lang::ClassAd;
    ///
    /// let ad = ClassAd::parse("[a = 1; b = a + 1]").unwrap();
    /// assert_eq!(ad.to_json().to_string(), r#"{"a":1,"b":"/Expr(a + 1)/"}"#);
    /// ```
    pub fn to_json(&self) -> Json {
        let fields: Map<String, Json> = self
            .iter()
            .map(|(name, expr)| (name.to_string(), expr_to_json(expr)))
            .collect();
        Json::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_expressions() {
        let ad = ClassAd::try_from(json!({
            "Requirements": "/Expr(Memory > 1024)/",
            "Owner": null,
            "Tags": ["a", 1],
        }))
        .unwrap();
        assert_eq!(
            ad.get("Requirements").unwrap(),
            &Expr::parse("Memory > 1024").unwrap()
        );
        assert_eq!(ad.get("Owner").unwrap(), &Expr::undefined());
        assert_eq!(
            ad.get("Tags").unwrap(),
            &Expr::List(vec![Expr::string("a"), Expr::integer(1)])
        );
    }

    #[test]
    fn test_large_unsigned_is_a_type_mismatch() {
        let err = ClassAd::try_from(json!({ "n": u64::MAX })).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(ClassAd::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_string_spelling_an_expression_stays_a_string() {
        let mut ad = ClassAd::new();
        ad.insert("s", Expr::string("/Expr(1)/"));
        ad.insert("plain", Expr::string("/Expr("));
        let json = ad.to_json();
        assert_eq!(
            json,
            json!({ "s": "/Expr(\"/Expr(1)/\")/", "plain": "/Expr(" })
        );
        assert_eq!(ClassAd::try_from(json).unwrap(), ad);
    }

    #[test]
    fn test_non_finite_real_is_wrapped() {
        let mut ad = ClassAd::new();
        ad.insert("x", Expr::real(f64::INFINITY));
        assert_eq!(ad.to_json(), json!({ "x": "/Expr(real(\"INF\"))/" }));
    }
}
