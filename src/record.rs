//! The ClassAd record: an ordered mapping from attribute names to
//! expressions.
//!
//! Attribute names are matched without regard to ASCII case; the spelling
//! used by the first assignment is the one reported by [`keys`] and used when
//! rendering. Iteration follows first-assignment order and replacing an
//! attribute keeps its position.
//!
//! The mapping operations live on the [`AttributeMap`] trait. Implementors
//! provide five primitives and get the rest (`get`, `set`, `delete`, `pop`,
//! `update`, ...) for free.
//!
//! ```
//! use classad_lang::{AttributeMap, ClassAd, Expr};
//!
//! let mut ad = ClassAd::new();
//! ad.set("Cpus", 4).unwrap();
//! ad.set("Memory", 2048).unwrap();
//! ad.set("cpus", 8).unwrap();
//!
//! assert_eq!(ad.keys(), vec!["Cpus", "Memory"]);
//! assert_eq!(ad.get("CPUS").unwrap(), &Expr::integer(8));
//! ```
//!
//! [`keys`]: AttributeMap::keys

use std::fmt;
use std::str::FromStr;

use crate::ast::Expr;
use crate::error::{Error, ParseError, Result};
use crate::eval::Evaluate;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{IntoExpr, Value};

/// Something usable as an attribute name.
///
/// Strings always are. Dynamically typed values are only when they hold a
/// string; anything else is a key lookup error rather than a silent miss.
pub trait AsKey {
    fn as_key(&self) -> Result<&str>;
}

impl AsKey for str {
    fn as_key(&self) -> Result<&str> {
        Ok(self)
    }
}

impl AsKey for String {
    fn as_key(&self) -> Result<&str> {
        Ok(self)
    }
}

impl AsKey for Value {
    fn as_key(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::NonStringKey(other.type_name())),
        }
    }
}

impl AsKey for serde_json::Value {
    fn as_key(&self) -> Result<&str> {
        use serde_json::Value as Json;
        match self {
            Json::String(s) => Ok(s),
            Json::Null => Err(Error::NonStringKey("null")),
            Json::Bool(_) => Err(Error::NonStringKey("boolean")),
            Json::Number(_) => Err(Error::NonStringKey("number")),
            Json::Array(_) => Err(Error::NonStringKey("array")),
            Json::Object(_) => Err(Error::NonStringKey("object")),
        }
    }
}

impl<T: AsKey + ?Sized> AsKey for &T {
    fn as_key(&self) -> Result<&str> {
        (**self).as_key()
    }
}

/// Mapping protocol over attribute names.
///
/// The first five methods are the primitives; every other method is
/// written in terms of them.
pub trait AttributeMap {
    /// The expression bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<&Expr>;

    /// Bind `name`, replacing in place when it is already bound. Returns the
    /// previous expression.
    fn insert_expr(&mut self, name: &str, expr: Expr) -> Option<Expr>;

    /// Unbind `name`, returning its expression.
    fn remove_expr(&mut self, name: &str) -> Option<Expr>;

    /// Number of attributes.
    fn len(&self) -> usize;

    /// Attribute names in iteration order, copied at call time.
    fn keys(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with a key lookup error when `key` is absent or not a string.
    fn get<K: AsKey + ?Sized>(&self, key: &K) -> Result<&Expr> {
        let name = key.as_key()?;
        self.lookup(name)
            .ok_or_else(|| Error::MissingKey(name.to_string()))
    }

    /// Total variant of [`get`](Self::get): `None` for absent or
    /// non-string keys.
    fn try_get<K: AsKey + ?Sized>(&self, key: &K) -> Option<&Expr> {
        key.as_key().ok().and_then(|name| self.lookup(name))
    }

    fn contains_key<K: AsKey + ?Sized>(&self, key: &K) -> bool {
        self.try_get(key).is_some()
    }

    /// Convert `value` and insert or replace it.
    ///
    /// Mappings are copied into nested records at this point.
    fn set<K: AsKey + ?Sized, V: IntoExpr>(&mut self, key: &K, value: V) -> Result<()> {
        let name = key.as_key()?;
        if name.is_empty() {
            return Err(Error::EmptyKey);
        }
        let expr = value.into_expr()?;
        self.insert_expr(name, expr);
        Ok(())
    }

    /// Fails with a key lookup error when `key` is absent or not a string.
    fn delete<K: AsKey + ?Sized>(&mut self, key: &K) -> Result<()> {
        self.pop(key).map(|_| ())
    }

    /// Remove and return the expression bound to `key`.
    fn pop<K: AsKey + ?Sized>(&mut self, key: &K) -> Result<Expr> {
        let name = key.as_key()?;
        self.remove_expr(name)
            .ok_or_else(|| Error::MissingKey(name.to_string()))
    }

    /// Bind `key` to `default` unless it is already bound, then return the
    /// bound expression.
    fn set_default<K: AsKey + ?Sized, V: IntoExpr>(&mut self, key: &K, default: V) -> Result<&Expr> {
        let name = key.as_key()?;
        if self.lookup(name).is_none() {
            self.set(name, default)?;
        }
        self.lookup(name)
            .ok_or_else(|| Error::MissingKey(name.to_string()))
    }

    /// Copy every attribute of `other` into `self`. Existing names are
    /// overwritten in place, new names are appended in `other`'s order.
    fn update<M: AttributeMap + ?Sized>(&mut self, other: &M) {
        for name in other.keys() {
            if let Some(expr) = other.lookup(&name) {
                self.insert_expr(&name, expr.clone());
            }
        }
    }

    /// `(name, expression)` pairs in iteration order, copied at call time.
    fn items(&self) -> Vec<(String, Expr)> {
        self.keys()
            .into_iter()
            .filter_map(|name| {
                let expr = self.lookup(&name)?.clone();
                Some((name, expr))
            })
            .collect()
    }

    fn clear(&mut self) {
        for name in self.keys() {
            self.remove_expr(&name);
        }
    }
}

/// A ClassAd: attribute names bound to unevaluated expressions.
///
/// Equality is structural and ignores attribute order.
#[derive(Debug, Clone, Default)]
pub struct ClassAd {
    attrs: Vec<(String, Expr)>,
}

impl ClassAd {
    pub fn new() -> Self {
        ClassAd { attrs: Vec::new() }
    }

    /// Build a record from `(name, value)` pairs, converting each value.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use classad_lang::{AttributeMap, ClassAd};
    ///
    /// let mut words = BTreeMap::new();
    /// words.insert("a", 7);
    /// words.insert("b", 8);
    /// let ad = ClassAd::from_map(&words).unwrap();
    /// assert_eq!(ad.len(), 2);
    /// ```
    pub fn from_map<M: IntoExpr>(map: M) -> Result<ClassAd> {
        match map.into_expr()? {
            Expr::Record(ad) => Ok(ad),
            other => Err(Error::type_mismatch(format!(
                "expected a mapping, got {}",
                other
            ))),
        }
    }

    /// Parse text denoting exactly one record.
    ///
    /// Empty text, a bracketed list such as `[ 7, 8, 9 ]` and trailing input
    /// after the closing bracket are all rejected.
    pub fn parse(text: &str) -> std::result::Result<ClassAd, ParseError> {
        Parser::new(Lexer::new(text))?.parse_classad()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attrs
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// Bind `name` to an already built expression.
    pub fn insert(&mut self, name: impl Into<String>, expr: Expr) -> Option<Expr> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.attrs[i].1, expr)),
            None => {
                self.attrs.push((name, expr));
                None
            }
        }
    }

    /// Borrowing iterator in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.attrs.iter().map(|(name, expr)| (name.as_str(), expr))
    }

    /// Read an attribute as a [`Value`]: literals, records and lists are
    /// converted, other expressions come back as [`Value::Expression`].
    pub fn get_value<K: AsKey + ?Sized>(&self, key: &K) -> Result<Value> {
        self.get(key).map(Value::from_expr)
    }

    /// Hand one attribute to an evaluation engine, optionally against a
    /// target record.
    pub fn evaluate_attr<K, E>(&self, key: &K, engine: &E, target: Option<&ClassAd>) -> Result<Value>
    where
        K: AsKey + ?Sized,
        E: Evaluate + ?Sized,
    {
        let expr = self.get(key)?;
        Ok(engine.evaluate(expr, self, target)?)
    }
}

impl AttributeMap for ClassAd {
    fn lookup(&self, name: &str) -> Option<&Expr> {
        self.position(name).map(|i| &self.attrs[i].1)
    }

    fn insert_expr(&mut self, name: &str, expr: Expr) -> Option<Expr> {
        self.insert(name, expr)
    }

    fn remove_expr(&mut self, name: &str) -> Option<Expr> {
        let i = self.position(name)?;
        Some(self.attrs.remove(i).1)
    }

    fn len(&self) -> usize {
        self.attrs.len()
    }

    fn keys(&self) -> Vec<String> {
        self.attrs.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl PartialEq for ClassAd {
    fn eq(&self, other: &Self) -> bool {
        self.attrs.len() == other.attrs.len()
            && self
                .attrs
                .iter()
                .all(|(name, expr)| other.lookup(name) == Some(expr))
    }
}

impl FromStr for ClassAd {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ClassAd::parse(s)
    }
}

impl FromIterator<(String, Expr)> for ClassAd {
    fn from_iter<I: IntoIterator<Item = (String, Expr)>>(iter: I) -> Self {
        let mut ad = ClassAd::new();
        for (name, expr) in iter {
            ad.insert(name, expr);
        }
        ad
    }
}

impl<'a> IntoIterator for &'a ClassAd {
    type Item = (&'a str, &'a Expr);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Expr)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for ClassAd {
    /// Multi-line display form; see [`ClassAd::to_canonical_string`] for
    /// the single-line form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_position_and_spelling() {
        let mut ad = ClassAd::new();
        ad.insert("Alpha", Expr::integer(1));
        ad.insert("beta", Expr::integer(2));
        ad.insert("ALPHA", Expr::integer(3));
        assert_eq!(ad.keys(), vec!["Alpha", "beta"]);
        assert_eq!(ad.lookup("alpha"), Some(&Expr::integer(3)));
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = ClassAd::new();
        a.insert("x", Expr::integer(1));
        a.insert("y", Expr::integer(2));
        let mut b = ClassAd::new();
        b.insert("y", Expr::integer(2));
        b.insert("X", Expr::integer(1));
        assert_eq!(a, b);
        b.insert("z", Expr::integer(3));
        assert_ne!(a, b);
    }
}
