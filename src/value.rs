use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use chrono::{DateTime, NaiveDateTime, TimeZone};

use crate::ast::{Expr, Literal};
use crate::error::{Error, Result};
use crate::output::render_real;
use crate::record::{AsKey, AttributeMap, ClassAd};
use crate::time::{AbsTime, RelTime};

/// A value a ClassAd attribute can hold.
///
/// `Error` and `Undefined` are ordinary values: an expression that
/// produces one of them has been evaluated successfully.
///
/// Integers and reals are kept apart; storing a value never converts
/// one into the other.
///
/// # Examples
///
/// ```
/// use classad_lang::{ClassAd, Value};
///
/// let v = Value::Integer(42);
/// assert_eq!(v.to_string(), "42");
///
/// let mut ad = ClassAd::new();
/// ad.insert("x", classad_lang::Expr::integer(1));
/// let nested = Value::Record(ad);
/// assert_eq!(nested.to_string(), "[ x = 1 ]");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),

    Integer(i64),

    Real(f64),

    /// Decoded text
    String(String),

    /// Point in time with its display offset
    AbsoluteTime(AbsTime),

    /// Duration
    RelativeTime(RelTime),

    /// The `error` sentinel
    Error,

    /// The `undefined` sentinel
    Undefined,

    /// Nested record
    Record(ClassAd),

    /// List of values
    List(Vec<Value>),

    /// Expression that needs an evaluation engine to become a value
    Expression(Expr),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::AbsoluteTime(_) => "absolute time",
            Value::RelativeTime(_) => "relative time",
            Value::Error => "error",
            Value::Undefined => "undefined",
            Value::Record(_) => "classad",
            Value::List(_) => "list",
            Value::Expression(_) => "expression",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ClassAd> {
        match self {
            Value::Record(ad) => Some(ad),
            _ => None,
        }
    }

    pub fn from_literal(literal: &Literal) -> Value {
        match literal {
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Real(n) => Value::Real(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::AbsTime(t) => Value::AbsoluteTime(*t),
            Literal::RelTime(t) => Value::RelativeTime(*t),
            Literal::Error => Value::Error,
            Literal::Undefined => Value::Undefined,
        }
    }

    /// Convert literal, record and list nodes; anything else stays an
    /// unevaluated [`Value::Expression`].
    pub fn from_expr(expr: &Expr) -> Value {
        match expr {
            Expr::Literal(literal) => Value::from_literal(literal),
            Expr::Record(ad) => Value::Record(ad.clone()),
            Expr::List(items) => Value::List(items.iter().map(Value::from_expr).collect()),
            other => Value::Expression(other.clone()),
        }
    }

    /// The expression node that denotes this value.
    pub fn into_node(self) -> Expr {
        match self {
            Value::Boolean(b) => Expr::boolean(b),
            Value::Integer(n) => Expr::integer(n),
            Value::Real(n) => Expr::real(n),
            Value::String(s) => Expr::string(s),
            Value::AbsoluteTime(t) => Expr::Literal(Literal::AbsTime(t)),
            Value::RelativeTime(t) => Expr::Literal(Literal::RelTime(t)),
            Value::Error => Expr::error(),
            Value::Undefined => Expr::undefined(),
            Value::Record(ad) => Expr::Record(ad),
            Value::List(items) => Expr::List(items.into_iter().map(Value::into_node).collect()),
            Value::Expression(expr) => expr,
        }
    }
}

impl fmt::Display for Value {
    /// Strings print raw and times print bare; every other kind prints in
    /// expression syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(n) => f.write_str(&render_real(*n)),
            Value::String(s) => f.write_str(s),
            Value::AbsoluteTime(t) => write!(f, "{}", t),
            Value::RelativeTime(t) => write!(f, "{}", t),
            Value::Error => f.write_str("error"),
            Value::Undefined => f.write_str("undefined"),
            Value::Record(ad) => f.write_str(&ad.to_canonical_string()),
            Value::List(_) => write!(f, "{}", self.clone().into_node()),
            Value::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Conversion of a supported external value into an expression node.
///
/// Implemented once per accepted source type; the trait is sealed. Types
/// without an implementation do not compile, and implemented types whose
/// particular value has no ClassAd form (an out-of-range `u64`, bytes that
/// are not UTF-8) fail with [`Error::TypeMismatch`].
///
/// Mappings become nested records and sequences become lists. Both are
/// copied, so mutating the source afterwards does not touch the stored
/// node.
pub trait IntoExpr: sealed::Sealed {
    fn into_expr(self) -> Result<Expr>;
}

macro_rules! lossless_integer {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl IntoExpr for $t {
            fn into_expr(self) -> Result<Expr> {
                Ok(Expr::integer(i64::from(self)))
            }
        }
    )*};
}

macro_rules! checked_integer {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl IntoExpr for $t {
            fn into_expr(self) -> Result<Expr> {
                i64::try_from(self).map(Expr::integer).map_err(|_| {
                    Error::type_mismatch(format!("integer {} does not fit in 64 signed bits", self))
                })
            }
        }
    )*};
}

lossless_integer!(i8, i16, i32, i64, u16, u32);
checked_integer!(u64, usize, i128, u128);

impl sealed::Sealed for bool {}
impl IntoExpr for bool {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::boolean(self))
    }
}

impl sealed::Sealed for f64 {}
impl IntoExpr for f64 {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::real(self))
    }
}

impl sealed::Sealed for f32 {}
impl IntoExpr for f32 {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::real(f64::from(self)))
    }
}

impl sealed::Sealed for &str {}
impl IntoExpr for &str {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::string(self))
    }
}

impl sealed::Sealed for String {}
impl IntoExpr for String {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::string(self))
    }
}

impl sealed::Sealed for &String {}
impl IntoExpr for &String {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::string(self.as_str()))
    }
}

// Byte strings are decoded, not kept as binary.
impl sealed::Sealed for &[u8] {}
impl IntoExpr for &[u8] {
    fn into_expr(self) -> Result<Expr> {
        std::str::from_utf8(self)
            .map(Expr::string)
            .map_err(|e| Error::type_mismatch(format!("byte string is not UTF-8: {}", e)))
    }
}

impl<const N: usize> sealed::Sealed for &[u8; N] {}
impl<const N: usize> IntoExpr for &[u8; N] {
    fn into_expr(self) -> Result<Expr> {
        self.as_slice().into_expr()
    }
}

impl sealed::Sealed for AbsTime {}
impl IntoExpr for AbsTime {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::Literal(Literal::AbsTime(self)))
    }
}

impl sealed::Sealed for RelTime {}
impl IntoExpr for RelTime {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::Literal(Literal::RelTime(self)))
    }
}

impl<Tz: TimeZone> sealed::Sealed for DateTime<Tz> {}
impl<Tz: TimeZone> IntoExpr for DateTime<Tz> {
    fn into_expr(self) -> Result<Expr> {
        AbsTime::from_datetime(&self).into_expr()
    }
}

impl sealed::Sealed for NaiveDateTime {}
impl IntoExpr for NaiveDateTime {
    fn into_expr(self) -> Result<Expr> {
        AbsTime::from_naive_local(&self).into_expr()
    }
}

impl sealed::Sealed for std::time::Duration {}
impl IntoExpr for std::time::Duration {
    fn into_expr(self) -> Result<Expr> {
        RelTime::from(self).into_expr()
    }
}

impl sealed::Sealed for chrono::TimeDelta {}
impl IntoExpr for chrono::TimeDelta {
    fn into_expr(self) -> Result<Expr> {
        RelTime::from(self).into_expr()
    }
}

impl sealed::Sealed for Value {}
impl IntoExpr for Value {
    fn into_expr(self) -> Result<Expr> {
        Ok(self.into_node())
    }
}

impl sealed::Sealed for Expr {}
impl IntoExpr for Expr {
    fn into_expr(self) -> Result<Expr> {
        Ok(self)
    }
}

impl sealed::Sealed for &Expr {}
impl IntoExpr for &Expr {
    fn into_expr(self) -> Result<Expr> {
        Ok(self.clone())
    }
}

impl sealed::Sealed for ClassAd {}
impl IntoExpr for ClassAd {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::Record(self))
    }
}

impl sealed::Sealed for &ClassAd {}
impl IntoExpr for &ClassAd {
    fn into_expr(self) -> Result<Expr> {
        Ok(Expr::Record(self.clone()))
    }
}

// `None` is the undefined value.
impl<T: IntoExpr> sealed::Sealed for Option<T> {}
impl<T: IntoExpr> IntoExpr for Option<T> {
    fn into_expr(self) -> Result<Expr> {
        match self {
            Some(value) => value.into_expr(),
            None => Ok(Expr::undefined()),
        }
    }
}

impl<T: IntoExpr> sealed::Sealed for Vec<T> {}
impl<T: IntoExpr> IntoExpr for Vec<T> {
    fn into_expr(self) -> Result<Expr> {
        let items = self
            .into_iter()
            .map(IntoExpr::into_expr)
            .collect::<Result<Vec<_>>>()?;
        Ok(Expr::List(items))
    }
}

/// Copy `(key, value)` pairs into a fresh record.
fn record_from_pairs<K, V, I>(pairs: I) -> Result<ClassAd>
where
    K: AsKey,
    V: IntoExpr,
    I: IntoIterator<Item = (K, V)>,
{
    let mut ad = ClassAd::new();
    for (key, value) in pairs {
        ad.set(&key, value)?;
    }
    Ok(ad)
}

impl<K: AsKey, V: IntoExpr, S: BuildHasher> sealed::Sealed for HashMap<K, V, S> {}
impl<K: AsKey, V: IntoExpr, S: BuildHasher> IntoExpr for HashMap<K, V, S> {
    fn into_expr(self) -> Result<Expr> {
        record_from_pairs(self).map(Expr::Record)
    }
}

impl<K: AsKey, V: IntoExpr + Clone, S: BuildHasher> sealed::Sealed for &HashMap<K, V, S> {}
impl<K: AsKey, V: IntoExpr + Clone, S: BuildHasher> IntoExpr for &HashMap<K, V, S> {
    fn into_expr(self) -> Result<Expr> {
        record_from_pairs(self.iter().map(|(k, v)| (k, v.clone()))).map(Expr::Record)
    }
}

impl<K: AsKey, V: IntoExpr> sealed::Sealed for BTreeMap<K, V> {}
impl<K: AsKey, V: IntoExpr> IntoExpr for BTreeMap<K, V> {
    fn into_expr(self) -> Result<Expr> {
        record_from_pairs(self).map(Expr::Record)
    }
}

impl<K: AsKey, V: IntoExpr + Clone> sealed::Sealed for &BTreeMap<K, V> {}
impl<K: AsKey, V: IntoExpr + Clone> IntoExpr for &BTreeMap<K, V> {
    fn into_expr(self) -> Result<Expr> {
        record_from_pairs(self.iter().map(|(k, v)| (k, v.clone()))).map(Expr::Record)
    }
}

