//! The seam to an expression evaluation engine.
//!
//! Records store expressions unevaluated. Turning `Memory * 2` into a value
//! needs the full ClassAd semantics (matchmaking scopes, three-valued logic,
//! the builtin function library), which live behind [`Evaluate`]. The crate
//! ships [`LiteralEvaluator`], which handles the cases that need no
//! arithmetic at all.

use thiserror::Error;

use crate::ast::Expr;
use crate::record::{AttributeMap, ClassAd};
use crate::value::Value;

/// An expression tree an engine cannot work with at all.
///
/// Semantic failures (a missing attribute, adding a string to a list) are
/// not defects; they evaluate to [`Value::Undefined`] or [`Value::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalDefect {
    /// An attribute reference or call with an empty name.
    #[error("Malformed expression: empty name in {0}")]
    EmptyName(String),
}

/// An evaluation engine.
///
/// `my` is the record holding the expression; `target` is the record it is
/// being matched against, if any.
pub trait Evaluate {
    fn evaluate(&self, expr: &Expr, my: &ClassAd, target: Option<&ClassAd>) -> Result<Value, EvalDefect>;
}

/// Evaluates constants and follows plain references to them.
///
/// Literals, records and lists become values, parentheses are looked
/// through, and a bare attribute name resolves against `my` and then
/// `target`. Everything else (operators, calls, selections) needs a real
/// engine and yields `Undefined`. A chain of references longer than the
/// depth limit, such as a cycle, yields `Error`.
///
/// ```
/// use classad_lang::{ClassAd, Evaluate, LiteralEvaluator, Value};
///
/// let ad = ClassAd::parse("[a = b; b = (7); c = a + 1]").unwrap();
/// let engine = LiteralEvaluator::default();
/// assert_eq!(ad.evaluate_attr("a", &engine, None).unwrap(), Value::Integer(7));
/// assert_eq!(ad.evaluate_attr("c", &engine, None).unwrap(), Value::Undefined);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LiteralEvaluator {
    max_depth: usize,
}

impl LiteralEvaluator {
    pub fn new(max_depth: usize) -> Self {
        LiteralEvaluator { max_depth }
    }

    fn eval_at(
        &self,
        expr: &Expr,
        my: &ClassAd,
        target: Option<&ClassAd>,
        depth: usize,
    ) -> Result<Value, EvalDefect> {
        // a reference cycle is a semantic failure, not a defect
        if depth > self.max_depth {
            return Ok(Value::Error);
        }
        match expr {
            Expr::Parens(inner) => self.eval_at(inner, my, target, depth + 1),
            Expr::Attribute { name, .. } if name.is_empty() => {
                Err(EvalDefect::EmptyName(expr.to_string()))
            }
            Expr::Call { name, .. } if name.is_empty() => {
                Err(EvalDefect::EmptyName(expr.to_string()))
            }
            Expr::Attribute { name, .. } => {
                let bound = my
                    .lookup(name)
                    .or_else(|| target.and_then(|t| t.lookup(name)));
                match bound {
                    Some(bound) => self.eval_at(bound, my, target, depth + 1),
                    None => Ok(Value::Undefined),
                }
            }
            expr if expr.is_constant_form() => Ok(Value::from_expr(expr)),
            _ => Ok(Value::Undefined),
        }
    }
}

impl Default for LiteralEvaluator {
    fn default() -> Self {
        LiteralEvaluator::new(64)
    }
}

impl Evaluate for LiteralEvaluator {
    fn evaluate(&self, expr: &Expr, my: &ClassAd, target: Option<&ClassAd>) -> Result<Value, EvalDefect> {
        self.eval_at(expr, my, target, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_fallback() {
        let my = ClassAd::parse("[want = Memory]").unwrap();
        let target = ClassAd::parse("[Memory = 2048]").unwrap();
        let engine = LiteralEvaluator::default();
        let expr = Expr::attr("want");
        assert_eq!(engine.evaluate(&expr, &my, Some(&target)), Ok(Value::Integer(2048)));
        assert_eq!(engine.evaluate(&expr, &my, None), Ok(Value::Undefined));
    }

    #[test]
    fn test_reference_cycle_is_an_error_value() {
        let my = ClassAd::parse("[a = b; b = a]").unwrap();
        let engine = LiteralEvaluator::new(8);
        assert_eq!(engine.evaluate(&Expr::attr("a"), &my, None), Ok(Value::Error));
        assert_eq!(
            my.evaluate_attr("a", &LiteralEvaluator::default(), None).unwrap(),
            Value::Error
        );
    }

    #[test]
    fn test_empty_name_is_a_defect() {
        let my = ClassAd::new();
        let engine = LiteralEvaluator::default();
        assert!(matches!(
            engine.evaluate(&Expr::attr(""), &my, None),
            Err(EvalDefect::EmptyName(_))
        ));
    }
}
