use crate::ast::{BinOp, UnaryOp};
use crate::record::ClassAd;
use crate::time::{AbsTime, RelTime};

/// A scalar literal.
///
/// Reals compare by bit pattern, so `NaN` equals itself and `0.0` differs
/// from `-0.0`. That keeps structural equality reflexive.
#[derive(Debug, Clone)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    AbsTime(AbsTime),
    RelTime(RelTime),
    Error,
    Undefined,
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        use Literal::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Real(a), Real(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (AbsTime(a), AbsTime(b)) => a == b,
            (RelTime(a), RelTime(b)) => a.seconds().to_bits() == b.seconds().to_bits(),
            (Error, Error) | (Undefined, Undefined) => true,
            _ => false,
        }
    }
}

/// A node of the ClassAd expression language.
///
/// Nodes are plain values: equality is structural and two independently
/// parsed copies of `2 + 2` compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "hello"
    /// undefined
    /// absTime("2024-06-01 10:00:00+00:00")
    /// ```
    Literal(Literal),

    /// Attribute reference
    ///
    /// `absolute` is set for the `.name` form, which resolves from the
    /// outermost record.
    ///
    /// # Examples
    /// ```text
    /// Memory
    /// .Memory
    /// 'odd name'
    /// ```
    Attribute { name: String, absolute: bool },

    /// Attribute selection on a record-valued expression
    ///
    /// # Examples
    /// ```text
    /// TARGET.Memory
    /// [a = 1].a
    /// ```
    Select { base: Box<Expr>, attr: String },

    /// Subscript of a list or record
    ///
    /// # Examples
    /// ```text
    /// {1, 2, 3}[0]
    /// Slots["cpu"]
    /// ```
    Subscript { base: Box<Expr>, index: Box<Expr> },

    /// Prefix operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional (`c ? a : b`)
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// strcat("a", "b")
    /// member(x, {1, 2})
    /// ```
    Call { name: String, args: Vec<Expr> },

    /// Explicit parentheses, kept so rendering reproduces the source
    Parens(Box<Expr>),

    /// Nested record
    ///
    /// # Examples
    /// ```text
    /// [cpus = 4; memory = 2048]
    /// ```
    Record(ClassAd),

    /// List
    ///
    /// # Examples
    /// ```text
    /// {1, "two", [three = 3]}
    /// ```
    List(Vec<Expr>),
}

impl Expr {
    pub fn boolean(b: bool) -> Self {
        Expr::Literal(Literal::Boolean(b))
    }

    pub fn integer(n: i64) -> Self {
        Expr::Literal(Literal::Integer(n))
    }

    pub fn real(n: f64) -> Self {
        Expr::Literal(Literal::Real(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn undefined() -> Self {
        Expr::Literal(Literal::Undefined)
    }

    pub fn error() -> Self {
        Expr::Literal(Literal::Error)
    }

    /// Relative attribute reference.
    pub fn attr(name: impl Into<String>) -> Self {
        Expr::Attribute {
            name: name.into(),
            absolute: false,
        }
    }

    /// Builds the node the parser would produce for the same text: a minus
    /// on an unsigned numeric literal becomes a negative literal, and an
    /// operator operand is wrapped in [`Expr::Parens`].
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        if op == UnaryOp::Minus {
            match operand {
                Expr::Literal(Literal::Integer(n)) if n >= 0 => return Expr::integer(-n),
                Expr::Literal(Literal::Real(n)) if n.is_finite() && n.is_sign_positive() => {
                    return Expr::real(-n);
                }
                _ => {}
            }
        }
        let operand = match operand {
            operand @ (Expr::Binary { .. } | Expr::Conditional { .. }) => {
                Expr::Parens(Box::new(operand))
            }
            operand => operand,
        };
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Operands binding looser than `op` are wrapped in [`Expr::Parens`], so
    /// the tree matches what its rendered text parses to.
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        let precedence = op.precedence();
        let left = if left.binding() < precedence {
            Expr::Parens(Box::new(left))
        } else {
            left
        };
        let right = if right.binding() <= precedence {
            Expr::Parens(Box::new(right))
        } else {
            right
        };
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// How tightly the node holds together as an operand: the operator
    /// precedence for binary nodes, 0 for conditionals, and `u8::MAX` for
    /// everything that renders as a single term.
    pub(crate) fn binding(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Conditional { .. } => 0,
            _ => u8::MAX,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// True for literal, record and list nodes, whose value is known
    /// without an evaluation engine.
    pub fn is_constant_form(&self) -> bool {
        matches!(self, Expr::Literal(_) | Expr::Record(_) | Expr::List(_))
    }
}
