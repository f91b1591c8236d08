//! Typed expressions.
//!
//! Every element field is an [`Expr`]: either a literal fixed when the token
//! was read, or a reference to a dictionary entry that is resolved only when
//! the owning element is fired. Four value kinds exist: byte, int, long and
//! double.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::parser::error::EvalError;

/// Largest value a 14-bit quantity (pitch bend, combined controller) can hold.
pub const MAX_14_BIT: i32 = 16383;

/// A dictionary value in one of the four value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Byte(u8),
    Int(i32),
    Long(i64),
    Double(f64),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Byte(_) => u8::KIND,
            Value::Int(_) => i32::KIND,
            Value::Long(_) => i64::KIND,
            Value::Double(_) => f64::KIND,
        }
    }

    /// Coerce to a value kind, following the crate's coercion rules.
    pub fn to_kind<T: ValueKind>(self) -> Option<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{} {v}", self.kind_name()),
            Value::Int(v) => write!(f, "{} {v}", self.kind_name()),
            Value::Long(v) => write!(f, "{} {v}", self.kind_name()),
            Value::Double(v) => write!(f, "{} {v}", self.kind_name()),
        }
    }
}

/// A Rust type an [`Expr`] can evaluate to.
///
/// Integer kinds convert into each other when the value fits the target;
/// every integer converts to double; a double converts to an integer kind
/// only when it is whole and fits.
pub trait ValueKind: Copy + PartialEq + fmt::Debug + fmt::Display {
    const KIND: &'static str;

    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

fn whole(value: f64) -> Option<i64> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value <= i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}

fn as_i64(value: Value) -> Option<i64> {
    match value {
        Value::Byte(v) => Some(v as i64),
        Value::Int(v) => Some(v as i64),
        Value::Long(v) => Some(v),
        Value::Double(v) => whole(v),
    }
}

impl ValueKind for u8 {
    const KIND: &'static str = "byte";

    fn from_value(value: Value) -> Option<Self> {
        as_i64(value).and_then(|v| u8::try_from(v).ok())
    }

    fn into_value(self) -> Value {
        Value::Byte(self)
    }
}

impl ValueKind for i32 {
    const KIND: &'static str = "int";

    fn from_value(value: Value) -> Option<Self> {
        as_i64(value).and_then(|v| i32::try_from(v).ok())
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl ValueKind for i64 {
    const KIND: &'static str = "long";

    fn from_value(value: Value) -> Option<Self> {
        as_i64(value)
    }

    fn into_value(self) -> Value {
        Value::Long(self)
    }
}

impl ValueKind for f64 {
    const KIND: &'static str = "double";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            Value::Long(v) => Some(v as f64),
            Value::Double(v) => Some(v),
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

/// A literal value or a named dictionary reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<T> {
    Literal(T),
    DictRef(String),
}

pub type ByteExpr = Expr<u8>;
pub type IntExpr = Expr<i32>;
pub type LongExpr = Expr<i64>;
pub type DoubleExpr = Expr<f64>;

impl<T: ValueKind> Expr<T> {
    pub fn dict_ref(name: impl Into<String>) -> Self {
        Expr::DictRef(name.into())
    }

    /// Evaluate against a dictionary snapshot.
    ///
    /// Literals never fail. References fail when the name is absent or the
    /// stored value cannot be coerced to `T`.
    pub fn eval(&self, dictionary: &Dictionary) -> Result<T, EvalError> {
        match self {
            Expr::Literal(value) => Ok(*value),
            Expr::DictRef(name) => {
                let entry = dictionary
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedKey(name.clone()))?;
                entry.value.to_kind::<T>().ok_or_else(|| EvalError::IncompatibleKind {
                    name: name.clone(),
                    expected: T::KIND,
                    found: entry.value.to_string(),
                })
            }
        }
    }
}

impl<T: ValueKind> From<T> for Expr<T> {
    fn from(value: T) -> Self {
        Expr::Literal(value)
    }
}

impl<T: fmt::Display> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::DictRef(name) => write!(f, "[{name}]"),
        }
    }
}

impl IntExpr {
    /// Most-significant 7 bits of the evaluated 14-bit value.
    pub fn msb(&self, dictionary: &Dictionary) -> Result<u8, EvalError> {
        self.eval(dictionary).map(msb)
    }

    /// Least-significant 7 bits of the evaluated 14-bit value.
    pub fn lsb(&self, dictionary: &Dictionary) -> Result<u8, EvalError> {
        self.eval(dictionary).map(lsb)
    }
}

/// `floor(value / 128)`, with `value` clamped to `0..=16383`.
pub fn msb(value: i32) -> u8 {
    (value.clamp(0, MAX_14_BIT) / 128) as u8
}

/// `value mod 128`, with `value` clamped to `0..=16383`.
pub fn lsb(value: i32) -> u8 {
    (value.clamp(0, MAX_14_BIT) % 128) as u8
}
