//! Values held by defines and produced by expression evaluation

use crate::error::PrologueError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Largest string, in bytes, that `*` may build by repetition
pub const MAX_REPEAT_BYTES: usize = 1 << 24;

/// A defined or computed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Build a value from define text, converting integer literals.
    ///
    /// Only applied when a define is stored, never on lookup.
    pub fn coerce(text: impl Into<String>) -> Value {
        let text = text.into();
        match text.trim().parse::<i64>() {
            Ok(number) => Value::Int(number),
            Err(_) => Value::Str(text),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(flag) => *flag,
            Value::Int(number) => *number != 0,
            Value::Float(number) => *number != 0.0,
            Value::Str(text) => !text.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Render as an expression fragment that evaluates back to this value
    pub fn to_expression(&self) -> String {
        match self {
            Value::Str(text) => quote(text),
            Value::List(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(Value::to_expression)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            other => other.to_string(),
        }
    }

    /// Elements produced when iterating the value in a loop
    pub fn iterate(&self) -> Result<Vec<Value>, PrologueError> {
        match self {
            Value::List(items) => Ok(items.clone()),
            Value::Str(text) => Ok(text.chars().map(|c| Value::Str(c.to_string())).collect()),
            other => Err(PrologueError::Expression(format!(
                "Value of type {} is not iterable: {}",
                other.type_name(),
                other
            ))),
        }
    }

    fn number(&self) -> Option<Number> {
        match self {
            Value::Bool(flag) => Some(Number::Int(*flag as i64)),
            Value::Int(number) => Some(Number::Int(*number)),
            Value::Float(number) => Some(Number::Float(*number)),
            _ => None,
        }
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, PrologueError> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => self.arithmetic(rhs, "+", i64::checked_add, |a, b| a + b),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, PrologueError> {
        self.arithmetic(rhs, "-", i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, PrologueError> {
        match (self, rhs) {
            (Value::Str(text), Value::Int(count)) | (Value::Int(count), Value::Str(text)) => {
                repeat(text, *count)
            }
            _ => self.arithmetic(rhs, "*", i64::checked_mul, |a, b| a * b),
        }
    }

    /// True division, always producing a float
    pub fn div(&self, rhs: &Value) -> Result<Value, PrologueError> {
        let (a, b) = self.floats(rhs, "/")?;
        if b == 0.0 {
            return Err(division_by_zero());
        }
        Ok(Value::Float(a / b))
    }

    /// Division rounding towards negative infinity
    pub fn floor_div(&self, rhs: &Value) -> Result<Value, PrologueError> {
        match (self.number(), rhs.number()) {
            (Some(Number::Int(_)), Some(Number::Int(0))) => Err(division_by_zero()),
            (Some(Number::Int(a)), Some(Number::Int(b))) => {
                let quotient = a.checked_div(b).ok_or_else(|| overflow("//"))?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(Value::Int(quotient - 1))
                } else {
                    Ok(Value::Int(quotient))
                }
            }
            _ => {
                let (a, b) = self.floats(rhs, "//")?;
                if b == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float((a / b).floor()))
            }
        }
    }

    /// Remainder taking the sign of the divisor
    pub fn rem(&self, rhs: &Value) -> Result<Value, PrologueError> {
        match (self.number(), rhs.number()) {
            (Some(Number::Int(_)), Some(Number::Int(0))) => Err(division_by_zero()),
            (Some(Number::Int(a)), Some(Number::Int(b))) => {
                let remainder = a.checked_rem(b).ok_or_else(|| overflow("%"))?;
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    Ok(Value::Int(remainder + b))
                } else {
                    Ok(Value::Int(remainder))
                }
            }
            _ => {
                let (a, b) = self.floats(rhs, "%")?;
                if b == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float(a - b * (a / b).floor()))
            }
        }
    }

    pub fn neg(&self) -> Result<Value, PrologueError> {
        match self.number() {
            Some(Number::Int(number)) => number
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow("-")),
            Some(Number::Float(number)) => Ok(Value::Float(-number)),
            None => Err(unsupported_unary("-", self)),
        }
    }

    pub fn pos(&self) -> Result<Value, PrologueError> {
        match self.number() {
            Some(Number::Int(number)) => Ok(Value::Int(number)),
            Some(Number::Float(number)) => Ok(Value::Float(number)),
            None => Err(unsupported_unary("+", self)),
        }
    }

    /// Equality across types: numbers compare numerically, everything else structurally
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self.number(), rhs.number()) {
            (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
            _ => match (self, rhs) {
                (Value::Str(a), Value::Str(b)) => a == b,
                (Value::List(a), Value::List(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
                }
                _ => false,
            },
        }
    }

    /// Ordering for `<`, `<=`, `>` and `>=`
    pub fn compare(&self, rhs: &Value, op: &str) -> Result<Ordering, PrologueError> {
        let ordering = match (self.number(), rhs.number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => match (self, rhs) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => None,
            },
        };
        ordering.ok_or_else(|| unsupported(op, self, rhs))
    }

    fn floats(&self, rhs: &Value, op: &str) -> Result<(f64, f64), PrologueError> {
        match (self.number(), rhs.number()) {
            (Some(a), Some(b)) => Ok((a.as_f64(), b.as_f64())),
            _ => Err(unsupported(op, self, rhs)),
        }
    }

    fn arithmetic(
        &self,
        rhs: &Value,
        op: &str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value, PrologueError> {
        match (self.number(), rhs.number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => {
                int_op(a, b).map(Value::Int).ok_or_else(|| overflow(op))
            }
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a.as_f64(), b.as_f64()))),
            _ => Err(unsupported(op, self, rhs)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Int(number) => write!(f, "{}", number),
            Value::Float(number) if number.is_finite() && number.fract() == 0.0 => {
                write!(f, "{:.1}", number)
            }
            Value::Float(number) => write!(f, "{}", number),
            Value::Str(text) => f.write_str(text),
            Value::List(_) => f.write_str(&self.to_expression()),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Int(number)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Float(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Str(text)
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(number) => number as f64,
            Number::Float(number) => number,
        }
    }
}

fn quote(text: &str) -> String {
    if text.contains('"') {
        format!("'{}'", text)
    } else {
        format!("\"{}\"", text)
    }
}

/// `text * count`, empty for non-positive counts
fn repeat(text: &str, count: i64) -> Result<Value, PrologueError> {
    let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
    match text.len().checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_BYTES => Ok(Value::Str(text.repeat(count))),
        _ => Err(PrologueError::Limit(format!(
            "Repeat count too large: {} copies of a {} byte string exceed {} bytes",
            count,
            text.len(),
            MAX_REPEAT_BYTES
        ))),
    }
}

fn unsupported(op: &str, lhs: &Value, rhs: &Value) -> PrologueError {
    PrologueError::Expression(format!(
        "Unsupported operand types for {}: {} and {}",
        op,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn unsupported_unary(op: &str, value: &Value) -> PrologueError {
    PrologueError::Expression(format!(
        "Unsupported operand type for unary {}: {}",
        op,
        value.type_name()
    ))
}

fn overflow(op: &str) -> PrologueError {
    PrologueError::Expression(format!("Integer overflow in {}", op))
}

fn division_by_zero() -> PrologueError {
    PrologueError::Expression("Division by zero".to_string())
}
