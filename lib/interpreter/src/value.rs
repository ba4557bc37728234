use std::fmt::{self, Display, Formatter};

use parser::LiteralValue;

/// Runtime value. Equality is structural within a variant and false across variants, so `nil`
/// only equals `nil`.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    #[from(ignore)]
    Nil,
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            // Integral floats are already printed without a trailing ".0"
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&LiteralValue<'_>> for Value {
    fn from(literal: &LiteralValue<'_>) -> Self {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => (*s).into(),
            LiteralValue::Boolean(b) => Value::Bool(*b),
            LiteralValue::Nil => Value::Nil,
        }
    }
}
