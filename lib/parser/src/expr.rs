use std::fmt::{self, Display, Formatter};

use scanner::{Token, TokenData};

/// Expression tree. Operator and name tokens are kept for their lexeme and line, which runtime
/// errors report.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Binary { left: Box<Expr<'a>>, operator: Token<'a>, right: Box<Expr<'a>> },
    Grouping(Box<Expr<'a>>),
    Unary { operator: Token<'a>, right: Box<Expr<'a>> },
    Literal(LiteralValue<'a>),
    Variable(Token<'a>),
    Assign { name: Token<'a>, value: Box<Expr<'a>> },
}

impl<'a> Expr<'a> {
    pub fn binary(left: Expr<'a>, operator: Token<'a>, right: Expr<'a>) -> Self {
        Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn unary(operator: Token<'a>, right: Expr<'a>) -> Self {
        Expr::Unary { operator, right: Box::new(right) }
    }

    pub fn grouping(inner: Expr<'a>) -> Self {
        Expr::Grouping(Box::new(inner))
    }

    pub fn assign(name: Token<'a>, value: Expr<'a>) -> Self {
        Expr::Assign { name, value: Box::new(value) }
    }
}

impl<'a> From<LiteralValue<'a>> for Expr<'a> {
    fn from(value: LiteralValue<'a>) -> Self {
        Expr::Literal(value)
    }
}

/// Parenthesized prefix form, e.g. `(* (- 1) (group 2))`.
impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { left, operator, right } => write!(f, "({operator} {left} {right})"),
            Expr::Grouping(inner) => write!(f, "(group {inner})"),
            Expr::Unary { operator, right } => write!(f, "({operator} {right})"),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Variable(name) => write!(f, "{}", name.lexeme()),
            Expr::Assign { name, value } => write!(f, "(assign {} {value})", name.lexeme()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
    Number(f64),
    Str(&'a str),
    Boolean(bool),
    Nil,
}

impl<'a> LiteralValue<'a> {
    /// The literal a token stands for, if it is one of `number`, `string`, `true`, `false`, `nil`.
    pub fn from_token(data: TokenData<'a>) -> Option<Self> {
        match data {
            TokenData::Number(n) => Some(LiteralValue::Number(n)),
            TokenData::Str(s) => Some(LiteralValue::Str(s)),
            TokenData::True => Some(LiteralValue::Boolean(true)),
            TokenData::False => Some(LiteralValue::Boolean(false)),
            TokenData::Nil => Some(LiteralValue::Nil),
            _ => None,
        }
    }
}

impl Display for LiteralValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Str(s) => write!(f, "\"{s}\""),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}
