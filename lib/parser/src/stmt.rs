use std::fmt::{self, Display, Formatter};

use scanner::Token;

use crate::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    Expression(Expr<'a>),
    Print(Expr<'a>),
    Var { name: Token<'a>, initializer: Option<Expr<'a>> },
    /// Statements run in a fresh scope nested in the current one.
    Block(Vec<Stmt<'a>>),
}

impl Display for Stmt<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "(; {expr})"),
            Stmt::Print(expr) => write!(f, "(print {expr})"),
            Stmt::Var { name, initializer: Some(init) } => write!(f, "(var {} {init})", name.lexeme()),
            Stmt::Var { name, initializer: None } => write!(f, "(var {})", name.lexeme()),
            Stmt::Block(stmts) => {
                write!(f, "(block")?;
                for stmt in stmts {
                    write!(f, " {stmt}")?;
                }
                write!(f, ")")
            }
        }
    }
}
