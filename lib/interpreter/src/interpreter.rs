use std::{cell::RefCell, io::Write, rc::Rc};

use cursor::Line;
use errors::LoxErrors;
use parser::{Expr, Stmt};
use scanner::{Token, TokenType};

mod value;
pub use value::Value;

mod environment;
use environment::{Environment, Scope};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
    #[error("Denominator must be non-zero.")]
    DivisionByZero,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
}

/// An error raised while evaluating. `line` is the line of the operator or identifier that
/// triggered it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
}

impl RuntimeError {
    pub fn new(error: RuntimeErrorType, line: Line) -> Self {
        Self { error, line }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InterpretError {
    /// Lexical and syntax errors. Nothing was evaluated.
    #[error("{0}")]
    CompileError(#[from] LoxErrors),
    #[error("{0}\n[line {}]", .0.line)]
    RuntimeError(#[from] RuntimeError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Tree-walking evaluator. The global frame lives as long as the interpreter, so consecutive
/// calls (e.g. one per REPL line) share their global variables.
#[derive(Debug, Default)]
pub struct Interpreter {
    environment: Rc<RefCell<Environment>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans, parses and, if both succeeded, interprets one source unit.
    pub fn run_source(&mut self, source: &str, output: &mut dyn Write) -> Result<(), InterpretError> {
        let (tokens, scan_errors) = scanner::scan_tokens(source);
        let mut errors: LoxErrors = scan_errors.into_iter().collect();

        match parser::parse(tokens) {
            Ok(stmts) if errors.is_empty() => self.interpret(&stmts, output),
            Ok(_) => Err(errors.into()),
            Err(parse_errors) => {
                errors.extend(parse_errors.0);
                Err(errors.into())
            }
        }
    }

    /// Executes `stmts` in order, stopping at the first runtime error.
    pub fn interpret(&mut self, stmts: &[Stmt], output: &mut dyn Write) -> Result<(), InterpretError> {
        for stmt in stmts {
            self.execute(stmt, output)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, output: &mut dyn Write) -> Result<(), InterpretError> {
        log::trace!("Executing {}", stmt);
        match stmt {
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(output, "{}", value)?;
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.lexeme(), value);
            }
            Stmt::Block(stmts) => {
                let _scope = Scope::new(self.environment.clone());

                for stmt in stmts {
                    self.execute(stmt, output)?;
                }
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.into()),

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match (operator.ty(), right) {
                    (TokenType::Minus, Value::Number(n)) => Ok((-n).into()),
                    (TokenType::Minus, _) => {
                        Err(RuntimeError::new(RuntimeErrorType::OperandMustBeNumber, operator.line()))
                    }
                    (TokenType::Bang, v) => Ok((!v.is_truthy()).into()),
                    (ty, _) => unreachable!("{:?} is not a unary operator", ty),
                }
            }

            Expr::Variable(name) => self.environment.borrow().get(name),

            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }

            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }
        }
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use RuntimeErrorType::*;
    use TokenType::*;

    let error = |error: RuntimeErrorType| Err(RuntimeError::new(error, operator.line()));

    match (operator.ty(), &left, &right) {
        (EqualEqual, ..) => Ok((left == right).into()),
        (BangEqual, ..) => Ok((left != right).into()),

        (Plus, Value::Number(l), Value::Number(r)) => Ok((l + r).into()),
        (Plus, Value::Str(_), _) | (Plus, _, Value::Str(_)) => Ok(format!("{}{}", left, right).into()),
        (Plus, ..) => error(OperandsMustBeNumbersOrStrings),

        (Minus, Value::Number(l), Value::Number(r)) => Ok((l - r).into()),
        (Star, Value::Number(l), Value::Number(r)) => Ok((l * r).into()),
        (Slash, Value::Number(_), Value::Number(r)) if *r == 0.0 => error(DivisionByZero),
        (Slash, Value::Number(l), Value::Number(r)) => Ok((l / r).into()),

        (Greater, Value::Number(l), Value::Number(r)) => Ok((l > r).into()),
        (GreaterEqual, Value::Number(l), Value::Number(r)) => Ok((l >= r).into()),
        (Less, Value::Number(l), Value::Number(r)) => Ok((l < r).into()),
        (LessEqual, Value::Number(l), Value::Number(r)) => Ok((l <= r).into()),

        (Minus | Star | Slash | Greater | GreaterEqual | Less | LessEqual, ..) => {
            error(OperandsMustBeNumbers)
        }

        (ty, ..) => unreachable!("{:?} is not a binary operator", ty),
    }
}
