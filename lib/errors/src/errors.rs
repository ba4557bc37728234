use std::fmt::Display;

use cursor::Line;
use itertools::Itertools;

/// A lexical or syntax error, as reported to the user.
///
/// `location` is empty for lexical errors. Syntax errors carry `end` or the quoted lexeme of the
/// offending token.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{}: {message}", at(.location))]
pub struct LoxError {
    pub line: Line,
    pub location: String,
    pub message: String,
}

fn at(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" at {location}")
    }
}

impl LoxError {
    pub fn new(line: Line, location: impl ToString, message: impl ToString) -> Self {
        Self { line, location: location.to_string(), message: message.to_string() }
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq, derive_more::Deref, derive_more::DerefMut)]
pub struct LoxErrors(pub Vec<LoxError>);

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl<E: Into<LoxError>> FromIterator<E> for LoxErrors {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<E: Into<LoxError>> Extend<E> for LoxErrors {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into))
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

pub type Result<T> = std::result::Result<T, LoxError>;
