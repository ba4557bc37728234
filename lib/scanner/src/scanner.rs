use cursor::{Cursor, Line};
use errors::LoxError;
use itertools::{Either, Itertools};

pub mod token;
pub use token::{Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Unterminated block comment.")]
    UnterminatedBlockComment,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

impl ScanError {
    fn new(error: ScanErrorType, line: Line) -> Self {
        Self { error, line }
    }
}

impl From<ScanError> for LoxError {
    fn from(e: ScanError) -> Self {
        LoxError::new(e.line, "", e.error)
    }
}

/// Lazily scans a source string. Yields every token in order followed by a single `Eof`;
/// lexical errors are yielded in place and scanning continues after them.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), done: false }
    }

    fn token(&self, data: TokenData<'a>, start: &Cursor<'a>) -> Token<'a> {
        Token::new(data, start.slice_until(&self.cursor), self.cursor.line())
    }

    fn error(&self, error: ScanErrorType) -> ScanError {
        ScanError::new(error, self.cursor.line())
    }

    fn either(&mut self, expected: char, matched: TokenData<'a>, otherwise: TokenData<'a>) -> TokenData<'a> {
        if self.cursor.next_if_eq(expected) {
            matched
        } else {
            otherwise
        }
    }

    fn string(&mut self, start: &Cursor<'a>) -> Result<Token<'a>, ScanError> {
        self.cursor.advance_while(|c| c != '"');
        if !self.cursor.next_if_eq('"') {
            return Err(self.error(ScanErrorType::UnterminatedString));
        }

        let lexeme = start.slice_until(&self.cursor);
        Ok(self.token(Str(&lexeme[1..lexeme.len() - 1]), start))
    }

    fn number(&mut self, start: &Cursor<'a>) -> Token<'a> {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        // A trailing '.' is not part of the number
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.next();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }

        let value = start.slice_until(&self.cursor).parse().expect("digits always parse as f64");
        self.token(Number(value), start)
    }

    fn identifier(&mut self, start: &Cursor<'a>) -> Token<'a> {
        self.cursor.advance_while(is_alphanumeric);
        let data = TokenData::keyword(start.slice_until(&self.cursor)).unwrap_or(Identifier);
        self.token(data, start)
    }

    fn block_comment(&mut self) -> Result<(), ScanError> {
        loop {
            match self.cursor.next() {
                Some('*') if self.cursor.next_if_eq('/') => return Ok(()),
                Some(_) => (),
                None => return Err(self.error(ScanErrorType::UnterminatedBlockComment)),
            }
        }
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

impl<'a> TokenStream<'a> {
    fn scan_token(&mut self) -> Result<Token<'a>, ScanError> {
        loop {
            let start = self.cursor.clone();
            let Some(c) = self.cursor.next() else {
                self.done = true;
                return Ok(self.token(Eof, &start));
            };

            let data = match c {
                '(' => LeftParen,
                ')' => RightParen,
                '{' => LeftBrace,
                '}' => RightBrace,
                ',' => Comma,
                '.' => Dot,
                '-' => Minus,
                '+' => Plus,
                ';' => Semicolon,
                '*' => Star,

                '!' => self.either('=', BangEqual, Bang),
                '=' => self.either('=', EqualEqual, Equal),
                '<' => self.either('=', LessEqual, Less),
                '>' => self.either('=', GreaterEqual, Greater),

                '/' if self.cursor.next_if_eq('/') => {
                    self.cursor.advance_while(|c| c != '\n');
                    continue;
                }
                '/' if self.cursor.next_if_eq('*') => {
                    self.block_comment()?;
                    continue;
                }
                '/' => Slash,

                ' ' | '\r' | '\t' | '\n' => continue,

                '"' => return self.string(&start),
                d if d.is_ascii_digit() => return Ok(self.number(&start)),
                c if is_alpha(c) => return Ok(self.identifier(&start)),

                c => return Err(self.error(ScanErrorType::UnexpectedCharacter(c))),
            };

            return Ok(self.token(data, &start));
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.scan_token();
        match &result {
            Ok(token) => {
                log::trace!("Scanned {:?} '{}' on line {}", token.ty(), token.lexeme(), token.line())
            }
            Err(e) => log::debug!("{e}"),
        }
        Some(result)
    }
}

/// Scans the whole source, separating the tokens from the lexical errors.
pub fn scan_tokens(source: &str) -> (Vec<Token<'_>>, Vec<ScanError>) {
    TokenStream::new(source).partition_map(|result| match result {
        Ok(token) => Either::Left(token),
        Err(error) => Either::Right(error),
    })
}
