mod expr;
mod stmt;

use std::{iter::Peekable, vec};

use cursor::Line;
use errors::{LoxError, LoxErrors};
pub use expr::{Expr, LiteralValue};
use scanner::{Token, TokenData, TokenType};
pub use stmt::Stmt;

use TokenType::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error at {at}: {error}")]
pub struct ParserError {
    pub error: ParserErrorType,
    pub line: Line,
    pub at: String,
}

impl From<ParserError> for LoxError {
    fn from(e: ParserError) -> Self {
        LoxError::new(e.line, e.at, e.error)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ';' after {0}.")]
    ExpectedSemicolonAfter(&'static str),
    #[error("Expect variable name.")]
    ExpectedVariableName,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect '}}' after block.")]
    ExpectedRightBrace,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
}

impl ParserErrorType {
    fn at(self, token: &Token) -> ParserError {
        ParserError {
            error: self,
            line: token.line(),
            at: match token.ty() {
                Eof => "end".to_string(),
                _ => format!("'{}'", token.lexeme()),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// Recursive descent parser with one token of lookahead.
///
/// A syntax error inside a declaration is recorded and the parser skips ahead to the next
/// statement boundary, so a single pass reports every independent error.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Peekable<vec::IntoIter<Token<'a>>>,
    /// Number of tokens consumed so far.
    position: usize,
    errors: LoxErrors,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.last().map(Token::ty) != Some(Eof) {
            let line = tokens.last().map_or(Line(1), Token::line);
            tokens.push(Token::new(TokenData::Eof, "", line));
        }
        Self { tokens: tokens.into_iter().peekable(), position: 0, errors: LoxErrors::default() }
    }

    pub fn parse(mut self) -> std::result::Result<Vec<Stmt<'a>>, LoxErrors> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }

        if self.errors.is_empty() {
            Ok(stmts)
        } else {
            Err(self.errors)
        }
    }

    fn declaration(&mut self) -> Option<Stmt<'a>> {
        let start = self.position;
        let result = if self.consume(Var).is_ok() { self.var_declaration() } else { self.statement() };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                log::debug!("Hit error: {:?}, syncing...", e);
                self.errors.push(e.into());
                self.synchronize(start);
                None
            }
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name = self.consume_or_error(Identifier, ParserErrorType::ExpectedVariableName)?;

        let initializer = match self.consume(Equal) {
            Ok(_) => Some(self.expression()?),
            Err(_) => None,
        };

        self.consume_or_error(
            Semicolon,
            ParserErrorType::ExpectedSemicolonAfter("variable declaration"),
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt<'a>> {
        if self.consume(Print).is_ok() {
            return self.print_statement();
        }

        if self.consume(LeftBrace).is_ok() {
            return self.block();
        }

        self.expression_statement()
    }

    fn block(&mut self) -> Result<Stmt<'a>> {
        let mut stmts = Vec::new();

        while !matches!(self.peek(), RightBrace | Eof) {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }

        self.consume_or_error(RightBrace, ParserErrorType::ExpectedRightBrace)?;
        Ok(Stmt::Block(stmts))
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfter("value"))?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfter("expression"))?;

        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr<'a>> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr<'a>> {
        let expr = self.equality()?;

        let Ok(equals) = self.consume(Equal) else {
            return Ok(expr);
        };

        let value = self.assignment()?;

        match expr {
            Expr::Variable(name) => Ok(Expr::assign(name, value)),
            expr => {
                // The parser is still in a known state, so report without synchronizing
                self.errors.push(ParserErrorType::InvalidAssignmentTarget.at(&equals).into());
                Ok(expr)
            }
        }
    }

    fn equality(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek() {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek() {
            let operator = self.advance();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.factor()?;

        while let Plus | Minus = self.peek() {
            let operator = self.advance();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.unary()?;

        while let Star | Slash = self.peek() {
            let operator = self.advance();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'a>> {
        if let Minus | Bang = self.peek() {
            let operator = self.advance();
            let right = self.unary()?;
            return Ok(Expr::unary(operator, right));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        let data = self.peek_token().data;
        if let Some(literal) = LiteralValue::from_token(data) {
            self.advance();
            return Ok(literal.into());
        }
        match data {
            TokenData::LeftParen => {
                self.advance();
                let expr = self.expression()?;

                self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParen)?;

                Ok(Expr::grouping(expr))
            }
            TokenData::Identifier => Ok(Expr::Variable(self.advance())),

            // The offending token is left for `synchronize`
            _ => Err(ParserErrorType::ExpectedExpression.at(self.peek_token())),
        }
    }

    /// Skips to the next statement boundary: just past a `;`, or before a keyword that starts a
    /// statement. `start` is the position the failed declaration began at; a keyword there is
    /// skipped so that recovery always moves forward.
    fn synchronize(&mut self, start: usize) {
        loop {
            log::trace!("Syncing... {:?}", self.peek_token());
            match self.peek() {
                Eof => return,
                Semicolon => {
                    self.advance();
                    return;
                }
                Class | Fun | Var | For | If | While | Print | Return if self.position > start => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    /// Consumes the next token if it has type `ty`, otherwise returns it without consuming.
    fn consume(&mut self, ty: TokenType) -> std::result::Result<Token<'a>, Token<'a>> {
        if self.peek() == ty {
            Ok(self.advance())
        } else {
            Err(self.peek_token().clone())
        }
    }

    fn consume_or_error(&mut self, ty: TokenType, error: ParserErrorType) -> Result<Token<'a>> {
        self.consume(ty).map_err(|token| error.at(&token))
    }

    fn peek_token(&mut self) -> &Token<'a> {
        self.tokens.peek().expect("token stream always ends with Eof")
    }

    fn peek(&mut self) -> TokenType {
        self.peek_token().ty()
    }

    /// Never moves past `Eof`.
    fn advance(&mut self) -> Token<'a> {
        if self.is_at_end() {
            return self.peek_token().clone();
        }
        self.position += 1;
        self.tokens.next().expect("token stream always ends with Eof")
    }

    fn is_at_end(&mut self) -> bool {
        self.peek() == Eof
    }
}

/// Parses a scanned token sequence into a program.
pub fn parse(tokens: Vec<Token<'_>>) -> std::result::Result<Vec<Stmt<'_>>, LoxErrors> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_source(source: &str) -> std::result::Result<Vec<Stmt<'_>>, LoxErrors> {
        let (tokens, errors) = scanner::scan_tokens(source);
        assert!(errors.is_empty(), "{errors:?}");
        parse(tokens)
    }

    fn parse_expression(source: &str) -> String {
        let stmts = parse_source(source).unwrap();
        match stmts.as_slice() {
            [Stmt::Expression(expr)] => expr.to_string(),
            stmts => panic!("Expected a single expression statement, got {:?}", stmts),
        }
    }

    fn error(line: usize, at: &str, message: &str) -> LoxError {
        LoxError::new(Line(line), at, message)
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(parse_expression("1 - 2 - 3;"), "(- (- 1 2) 3)");
        assert_eq!(parse_expression("8 / 4 / 2;"), "(/ (/ 8 4) 2)");
        assert_eq!(parse_expression("1 == 2 != 3;"), "(!= (== 1 2) 3)");
    }

    #[test]
    fn precedence() {
        assert_eq!(parse_expression("1 + 2 * 3 - 4;"), "(- (+ 1 (* 2 3)) 4)");
        assert_eq!(parse_expression("-1 * -(2 + 3);"), "(* (- 1) (- (group (+ 2 3))))");
        assert_eq!(parse_expression("1 < 2 == 3 >= 4;"), "(== (< 1 2) (>= 3 4))");
        assert_eq!(parse_expression("!!true == false;"), "(== (! (! true)) false)");
        assert_eq!(parse_expression("\"a\" + nil;"), "(+ \"a\" nil)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_expression("a = b = 1 + c;"), "(assign a (assign b (+ 1 c)))");
    }

    #[test]
    fn statements() {
        let stmts = parse_source("var a; var b = 1;\n{ print a; b; }").unwrap();
        assert_eq!(stmts.len(), 3);

        let Stmt::Var { name, initializer: None } = &stmts[0] else {
            panic!("Expected declaration without initializer, got {:?}", stmts[0]);
        };
        assert_eq!(name.lexeme(), "a");

        let Stmt::Var { name, initializer: Some(Expr::Literal(LiteralValue::Number(n))) } =
            &stmts[1]
        else {
            panic!("Expected declaration with initializer, got {:?}", stmts[1]);
        };
        assert_eq!((name.lexeme(), *n), ("b", 1.0));

        let Stmt::Block(inner) = &stmts[2] else {
            panic!("Expected block, got {:?}", stmts[2]);
        };
        assert!(matches!(inner.as_slice(), [Stmt::Print(Expr::Variable(_)), Stmt::Expression(_)]));
    }

    #[test]
    fn empty_program() {
        assert!(parse_source("").unwrap().is_empty());
        assert!(parse(vec![]).unwrap().is_empty());
    }

    #[test]
    fn print_without_semicolon() {
        assert_eq!(
            parse_source("print 1").unwrap_err(),
            LoxErrors(vec![error(1, "end", "Expect ';' after value.")])
        );
    }

    #[test]
    fn missing_semicolon() {
        assert_eq!(
            parse_source("var a = 1").unwrap_err(),
            LoxErrors(vec![error(1, "end", "Expect ';' after variable declaration.")])
        );
        assert_eq!(
            parse_source("1 + 2").unwrap_err(),
            LoxErrors(vec![error(1, "end", "Expect ';' after expression.")])
        );
    }

    #[test]
    fn synchronize_after_error() {
        assert_eq!(
            parse_source("var a = 1 var b = 2;\nvar c = 3").unwrap_err(),
            LoxErrors(vec![
                error(1, "'var'", "Expect ';' after variable declaration."),
                error(2, "end", "Expect ';' after variable declaration."),
            ])
        );

        assert_eq!(
            parse_source("print 1\nprint 2").unwrap_err(),
            LoxErrors(vec![
                error(2, "'print'", "Expect ';' after value."),
                error(2, "end", "Expect ';' after value."),
            ])
        );
    }

    #[test]
    fn synchronize_inside_block() {
        assert_eq!(
            parse_source("{\n var a = 1\n print a;\n print (a;\n}\nprint a;").unwrap_err(),
            LoxErrors(vec![
                error(3, "'print'", "Expect ';' after variable declaration."),
                error(4, "';'", "Expect ')' after expression."),
            ])
        );
    }

    #[test]
    fn invalid_assignment_target_does_not_synchronize() {
        assert_eq!(
            parse_source("a + b = c; (d) = 1; e = f;").unwrap_err(),
            LoxErrors(vec![
                error(1, "'='", "Invalid assignment target."),
                error(1, "'='", "Invalid assignment target."),
            ])
        );
    }

    #[test]
    fn expected_expression() {
        assert_eq!(
            parse_source("var x = ;\nprint;\nvar y = );").unwrap_err(),
            LoxErrors(vec![
                error(1, "';'", "Expect expression."),
                error(2, "';'", "Expect expression."),
                error(3, "')'", "Expect expression."),
            ])
        );

        // Keywords without a statement rule
        assert_eq!(
            parse_source("while;").unwrap_err(),
            LoxErrors(vec![error(1, "'while'", "Expect expression.")])
        );
    }

    #[test]
    fn recovers_before_statements_without_keywords() {
        assert_eq!(
            parse_source("1 + ;\nb = );").unwrap_err(),
            LoxErrors(vec![
                error(1, "';'", "Expect expression."),
                error(2, "')'", "Expect expression."),
            ])
        );

        assert_eq!(
            parse_source("a = ;\n(b;\nc + d;\n-;").unwrap_err(),
            LoxErrors(vec![
                error(1, "';'", "Expect expression."),
                error(2, "';'", "Expect ')' after expression."),
                error(4, "';'", "Expect expression."),
            ])
        );
    }

    #[test]
    fn keyword_at_error_is_skipped() {
        assert_eq!(
            parse_source("if print 1;\nprint 2;").unwrap_err(),
            LoxErrors(vec![error(1, "'if'", "Expect expression.")])
        );
    }

    #[test]
    fn expected_variable_name() {
        assert_eq!(
            parse_source("var 1 = 2;").unwrap_err(),
            LoxErrors(vec![error(1, "'1'", "Expect variable name.")])
        );
    }

    #[test]
    fn unclosed_block() {
        assert_eq!(
            parse_source("{ print 1;").unwrap_err(),
            LoxErrors(vec![error(1, "end", "Expect '}' after block.")])
        );
    }
}
