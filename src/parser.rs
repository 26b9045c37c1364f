// ABOUTME: Recursive-descent parser building the AST from a token stream

use crate::ast::{BinaryOp, Expr, Literal, LogicalOp, Program, Stmt};
use crate::error::ScriptError;
use crate::lexer::Lexer;
use crate::token::Token;
use std::rc::Rc;

/// Lexes and parses a complete source text into a program.
pub fn parse(source: &str) -> Result<Program, ScriptError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

/// Single-token-lookahead parser over the full token vector. Statements
/// beginning with an identifier additionally peek one token past it to
/// tell assignment from call.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last() != Some(&Token::Eof) {
            tokens.push(Token::Eof);
        }
        Parser {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> &Token {
        // The vector always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    /// Asserts the current token equals `expected` and consumes it.
    fn expect(&mut self, expected: Token) -> Result<(), ScriptError> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(ScriptError::unexpected_token(
                format!("'{}'", expected),
                self.current(),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ScriptError> {
        match self.current() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(ScriptError::unexpected_token("an identifier", other)),
        }
    }

    fn expect_string(&mut self) -> Result<String, ScriptError> {
        match self.current() {
            Token::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(text)
            }
            other => Err(ScriptError::unexpected_token("a string literal", other)),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ScriptError> {
        let mut body = Vec::new();
        while *self.current() != Token::Eof {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.current() {
            Token::Let => self.parse_var_decl(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::Function => self.parse_function_decl(),
            Token::Return => {
                self.advance();
                let argument = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Return(argument))
            }
            Token::Print => {
                self.advance();
                self.expect(Token::LeftParen)?;
                let argument = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Print(argument))
            }
            Token::Import => {
                self.advance();
                self.expect(Token::LeftParen)?;
                let path = self.expect_string()?;
                self.expect(Token::RightParen)?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Import(path))
            }
            Token::LeftBrace => self.parse_block(),
            Token::Identifier(_) => self.parse_identifier_statement(),
            other => Err(ScriptError::unexpected_token("a statement", other)),
        }
    }

    /// A statement opening with a bare identifier is either an assignment
    /// or a call; anything else after the identifier is an error.
    fn parse_identifier_statement(&mut self) -> Result<Stmt, ScriptError> {
        let name = self.expect_identifier()?;
        match self.current() {
            Token::Assign => {
                self.advance();
                let value = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Assign { name, value })
            }
            Token::LeftParen => {
                let call = self.parse_call(name)?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Expr(call))
            }
            other => Err(ScriptError::unexpected_token("'=' or '('", other)),
        }
    }

    fn parse_block(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(Token::LeftBrace)?;
        let mut body = Vec::new();
        while *self.current() != Token::RightBrace && *self.current() != Token::Eof {
            body.push(self.parse_statement()?);
        }
        self.expect(Token::RightBrace)?;
        Ok(Stmt::Block(body))
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(Token::Let)?;
        let name = self.expect_identifier()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::VarDecl { name, value })
    }

    fn parse_if(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(Token::If)?;
        self.expect(Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        let consequent = Box::new(self.parse_statement()?);

        let alternate = if *self.current() == Token::Else {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(Token::While)?;
        self.expect(Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { test, body })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(Token::Function)?;
        let name = self.expect_identifier()?;
        self.expect(Token::LeftParen)?;

        let mut params = Vec::new();
        if *self.current() != Token::RightParen {
            params.push(self.expect_identifier()?);
            while *self.current() == Token::Comma {
                self.advance();
                params.push(self.expect_identifier()?);
            }
        }
        self.expect(Token::RightParen)?;

        let body = Rc::new(self.parse_statement()?);
        Ok(Stmt::FunctionDecl { name, params, body })
    }

    /// Argument list of a call whose callee name was already consumed.
    fn parse_call(&mut self, callee: String) -> Result<Expr, ScriptError> {
        self.expect(Token::LeftParen)?;

        let mut arguments = Vec::new();
        if *self.current() != Token::RightParen {
            arguments.push(self.parse_expression()?);
            while *self.current() == Token::Comma {
                self.advance();
                arguments.push(self.parse_expression()?);
            }
        }
        self.expect(Token::RightParen)?;

        Ok(Expr::Call { callee, arguments })
    }

    // Expression cascade, lowest precedence first. Every level is
    // left-associative.

    fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_logical_and()?;
        while *self.current() == Token::Or {
            self.advance();
            let right = self.parse_logical_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_equality()?;
        while *self.current() == Token::And {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current() {
                Token::Equals => BinaryOp::Eq,
                Token::NotEquals => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.current() {
                Token::Greater => BinaryOp::Gt,
                Token::GreaterEqual => BinaryOp::Ge,
                Token::Less => BinaryOp::Lt,
                Token::LessEqual => BinaryOp::Le,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_addition()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_addition(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplication(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_primary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_primary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        match self.current().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            Token::Identifier(name) => {
                self.advance();
                if *self.current() == Token::LeftParen {
                    return self.parse_call(name);
                }
                Ok(Expr::Identifier(name))
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            other => Err(ScriptError::unexpected_token("an expression", other)),
        }
    }
}
