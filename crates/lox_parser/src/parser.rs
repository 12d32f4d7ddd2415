use std::rc::Rc;

use log::trace;

use crate::ast::{
    AssignExpression, BinaryExpression, BinaryOperator, BlockStatement, CallExpression,
    Expression, FunctionDeclaration, GetExpression, IfStatement, Literal, LogicalExpression,
    LogicalOperator, Program, SetExpression, Statement, UnaryExpression, UnaryOperator,
    WhileStatement,
};
use crate::error::{ParseResult, SyntaxError, MAX_ARGUMENTS, MAX_NESTING};
use crate::lexer::Lexer;
use crate::span::{Span, WithSpan};
use crate::token::Token;

// Room left on the native stack before a nested parse moves to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Recursive descent parser.
///
/// `current_token` is always the next token that has not been consumed yet. Syntax errors
/// are collected: after each one the parser skips to the next statement boundary and keeps
/// going, so a single pass reports every independent error.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: WithSpan<Token>,
    previous_span: Span,

    /// How many function bodies enclose the current position
    function_depth: usize,
    /// How many blocks enclose the current position
    block_depth: usize,
    /// How many statements, expressions and unary operators are open
    nesting: usize,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
        let mut parser = Parser {
            lexer,
            current_token: WithSpan::empty(Token::Eof),
            previous_span: Span::default(),
            function_depth: 0,
            block_depth: 0,
            nesting: 0,
            errors: Vec::new(),
        };
        parser.next_token();
        parser
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut program = Program::new();

        while !self.current_token_is(&Token::Eof) {
            if let Some(statement) = self.parse_declaration_or_recover() {
                program.statements.push(statement);
            }
        }

        if !self.errors.is_empty() {
            return Err(std::mem::take(&mut self.errors));
        }

        Ok(program)
    }

    /// Parse one declaration; on failure, record the error and skip to the next statement.
    fn parse_declaration_or_recover(&mut self) -> Option<Statement> {
        match self.parse_declaration() {
            Ok(statement) => Some(statement),
            Err(error) => {
                trace!("recovering from syntax error: {}", error);
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    /// Skip tokens until just after a `;` or just before a token that starts a statement.
    ///
    /// Inside a block, a `}` is left for the block to close.
    fn synchronize(&mut self) {
        loop {
            let skipped = self.current_token.value.clone();
            match skipped {
                Token::Eof => return,
                Token::RightBrace if self.block_depth > 0 => return,
                _ => {}
            }

            self.next_token();

            if skipped == Token::Semicolon || self.current_token.value.starts_statement() {
                return;
            }
        }
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Var => self.parse_var_declaration(),
            Token::Fun => self.parse_function_declaration(),
            _ => self.parse_statement(),
        }
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Statement> {
        // Consume the `var` token
        self.next_token();

        let name = self.expect_identifier("variable name")?;

        let initializer = if self.current_token_is(&Token::Equal) {
            self.next_token();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(Token::Semicolon, "';' after variable declaration")?;

        Ok(Statement::Var { name, initializer })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        // Consume the `fun` token
        self.next_token();

        let name = self.expect_identifier("function name")?;
        self.expect(Token::LeftParen, "'(' after function name")?;

        let mut parameters = Vec::new();
        if !self.current_token_is(&Token::RightParen) {
            loop {
                if parameters.len() >= MAX_ARGUMENTS {
                    self.errors.push(SyntaxError::TooManyArguments {
                        span: self.current_token.span,
                    });
                }
                parameters.push(self.expect_identifier("parameter name")?);

                if !self.current_token_is(&Token::Comma) {
                    break;
                }
                self.next_token();
            }
        }

        self.expect(Token::RightParen, "')' after parameters")?;

        if !self.current_token_is(&Token::LeftBrace) {
            return Err(self.unexpected("'{' before function body"));
        }

        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;

        Ok(Statement::Function(Rc::new(FunctionDeclaration {
            name,
            parameters,
            body: body?,
        })))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.nested(|parser| match parser.current_token.value {
            Token::Print => parser.parse_print_statement(),
            Token::If => parser.parse_if_statement(),
            Token::While => parser.parse_while_statement(),
            Token::For => parser.parse_for_statement(),
            Token::Return => parser.parse_return_statement(),
            Token::LeftBrace => Ok(Statement::Block(parser.parse_block()?)),
            _ => parser.parse_expression_statement(),
        })
    }

    fn parse_print_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `print` token
        self.next_token();

        let expression = self.parse_expression()?;
        self.expect(Token::Semicolon, "';' after value")?;

        Ok(Statement::Print { expression })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `if` token
        self.next_token();

        self.expect(Token::LeftParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(Token::RightParen, "')' after if condition")?;

        let consequence = self.parse_statement()?;

        // The `else` belongs to the innermost `if` that is still open
        let alternative = if self.current_token_is(&Token::Else) {
            self.next_token();
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(Statement::If(Box::new(IfStatement {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `while` token
        self.next_token();

        self.expect(Token::LeftParen, "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(Token::RightParen, "')' after condition")?;

        let body = self.parse_statement()?;

        Ok(Statement::While(Box::new(WhileStatement { condition, body })))
    }

    /// Parse a `for` loop and lower it to `{ init; while (cond) { body; incr; } }`.
    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `for` token
        self.next_token();

        self.expect(Token::LeftParen, "'(' after 'for'")?;

        let initializer = match self.current_token.value {
            Token::Semicolon => {
                self.next_token();
                None
            }
            Token::Var => Some(self.parse_var_declaration()?),
            _ => Some(self.parse_expression_statement()?),
        };

        let condition = if self.current_token_is(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semicolon, "';' after loop condition")?;

        let increment = if self.current_token_is(&Token::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::RightParen, "')' after for clauses")?;

        let mut body = self.parse_statement()?;

        if let Some(increment) = increment {
            body = Statement::Block(BlockStatement {
                statements: vec![
                    body,
                    Statement::Expression {
                        expression: increment,
                    },
                ],
            });
        }

        let condition = condition.unwrap_or(Expression::Literal(Literal::Boolean(true)));
        body = Statement::While(Box::new(WhileStatement { condition, body }));

        if let Some(initializer) = initializer {
            body = Statement::Block(BlockStatement {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let span = self.current_token.span;
        // Consume the `return` token
        self.next_token();

        if self.function_depth == 0 {
            return Err(SyntaxError::IllegalReturnOutsideFunction { span });
        }

        let value = if self.current_token_is(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semicolon, "';' after return value")?;

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression()?;
        self.expect(Token::Semicolon, "';' after expression")?;

        Ok(Statement::Expression { expression })
    }

    /// Parse `{ declarations... }`. Expects the current token to be the opening brace.
    fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        self.nested(|parser| {
            let opening = parser.current_token.span;
            // Consume the `{` token
            parser.next_token();

            let mut statements = Vec::new();

            parser.block_depth += 1;
            while !parser.current_token_is(&Token::RightBrace) {
                if parser.current_token_is(&Token::Eof) {
                    parser.block_depth -= 1;
                    return Err(SyntaxError::UnterminatedBlock { span: opening });
                }

                if let Some(statement) = parser.parse_declaration_or_recover() {
                    statements.push(statement);
                }
            }
            parser.block_depth -= 1;

            // Consume the `}` token
            parser.next_token();

            Ok(BlockStatement { statements })
        })
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment()
    }

    /// Assignment is right-associative: `a = b = c` is `a = (b = c)`.
    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let target = self.nested(Self::parse_or)?;

        if !self.current_token_is(&Token::Equal) {
            return Ok(target);
        }

        let equals = self.current_token.span;
        self.next_token();
        let value = self.nested(Self::parse_assignment)?;

        match target {
            Expression::Variable(name) => {
                Ok(Expression::Assign(Box::new(AssignExpression { name, value })))
            }
            Expression::Get(get) => {
                let GetExpression { object, field } = *get;
                Ok(Expression::Set(Box::new(SetExpression {
                    object,
                    field,
                    value,
                })))
            }
            _ => Err(SyntaxError::IllegalAssignTarget { span: equals }),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;

        while self.current_token_is(&Token::Or) {
            self.next_token();
            let right = self.parse_and()?;
            left = Expression::Logical(Box::new(LogicalExpression {
                left,
                operator: LogicalOperator::Or,
                right,
            }));
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_equality()?;

        while self.current_token_is(&Token::And) {
            self.next_token();
            let right = self.parse_equality()?;
            left = Expression::Logical(Box::new(LogicalExpression {
                left,
                operator: LogicalOperator::And,
                right,
            }));
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            &[BinaryOperator::Equal, BinaryOperator::NotEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            &[
                BinaryOperator::Greater,
                BinaryOperator::GreaterEqual,
                BinaryOperator::Less,
                BinaryOperator::LessEqual,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            &[BinaryOperator::Add, BinaryOperator::Subtract],
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            &[BinaryOperator::Multiply, BinaryOperator::Divide],
            Self::parse_unary,
        )
    }

    /// Parse a left-associative chain of `operators` between operands parsed by `operand`.
    fn parse_binary(
        &mut self,
        operators: &[BinaryOperator],
        operand: fn(&mut Parser<'a>) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut left = operand(self)?;

        loop {
            let operator = match BinaryOperator::from_token(&self.current_token.value) {
                Some(operator) if operators.contains(&operator) => {
                    WithSpan::new(operator, self.current_token.span)
                }
                _ => break,
            };
            self.next_token();

            let right = operand(self)?;
            left = Expression::Binary(Box::new(BinaryExpression {
                left,
                operator,
                right,
            }));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let operator = match self.current_token.value {
            Token::Bang => UnaryOperator::Not,
            Token::Minus => UnaryOperator::Negate,
            _ => return self.parse_call(),
        };
        let operator = WithSpan::new(operator, self.current_token.span);
        self.next_token();

        let right = self.nested(Self::parse_unary)?;

        Ok(Expression::Unary(Box::new(UnaryExpression { operator, right })))
    }

    /// Parse a primary followed by any mix of `(args)` and `.name` suffixes, left to right.
    fn parse_call(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_primary()?;

        loop {
            match self.current_token.value {
                Token::LeftParen => {
                    let opening = self.current_token.span;
                    self.next_token();
                    let arguments = self.parse_arguments()?;
                    let closing = self.expect(Token::RightParen, "')' after arguments")?;

                    expression = Expression::Call(Box::new(CallExpression {
                        callee: expression,
                        arguments: WithSpan::new(arguments, opening.to(closing)),
                    }));
                }
                Token::Dot => {
                    self.next_token();
                    let field = self.expect_identifier("property name after '.'")?;

                    expression = Expression::Get(Box::new(GetExpression {
                        object: expression,
                        field,
                    }));
                }
                _ => break,
            }
        }

        Ok(expression)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.current_token_is(&Token::RightParen) {
            return Ok(arguments);
        }

        loop {
            if arguments.len() >= MAX_ARGUMENTS {
                self.errors.push(SyntaxError::TooManyArguments {
                    span: self.current_token.span,
                });
            }
            arguments.push(self.parse_expression()?);

            if !self.current_token_is(&Token::Comma) {
                break;
            }
            self.next_token();
        }

        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let expression = match &self.current_token.value {
            Token::Number(value) => Expression::Literal(Literal::Number(*value)),
            Token::String(value) => Expression::Literal(Literal::String(value.clone())),
            Token::True => Expression::Literal(Literal::Boolean(true)),
            Token::False => Expression::Literal(Literal::Boolean(false)),
            Token::Nil => Expression::Literal(Literal::Nil),
            Token::Identifier(name) => {
                Expression::Variable(WithSpan::new(name.clone(), self.current_token.span))
            }
            Token::LeftParen => {
                self.next_token();
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen, "')' after expression")?;
                return Ok(Expression::Grouping(Box::new(inner)));
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.next_token();
        Ok(expression)
    }

    /// Run `parse` one nesting level deeper, failing once `MAX_NESTING` levels are open.
    ///
    /// Every recursive path of the grammar goes through here, so this is also where the native
    /// stack is grown when deep input gets close to its end.
    fn nested<T, F>(&mut self, parse: F) -> ParseResult<T>
    where
        F: FnOnce(&mut Parser<'a>) -> ParseResult<T>,
    {
        if self.nesting >= MAX_NESTING {
            return Err(SyntaxError::TooDeeplyNested {
                span: self.current_token.span,
            });
        }

        self.nesting += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || parse(self));
        self.nesting -= 1;

        result
    }

    /// Advance to the next token. Lexical errors are recorded and the offending input skipped.
    fn next_token(&mut self) {
        self.previous_span = self.current_token.span;

        loop {
            match self.lexer.next_token() {
                Ok(token) => {
                    self.current_token = token;
                    return;
                }
                Err(error) => self.errors.push(SyntaxError::Lex(error)),
            }
        }
    }

    fn current_token_is(&self, token: &Token) -> bool {
        match (token, &self.current_token.value) {
            (Token::Identifier(_), Token::Identifier(_)) => true,
            (Token::Number(_), Token::Number(_)) => true,
            (Token::String(_), Token::String(_)) => true,
            _ => token == &self.current_token.value,
        }
    }

    /// Consume the current token if it is `token`, returning its span.
    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<Span> {
        if self.current_token_is(&token) {
            self.next_token();
            Ok(self.previous_span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<WithSpan<String>> {
        let name = match &self.current_token.value {
            Token::Identifier(name) => WithSpan::new(name.to_owned(), self.current_token.span),
            _ => return Err(self.unexpected(expected)),
        };

        self.next_token();
        Ok(name)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.to_owned(),
            found: self.current_token.value.clone(),
            span: self.current_token.span,
        }
    }
}
