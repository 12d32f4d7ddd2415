//! Syntax tree shared by the parser and the evaluator.
//!
//! The `Display` impls print valid source: parsing the printed form of a parsed
//! program yields an equal tree.

use crate::span::WithSpan;
use crate::token::Token;
use std::{fmt::Display, rc::Rc};

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .statements
            .iter()
            .map(|stmt| stmt.to_string())
            .collect::<Vec<String>>()
            .join("\n");

        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Var {
        /// The name/identifier of the variable
        name: WithSpan<String>,
        /// The value being assigned, `nil` when absent
        initializer: Option<Expression>,
    },
    Function(Rc<FunctionDeclaration>),
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
    Print {
        expression: Expression,
    },
    If(Box<IfStatement>),
    While(Box<WhileStatement>),
    Block(BlockStatement),
    Return {
        /// The value being returned, `nil` when absent
        value: Option<Expression>,
    },
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Var {
                name,
                initializer: Some(value),
            } => write!(
                f,
                "{tok} {ident} = {val};",
                tok = Token::Var,
                ident = name,
                val = value
            ),
            Var {
                name,
                initializer: None,
            } => write!(f, "{} {};", Token::Var, name),
            Function(func) => write!(f, "{}", func),
            Expression { expression } => write!(f, "{};", expression),
            Print { expression } => write!(f, "{} {};", Token::Print, expression),
            If(if_stmt) => write!(f, "{}", if_stmt),
            While(while_stmt) => write!(f, "{}", while_stmt),
            Block(block) => write!(f, "{}", block),
            Return { value: Some(value) } => write!(f, "{} {};", Token::Return, value),
            Return { value: None } => write!(f, "{};", Token::Return),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.statements {
            write!(f, " {}", stmt)?;
        }
        write!(f, " }}")
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionDeclaration {
    pub name: WithSpan<String>,
    /// Parameter identifiers, in declaration order
    pub parameters: Vec<WithSpan<String>>,
    pub body: BlockStatement,
}

impl Display for FunctionDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}({}) {}",
            Token::Fun,
            self.name,
            self.parameters
                .iter()
                .map(|param| param.to_string())
                .collect::<Vec<String>>()
                .join(", "),
            self.body
        )
    }
}

#[derive(Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    /// Statement to run if condition is truthy
    pub consequence: Statement,
    /// Statement to run if condition is falsy
    pub alternative: Option<Statement>,
}

impl Display for IfStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if ({}) {}", self.condition, self.consequence)?;

        if let Some(ref alt) = self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Statement,
}

impl Display for WhileStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while ({}) {}", self.condition, self.body)
    }
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(WithSpan<String>),
    Assign(Box<AssignExpression>),
    Get(Box<GetExpression>),
    Set(Box<SetExpression>),
    Logical(Box<LogicalExpression>),
    Binary(Box<BinaryExpression>),
    Unary(Box<UnaryExpression>),
    Call(Box<CallExpression>),
    Grouping(Box<Expression>),
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Literal(literal) => write!(f, "{}", literal),
            Variable(name) => write!(f, "{}", name),
            Assign(assign) => write!(f, "{}", assign),
            Get(get) => write!(f, "{}", get),
            Set(set) => write!(f, "{}", set),
            Logical(logical) => write!(f, "{}", logical),
            Binary(binary) => write!(f, "{}", binary),
            Unary(unary) => write!(f, "{}", unary),
            Call(call) => write!(f, "{}", call),
            Grouping(inner) => write!(f, "({})", inner),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(value) => write!(f, "{}", Token::Number(*value)),
            Literal::String(value) => write!(f, "\"{}\"", value),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Nil => write!(f, "{}", Token::Nil),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct AssignExpression {
    pub name: WithSpan<String>,
    pub value: Expression,
}

impl Display for AssignExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

#[derive(Debug, PartialEq)]
pub struct GetExpression {
    pub object: Expression,
    pub field: WithSpan<String>,
}

impl Display for GetExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.object, self.field)
    }
}

#[derive(Debug, PartialEq)]
pub struct SetExpression {
    pub object: Expression,
    pub field: WithSpan<String>,
    pub value: Expression,
}

impl Display for SetExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} = {}", self.object, self.field, self.value)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

impl Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "{}", Token::And),
            LogicalOperator::Or => write!(f, "{}", Token::Or),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct LogicalExpression {
    pub left: Expression,
    pub operator: LogicalOperator,
    pub right: Expression,
}

impl Display for LogicalExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn from_token(token: &Token) -> Option<BinaryOperator> {
        use BinaryOperator::*;

        match token {
            Token::Plus => Some(Add),
            Token::Minus => Some(Subtract),
            Token::Star => Some(Multiply),
            Token::Slash => Some(Divide),
            Token::EqualEqual => Some(Equal),
            Token::BangEqual => Some(NotEqual),
            Token::LessThan => Some(Less),
            Token::LessEqual => Some(LessEqual),
            Token::GreaterThan => Some(Greater),
            Token::GreaterEqual => Some(GreaterEqual),
            _ => None,
        }
    }

    pub fn token(&self) -> Token {
        use BinaryOperator::*;

        match self {
            Add => Token::Plus,
            Subtract => Token::Minus,
            Multiply => Token::Star,
            Divide => Token::Slash,
            Equal => Token::EqualEqual,
            NotEqual => Token::BangEqual,
            Less => Token::LessThan,
            LessEqual => Token::LessEqual,
            Greater => Token::GreaterThan,
            GreaterEqual => Token::GreaterEqual,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, PartialEq)]
pub struct BinaryExpression {
    pub left: Expression,
    pub operator: WithSpan<BinaryOperator>,
    pub right: Expression,
}

impl Display for BinaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{l} {op} {r}",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "{}", Token::Minus),
            UnaryOperator::Not => write!(f, "{}", Token::Bang),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct UnaryExpression {
    pub operator: WithSpan<UnaryOperator>,
    pub right: Expression,
}

impl Display for UnaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{op}{r}", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq)]
pub struct CallExpression {
    pub callee: Expression,
    /// Arguments, spanning from the opening to the closing parenthesis
    pub arguments: WithSpan<Vec<Expression>>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})",
            self.callee,
            self.arguments
                .value
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
