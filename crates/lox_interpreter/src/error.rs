use thiserror::Error;

use crate::object::Object;
use lox_parser::span::Span;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    /// When reading or assigning a name that no enclosing scope declares
    #[error("undefined name '{name}'")]
    UndefinedName { name: String },
    /// When an operator is applied to values it does not support (e.g. `1 + true`, `-"a"`)
    #[error("unsupported operand type(s) for {operator} operator: {}", describe(.operands))]
    TypeMismatch {
        operator: String,
        operands: Vec<Object>,
    },
    /// When a value that is not a function is used with call syntax
    #[error("`{}` ({callee}) is not callable", .callee.typename())]
    NotCallable { callee: Object },
    /// When a call's argument count does not match the function's parameter count
    #[error("expected {expected} argument(s) but got {got}")]
    ArityMismatch { expected: usize, got: usize },
    /// When reading a record field that was never set
    #[error("undefined attribute '{field}'")]
    NoSuchAttribute { field: String },
    #[error("division by zero")]
    DivisionByZero,
    /// When nested calls go deeper than the evaluator allows
    #[error("maximum call depth of {depth} exceeded")]
    StackOverflow { depth: usize },
}

/// A runtime fault, with the source location of the name, operator or call that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", location(.span))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Option<Span>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError { kind, span: None }
    }

    /// Attach `span` unless a more precise location is already known.
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        RuntimeError::new(kind)
    }
}

fn describe(operands: &[Object]) -> String {
    operands
        .iter()
        .map(|obj| format!("`{}` ({})", obj.typename(), obj.to_code_string()))
        .collect::<Vec<String>>()
        .join(" and ")
}

fn location(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" {}", span.at_str()),
        None => String::new(),
    }
}
