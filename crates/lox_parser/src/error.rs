use thiserror::Error;

use crate::lexer::LexError;
use crate::span::Span;
use crate::token::Token;

/// Most parameters a function may declare and most arguments a call may pass.
pub const MAX_ARGUMENTS: usize = 255;

/// How deeply statements and expressions may nest inside one another.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    /// When the next token is not one the grammar allows here
    #[error("expected {expected} but got {found} {}", .span.at_str())]
    UnexpectedToken {
        expected: String,
        found: Token,
        span: Span,
    },
    /// When the left side of `=` is neither a name nor an attribute access (e.g. `1 = 2`)
    #[error("invalid assignment target {}", .span.at_str())]
    IllegalAssignTarget { span: Span },
    /// When `return` appears outside of any function body
    #[error("cannot return from top-level code {}", .span.at_str())]
    IllegalReturnOutsideFunction { span: Span },
    /// When input ends before a `{` is closed; the span is that of the opening brace
    #[error("expected '}}' to close the block opened {}", .span.at_str())]
    UnterminatedBlock { span: Span },
    #[error("cannot have more than {} parameters or arguments {}", MAX_ARGUMENTS, .span.at_str())]
    TooManyArguments { span: Span },
    /// When blocks, groupings or unary operators nest deeper than `MAX_NESTING`
    #[error("nesting is deeper than {} levels {}", MAX_NESTING, .span.at_str())]
    TooDeeplyNested { span: Span },
    #[error(transparent)]
    Lex(#[from] LexError),
}

pub type ParseResult<T> = Result<T, SyntaxError>;
