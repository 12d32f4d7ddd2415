pub mod builtin;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod object;
pub mod sink;

pub use environment::Environment;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use evaluator::Evaluator;
pub use object::Object;

use lox_parser::SyntaxError;
use thiserror::Error;

/// Anything that can stop a program from running to completion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{} syntax error(s), first: {}", .0.len(), first(.0))]
    Syntax(Vec<SyntaxError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<Vec<SyntaxError>> for Error {
    fn from(errors: Vec<SyntaxError>) -> Self {
        Error::Syntax(errors)
    }
}

fn first(errors: &[SyntaxError]) -> String {
    errors
        .first()
        .map(|err| err.to_string())
        .unwrap_or_default()
}

/// Parse and run `source` with a fresh global scope and the `record` and `clock` builtins,
/// returning every printed line alongside the outcome.
///
/// Nothing runs when the source has syntax errors. Lines printed before a runtime error are kept.
/// # Examples
/// ```rust
/// let (output, result) = lox_interpreter::interpret("print 1 + 2;");
///
/// assert_eq!(output, vec!["3"]);
/// assert!(result.is_ok());
/// ```
pub fn interpret(source: &str) -> (Vec<String>, Result<(), Error>) {
    let mut output = Vec::new();

    let result = match lox_parser::parse(source) {
        Ok(prog) => {
            let mut evaluator = Evaluator::new(&mut output);
            evaluator.define_builtin(builtin::record());
            evaluator.define_builtin(builtin::clock());

            evaluator.eval(&prog).map(|_| ()).map_err(Error::from)
        }
        Err(errors) => Err(Error::from(errors)),
    };

    (output, result)
}
