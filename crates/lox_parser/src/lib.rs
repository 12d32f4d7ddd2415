pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use error::SyntaxError;

/// Lex and parse `source` into a program, collecting every syntax error.
pub fn parse(source: &str) -> Result<ast::Program, Vec<SyntaxError>> {
    parser::Parser::new(lexer::Lexer::new(source)).parse_program()
}
