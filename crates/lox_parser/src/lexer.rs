use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{character}' (at {position})")]
    UnexpectedCharacter { character: char, position: Position },
    #[error("expected closing \" of string literal but reached EOF (string starts at {position})")]
    UnterminatedString { position: Position },
    #[error("invalid number literal '{literal}' (at {position})")]
    InvalidNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;

/// Lazily turns source text into tokens.
///
/// Once `Token::Eof` has been produced, every following call produces `Token::Eof` again;
/// iterating stops right after the first one.
pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: Position,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: Position::default(),
            finished: false,
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Get the character after the next one without consuming anything.
    fn peek_second_char(&self) -> Option<char> {
        let mut ahead = self.input_iter.clone();
        ahead.next();
        ahead.next()
    }

    /// Consume whitespace and `//` comments until something meaningful is found.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else if c == '/' && self.peek_second_char() == Some('/') {
                // Line comment: drop everything up to (not including) the newline
                while let Some(&c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.read_char();
                }
            } else {
                break;
            }
        }
    }

    /// Read the rest of a string literal. Strings have no escape sequences and may span lines.
    fn read_string(&mut self, start: Position) -> LexResult<Token> {
        let mut str = String::new();

        loop {
            match self.read_char() {
                Some('"') => break,
                Some(ch) => str.push(ch),
                None => return Err(LexError::UnterminatedString { position: start }),
            }
        }

        Ok(Token::String(str))
    }

    /// Read the current and following characters as a number token.
    ///
    /// A leading `0` is a complete integer part on its own, so `012` is two numbers.
    fn read_number(&mut self, first: char, start: Position) -> LexResult<Token> {
        let mut s = String::new();
        s.push(first);

        if first != '0' {
            self.read_digits(&mut s);
        }

        // The dot only belongs to the number when a digit follows it
        if self.peek_char() == Some(&'.') && self.peek_second_char().map_or(false, is_digit) {
            self.read_char();
            s.push('.');
            self.read_digits(&mut s);
        }

        match s.parse() {
            Ok(value) => Ok(Token::Number(value)),
            Err(_) => Err(LexError::InvalidNumber {
                literal: s,
                position: start,
            }),
        }
    }

    fn read_digits(&mut self, s: &mut String) {
        while let Some(&ch) = self.peek_char() {
            if !is_digit(ch) {
                break;
            }
            s.push(ch);
            self.read_char();
        }
    }

    /// Read the current and following tokens as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        match Token::lookup_keyword(&identifier) {
            Some(keyword_token) => keyword_token,
            None => Token::Identifier(identifier),
        }
    }

    /// Read a new token from the characters list.
    pub fn next_token(&mut self) -> LexResult<WithSpan<Token>> {
        self.skip_whitespace_and_comments();

        let initial_position = self.current_position;

        let token = if let Some(c) = self.read_char() {
            match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,

                '=' => self.either('=', Token::EqualEqual, Token::Equal),
                '!' => self.either('=', Token::BangEqual, Token::Bang),
                '<' => self.either('=', Token::LessEqual, Token::LessThan),
                '>' => self.either('=', Token::GreaterEqual, Token::GreaterThan),

                ',' => Token::Comma,
                '.' => Token::Dot,
                ';' => Token::Semicolon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,

                '"' => self.read_string(initial_position)?,

                c if is_digit(c) => self.read_number(c, initial_position)?,
                c if is_identifier_start(c) => self.read_identifier_or_keyword(c),

                _ => {
                    return Err(LexError::UnexpectedCharacter {
                        character: c,
                        position: initial_position,
                    })
                }
            }
        } else {
            Token::Eof
        };

        let span = Span::new(initial_position, self.current_position);

        Ok(WithSpan::new(token, span))
    }

    /// Produce `double` if the next character is `second` (consuming it), `single` otherwise.
    fn either(&mut self, second: char, double: Token, single: Token) -> Token {
        if self.peek_char() == Some(&second) {
            self.read_char();
            double
        } else {
            single
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<WithSpan<Token>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        if matches!(&result, Ok(token) if token.value == Token::Eof) {
            self.finished = true;
        }
        Some(result)
    }
}

/// Whether or not the given character is a digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Identifiers start with a lowercase ASCII letter or an underscore
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

/// Whether or not the given character is valid after the first character of an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use crate::lexer::{LexError, Lexer};
    use crate::span::{Position, Span};
    use crate::token::Token;

    #[test]
    fn test_operators() {
        let input = "+-*/=! ==!=<><=>=";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::Plus);
        assert_eq!(lex.next_token().unwrap().value, Token::Minus);
        assert_eq!(lex.next_token().unwrap().value, Token::Star);
        assert_eq!(lex.next_token().unwrap().value, Token::Slash);
        assert_eq!(lex.next_token().unwrap().value, Token::Equal);
        assert_eq!(lex.next_token().unwrap().value, Token::Bang);

        assert_eq!(lex.next_token().unwrap().value, Token::EqualEqual);
        assert_eq!(lex.next_token().unwrap().value, Token::BangEqual);
        assert_eq!(lex.next_token().unwrap().value, Token::LessThan);
        assert_eq!(lex.next_token().unwrap().value, Token::GreaterThan);
        assert_eq!(lex.next_token().unwrap().value, Token::LessEqual);
        assert_eq!(lex.next_token().unwrap().value, Token::GreaterEqual);
    }

    #[test]
    fn test_delimiters() {
        let input = ",.;(){}";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::Comma);
        assert_eq!(lex.next_token().unwrap().value, Token::Dot);
        assert_eq!(lex.next_token().unwrap().value, Token::Semicolon);

        assert_eq!(lex.next_token().unwrap().value, Token::LeftParen);
        assert_eq!(lex.next_token().unwrap().value, Token::RightParen);
        assert_eq!(lex.next_token().unwrap().value, Token::LeftBrace);
        assert_eq!(lex.next_token().unwrap().value, Token::RightBrace);
    }

    #[test]
    fn test_identifier() {
        let input = "hello _world _hello_world_ x1";
        let mut lex = Lexer::new(input);
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::Identifier("hello".to_owned())
        );
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::Identifier("_world".to_owned())
        );
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::Identifier("_hello_world_".to_owned())
        );
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::Identifier("x1".to_owned())
        );
    }

    #[test]
    fn test_uppercase_identifier_start() {
        let mut lex = Lexer::new("Foo");
        assert_eq!(
            lex.next_token(),
            Err(LexError::UnexpectedCharacter {
                character: 'F',
                position: Position::new(0, 1, 1)
            })
        );
    }

    #[test]
    fn test_number() {
        let input = "12312 3.25 0 0.5";
        let mut lex = Lexer::new(input);
        assert_eq!(lex.next_token().unwrap().value, Token::Number(12312.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Number(3.25));
        assert_eq!(lex.next_token().unwrap().value, Token::Number(0.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Number(0.5));
    }

    #[test]
    fn test_number_edges() {
        // A leading zero stands alone, and a trailing dot is not part of the number
        let input = "012 7.foo";
        let mut lex = Lexer::new(input);
        assert_eq!(lex.next_token().unwrap().value, Token::Number(0.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Number(12.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Number(7.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Dot);
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::Identifier("foo".to_owned())
        );
    }

    #[test]
    fn test_string() {
        let input = "\"foobar\" \"foo \\n bar\" \"two\nlines\" \"not closed";
        let mut lex = Lexer::new(input);
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::String("foobar".to_string())
        );
        // No escape processing
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::String("foo \\n bar".to_string())
        );
        assert_eq!(
            lex.next_token().unwrap().value,
            Token::String("two\nlines".to_string())
        );

        match lex.next_token() {
            Err(LexError::UnterminatedString { position }) => {
                assert_eq!(position.line, 2);
                assert_eq!(position.column, 8);
            }
            result => panic!("expected unterminated string error but got {:?}", result),
        }
    }

    #[test]
    fn test_keywords() {
        let input = "var fun print if else while for return true false nil and or";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::Var);
        assert_eq!(lex.next_token().unwrap().value, Token::Fun);
        assert_eq!(lex.next_token().unwrap().value, Token::Print);
        assert_eq!(lex.next_token().unwrap().value, Token::If);
        assert_eq!(lex.next_token().unwrap().value, Token::Else);
        assert_eq!(lex.next_token().unwrap().value, Token::While);
        assert_eq!(lex.next_token().unwrap().value, Token::For);
        assert_eq!(lex.next_token().unwrap().value, Token::Return);
        assert_eq!(lex.next_token().unwrap().value, Token::True);
        assert_eq!(lex.next_token().unwrap().value, Token::False);
        assert_eq!(lex.next_token().unwrap().value, Token::Nil);
        assert_eq!(lex.next_token().unwrap().value, Token::And);
        assert_eq!(lex.next_token().unwrap().value, Token::Or);
    }

    #[test]
    fn test_comments() {
        let input = "1 // the rest is ignored ( \" \n/ 2";
        let mut lex = Lexer::new(input);
        assert_eq!(lex.next_token().unwrap().value, Token::Number(1.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Slash);
        assert_eq!(lex.next_token().unwrap().value, Token::Number(2.0));
        assert_eq!(lex.next_token().unwrap().value, Token::Eof);
    }

    #[test]
    fn test_eof() {
        let input = "";
        let mut lex = Lexer::new(input);
        assert_eq!(lex.next_token().unwrap().value, Token::Eof)
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<Token> = Lexer::new("print 1;")
            .map(|result| result.unwrap().value)
            .collect();

        assert_eq!(
            tokens,
            vec![Token::Print, Token::Number(1.0), Token::Semicolon, Token::Eof]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut lex = Lexer::new("1 # 2");
        lex.next_token().unwrap();
        assert_eq!(
            lex.next_token(),
            Err(LexError::UnexpectedCharacter {
                character: '#',
                position: Position::new(2, 1, 3)
            })
        );
        // The lexer keeps going after the bad character
        assert_eq!(lex.next_token().unwrap().value, Token::Number(2.0));
    }

    #[test]
    fn test_spans_eof() {
        let input = "1";
        let mut lex = Lexer::new(input);

        // Skip the `1`
        lex.next_token().unwrap();

        let final_span = Span::new(Position::new(1, 1, 2), Position::new(1, 1, 2));
        // Make sure that the span does not change upon hitting eof
        assert_eq!(lex.next_token().unwrap().span, final_span);
        assert_eq!(lex.next_token().unwrap().span, final_span);
    }

    #[test]
    fn test_spans() {
        let input = "abc 12 +\n  return";
        let mut lex = Lexer::new(input);

        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(0, 1, 1), Position::new(3, 1, 4))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(4, 1, 5), Position::new(6, 1, 7))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(7, 1, 8), Position::new(8, 1, 9))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(11, 2, 3), Position::new(17, 2, 9))
        );
    }
}
