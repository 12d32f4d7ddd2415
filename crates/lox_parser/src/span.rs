use std::fmt::Display;

/// A location somewhere in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// The position after reading `ch`.
    pub fn shift(self, ch: char) -> Self {
        if ch == '\n' {
            Position {
                offset: self.offset + ch.len_utf8(),
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(0, 1, 1)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A subsection of the source code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Starting position (inclusive)
    pub start: Position,
    /// Ending position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Span {
        Span { start, end }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    /// Convert the given span to the "(at 1:1)" format
    pub fn at_str(&self) -> String {
        format!("(at {})", self)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// A value tagged with the part of the source it came from.
///
/// Spans are metadata: two `WithSpan`s are equal when their values are,
/// wherever they were written.
#[derive(Debug, Clone)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> WithSpan<T> {
        WithSpan { value, span }
    }

    /// Wrap a value that has no meaningful source location (e.g. desugared nodes).
    pub fn empty(value: T) -> WithSpan<T> {
        WithSpan {
            value,
            span: Span::default(),
        }
    }
}

impl<T: PartialEq> PartialEq for WithSpan<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> WithSpan<T>
where
    T: Display,
{
    /// Convert the given WithSpan to the "value (at 1:1)" format
    /// See Span::at_str() for detail
    pub fn at_str(&self) -> String {
        format!("{} {}", self.value, self.span.at_str())
    }
}

impl<T: Display> Display for WithSpan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::span::{Position, Span, WithSpan};

    #[test]
    fn test_shift() {
        let start = Position::default();
        let after_a = start.shift('a');
        assert_eq!(after_a, Position::new(1, 1, 2));

        let after_newline = after_a.shift('\n');
        assert_eq!(after_newline, Position::new(2, 2, 1));

        // Multi-byte characters advance the offset by their UTF-8 length but only one column
        let after_e = after_newline.shift('é');
        assert_eq!(after_e, Position::new(4, 2, 2));
    }

    #[test]
    fn test_at_str() {
        let span = Span::new(Position::new(4, 2, 3), Position::new(5, 2, 4));
        assert_eq!(span.at_str(), "(at 2:3)");
        assert_eq!(WithSpan::new("x", span).at_str(), "x (at 2:3)");
    }

    #[test]
    fn test_equality_ignores_span() {
        let a = WithSpan::new("name", Span::new(Position::new(0, 1, 1), Position::new(4, 1, 5)));
        let b = WithSpan::new("name", Span::default());
        assert_eq!(a, b);
        assert_ne!(a, WithSpan::empty("other"));
    }
}
