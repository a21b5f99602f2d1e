use std::fmt;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Location of a diagnostic in the source text.
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Compute the position of byte `offset` within `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: Position,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at {pos}: expected {expected}")]
    UnexpectedEof { pos: Position, expected: String },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: Position, message: String },

    #[error("Lexer error at {pos}: {message}")]
    LexerError { pos: Position, message: String },
}

impl ParseError {
    pub fn unexpected_token(
        pos: Position,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: Position, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: Position, message: impl Into<String>) -> Self {
        Self::LexerError {
            pos,
            message: message.into(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnexpectedEof { pos, .. }
            | ParseError::InvalidSyntax { pos, .. }
            | ParseError::LexerError { pos, .. } => *pos,
        }
    }

    /// Short label for the offending location, used by pretty reports.
    #[cfg(feature = "pretty-errors")]
    fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEof { expected, .. } => format!("expected {}", expected),
            ParseError::InvalidSyntax { message, .. } | ParseError::LexerError { message, .. } => {
                message.clone()
            }
        }
    }
}

/// Pretty-print a parse error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    // ariadne spans count chars, not bytes
    let offset = error.position().offset.min(source.len());
    let start = source
        .char_indices()
        .take_while(|(idx, _)| *idx < offset)
        .count();
    let end = if offset < source.len() { start + 1 } else { start };

    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_counts_lines_and_chars() {
        let source = "a = 1\nbé = 2\n";
        let pos = Position::locate(source, source.find('=').unwrap());
        assert_eq!((pos.line, pos.column), (1, 3));

        let second = source.rfind('=').unwrap();
        let pos = Position::locate(source, second);
        assert_eq!((pos.line, pos.column), (2, 4));
    }

    #[test]
    fn test_locate_clamps_past_end() {
        let pos = Position::locate("ab", 10);
        assert_eq!(pos.offset, 2);
        assert_eq!((pos.line, pos.column), (1, 3));
    }

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::unexpected_eof(Position::locate("b {\n", 4), "'}'");
        assert_eq!(
            err.to_string(),
            "Unexpected end of file at line 2, column 1: expected '}'"
        );
    }
}
