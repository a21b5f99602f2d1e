//! # Operators
//!
//! Coordinate a whole edit: Parse → Filter → Serialize
//!
//! [`EditOperator`] returns untouched input byte for byte; only output that
//! actually changed goes through the horizontal formatter. [`DeriveOperator`]
//! runs a read-only [`Sink`] instead of a filter.

use crate::errors::{EditorError, EditorResult};
use crate::filter::Filter;
use crate::sink::Sink;
use hcledit_parser::ast::File;
use hcledit_parser::{format_tokens, parse, render, ParseError, Position};
use std::io::{Read, Write};
use tracing::debug;

/// Applies one filter to source bytes
#[derive(Debug, Clone)]
pub struct EditOperator {
    filter: Filter,
}

impl EditOperator {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Edit `source`; `filename` only appears in diagnostics.
    ///
    /// A syntax error fails the whole operation before any filter runs.
    pub fn apply(&self, source: &[u8], filename: &str) -> EditorResult<Vec<u8>> {
        let text = decode(source, filename)?;
        let mut file = parse_file(text, filename)?;

        if !self.filter.apply(&mut file)? {
            debug!(filter = self.filter.name(), filename, "no match");
            return Ok(source.to_vec());
        }

        let mut tokens = file.build_tokens();
        if render(&tokens) == text {
            debug!(filter = self.filter.name(), filename, "no change");
            return Ok(source.to_vec());
        }

        debug!(filter = self.filter.name(), filename, "changed, formatting output");
        format_tokens(&mut tokens);
        Ok(render(&tokens).into_bytes())
    }
}

/// Stream form of [`EditOperator::apply`]: read all of `input`, write the
/// result to `output`. Nothing is written on error.
pub fn edit_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    filename: &str,
    filter: Filter,
) -> EditorResult<()> {
    let mut source = Vec::new();
    input.read_to_end(&mut source)?;
    let result = EditOperator::new(filter).apply(&source, filename)?;
    output.write_all(&result)?;
    Ok(())
}

/// Runs a read-only query against source bytes
pub struct DeriveOperator {
    sink: Box<dyn Sink>,
}

impl DeriveOperator {
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    pub fn apply(&self, source: &[u8], filename: &str) -> EditorResult<Vec<u8>> {
        let text = decode(source, filename)?;
        let file = parse_file(text, filename)?;
        debug!(sink = self.sink.name(), filename, "deriving output");
        self.sink.sink(&file)
    }
}

/// Stream form of [`DeriveOperator::apply`].
pub fn derive_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    filename: &str,
    sink: impl Sink + 'static,
) -> EditorResult<()> {
    let mut source = Vec::new();
    input.read_to_end(&mut source)?;
    let result = DeriveOperator::new(sink).apply(&source, filename)?;
    output.write_all(&result)?;
    Ok(())
}

fn decode<'a>(source: &'a [u8], filename: &str) -> EditorResult<&'a str> {
    std::str::from_utf8(source).map_err(|err| {
        let prefix = String::from_utf8_lossy(&source[..err.valid_up_to()]);
        EditorError::syntax(
            filename,
            ParseError::lexer_error(
                Position::locate(&prefix, prefix.len()),
                "invalid UTF-8 sequence",
            ),
        )
    })
}

fn parse_file(text: &str, filename: &str) -> EditorResult<File> {
    parse(text).map_err(|source| {
        debug!(filename, error = %source, "syntax error");
        EditorError::syntax(filename, source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::AttributeGet;

    #[test]
    fn test_unchanged_input_is_returned_verbatim() {
        let source = b"\na0 = v0\na1= v1\n";
        let filter = Filter::attribute_set("a2", "v2").unwrap();
        let out = EditOperator::new(filter).apply(source, "test").unwrap();
        assert_eq!(out, source.to_vec());
    }

    #[test]
    fn test_tidy_remove_without_match_keeps_unformatted_input() {
        let source = b"\na0=v0\nb1 {\n      a2   =  v2\n}\n";
        let filter = Filter::block_remove("hoge").unwrap().then_vertical_format();
        let out = EditOperator::new(filter).apply(source, "test").unwrap();
        assert_eq!(out, source.to_vec());
    }

    #[test]
    fn test_changed_output_is_formatted() {
        let filter = Filter::attribute_set("a0", "v2").unwrap();
        let out = EditOperator::new(filter)
            .apply(b"\na0 = v0\na1= v1\n", "test")
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\na0 = v2\na1 = v1\n");
    }

    #[test]
    fn test_syntax_error_carries_filename_and_position() {
        let filter = Filter::attribute_set("a0", "v2").unwrap();
        let err = EditOperator::new(filter)
            .apply(b"a0 = v0\nb1 {\n", "main.tf")
            .unwrap_err();
        match err {
            EditorError::Syntax { filename, source } => {
                assert_eq!(filename, "main.tf");
                assert_eq!(source.position().line, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_a_syntax_error() {
        let err = EditOperator::new(Filter::VerticalFormat)
            .apply(b"a = \"\xff\"\n", "bad.tf")
            .unwrap_err();
        assert!(matches!(err, EditorError::Syntax { .. }));
    }

    #[test]
    fn test_edit_stream_writes_nothing_on_error() {
        let filter = Filter::block_remove("b1").unwrap();
        let mut input: &[u8] = b"b1 {\n";
        let mut output = Vec::new();
        assert!(edit_stream(&mut input, &mut output, "-", filter).is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn test_derive_operator() {
        let out = DeriveOperator::new(AttributeGet::new("a1").unwrap())
            .apply(b"a0 = v0\na1 = v1\n", "test")
            .unwrap();
        assert_eq!(out, b"v1\n".to_vec());
    }

    #[test]
    fn test_derive_stream() {
        let mut input: &[u8] = b"b1 l1 {\n  a1 = 42\n}\n";
        let mut output = Vec::new();
        derive_stream(
            &mut input,
            &mut output,
            "-",
            AttributeGet::new("b1.l1.a1").unwrap(),
        )
        .unwrap();
        assert_eq!(output, b"42\n".to_vec());
    }
}
