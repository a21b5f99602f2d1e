//! Lossless parsing of HCL native syntax.
//!
//! Source text is split into tokens that remember their leading whitespace,
//! grouped into an editable tree of attributes and blocks, and rendered back
//! byte for byte. A horizontal formatter rewrites whitespace in place.

pub mod ast;
pub mod error;
mod expression;
pub mod formatter;
pub mod parser;
pub mod tokenizer;

pub use ast::{label_value, unquote, Attribute, Block, Body, File, Node};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult, Position};
pub use formatter::{format, format_tokens, Formatter};
pub use parser::{parse, parse_expression, parse_tokens, Parser};
pub use tokenizer::{render, tokenize, Token, TokenKind};
