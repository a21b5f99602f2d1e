//! # Sinks
//!
//! Read-only queries that turn a parsed file into output bytes.

use crate::address::Address;
use crate::errors::EditorResult;
use crate::matcher::{attribute_at, block_at, find_attribute, find_blocks};
use hcledit_parser::ast::{Body, File};
use hcledit_parser::{format_tokens, render, Token, TokenKind};
use tracing::debug;

/// Trait for query operations
pub trait Sink {
    /// Produce output for `file`
    fn sink(&self, file: &File) -> EditorResult<Vec<u8>>;

    /// Get a debug name for this sink
    fn name(&self) -> &'static str;
}

/// Value expression of an attribute
#[derive(Debug, Clone)]
pub struct AttributeGet {
    address: Address,
}

impl AttributeGet {
    pub fn new(address: &str) -> EditorResult<Self> {
        Ok(Self {
            address: Address::parse(address)?,
        })
    }
}

impl Sink for AttributeGet {
    fn sink(&self, file: &File) -> EditorResult<Vec<u8>> {
        let value = find_attribute(&file.body, &self.address)
            .and_then(|path| attribute_at(&file.body, &path))
            .map(|attr| attr.expr_text());

        debug!(address = %self.address, found = value.is_some(), "attribute get");
        Ok(value
            .map(|text| format!("{}\n", text).into_bytes())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "attribute_get"
    }
}

/// Matched blocks, formatted on their own
#[derive(Debug, Clone)]
pub struct BlockGet {
    address: Address,
}

impl BlockGet {
    pub fn new(address: &str) -> EditorResult<Self> {
        Ok(Self {
            address: Address::parse(address)?,
        })
    }
}

impl Sink for BlockGet {
    fn sink(&self, file: &File) -> EditorResult<Vec<u8>> {
        let paths = find_blocks(&file.body, &self.address);
        debug!(address = %self.address, matches = paths.len(), "block get");

        let mut tokens: Vec<Token> = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            let Some(block) = block_at(&file.body, path) else {
                continue;
            };
            if i > 0 {
                tokens.push(Token::new(TokenKind::Newline, "\n"));
            }
            block.build_tokens(&mut tokens);
            if !tokens.last().is_some_and(|t| t.is(TokenKind::Newline)) {
                tokens.push(Token::new(TokenKind::Newline, "\n"));
            }
        }
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        tokens.push(Token::new(TokenKind::Eof, ""));
        format_tokens(&mut tokens);
        Ok(render(&tokens).into_bytes())
    }

    fn name(&self) -> &'static str {
        "block_get"
    }
}

/// Addresses of every block, one per line or as a JSON array
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockList {
    json: bool,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json() -> Self {
        Self { json: true }
    }
}

impl Sink for BlockList {
    fn sink(&self, file: &File) -> EditorResult<Vec<u8>> {
        let addresses = list_blocks(&file.body);
        if self.json {
            let addresses: Vec<String> = addresses.iter().map(ToString::to_string).collect();
            let mut out = serde_json::to_vec_pretty(&addresses)?;
            out.push(b'\n');
            return Ok(out);
        }

        let mut out = String::new();
        for address in addresses {
            out.push_str(&address.to_string());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "block_list"
    }
}

/// Addresses of all blocks, nested ones included, in document order.
pub fn list_blocks(body: &Body) -> Vec<Address> {
    let mut out = Vec::new();
    collect_blocks(body, None, &mut out);
    out
}

fn collect_blocks(body: &Body, parent: Option<&Address>, out: &mut Vec<Address>) {
    for (_, block) in body.blocks() {
        let own = Address::for_block(block.type_name(), &block.label_values());
        let address = match parent {
            Some(parent) => parent.join(&own),
            None => own,
        };
        out.push(address.clone());
        collect_blocks(&block.body, Some(&address), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcledit_parser::parse;
    use pretty_assertions::assert_eq;

    fn output(sink: &dyn Sink, source: &str) -> String {
        let file = parse(source).unwrap();
        String::from_utf8(sink.sink(&file).unwrap()).unwrap()
    }

    #[test]
    fn test_attribute_get() {
        let source = "a0 = v0\nb1 \"l1\" {\n  a1 =   \"x\" # note\n}\n";
        assert_eq!(output(&AttributeGet::new("a0").unwrap(), source), "v0\n");
        assert_eq!(output(&AttributeGet::new("b1.l1.a1").unwrap(), source), "\"x\"\n");
        assert_eq!(output(&AttributeGet::new("a9").unwrap(), source), "");
    }

    #[test]
    fn test_block_get() {
        let source = "a0 = v0\n\n# first\nb1 l1 {\n      a1 = 1\n}\nb1 l1 l2 {\n}\n";
        assert_eq!(
            output(&BlockGet::new("b1.l1").unwrap(), source),
            "# first\nb1 l1 {\n  a1 = 1\n}\n"
        );
        assert_eq!(output(&BlockGet::new("b9").unwrap(), source), "");
    }

    #[test]
    fn test_block_get_wildcard_separates_blocks() {
        let source = "b1 l1 a {\n}\nb1 l1 b {\n}\n";
        assert_eq!(
            output(&BlockGet::new("b1.l1.*").unwrap(), source),
            "b1 l1 a {\n}\n\nb1 l1 b {\n}\n"
        );
    }

    #[test]
    fn test_block_get_nested_block_is_dedented() {
        let source = "b1 {\n  b2 {\n    a = 1\n  }\n}\n";
        assert_eq!(
            output(&BlockGet::new("b1.b2").unwrap(), source),
            "b2 {\n  a = 1\n}\n"
        );
    }

    #[test]
    fn test_block_list() {
        let source = "b1 {\n  b2 x {\n  }\n}\nb3 \"l.1\" {\n}\na = 1\n";
        assert_eq!(output(&BlockList::new(), source), "b1\nb1.b2.x\nb3.l\\.1\n");
    }

    #[test]
    fn test_block_list_json() {
        let source = "b1 {\n  b2 x {\n  }\n}\nb3 \"l.1\" {\n}\n";
        let json = output(&BlockList::json(), source);
        let addresses: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(addresses, vec!["b1", "b1.b2.x", r"b3.l\.1"]);
        assert!(json.ends_with("]\n"));
    }

    #[test]
    fn test_list_blocks_addresses_resolve() {
        let source = "b1 {\n  b2 x {\n  }\n}\nb3 \"l.1\" {\n}\n";
        let file = parse(source).unwrap();
        for address in list_blocks(&file.body) {
            let reparsed = Address::parse(&address.to_string()).unwrap();
            assert_eq!(find_blocks(&file.body, &reparsed).len(), 1);
        }
    }
}
