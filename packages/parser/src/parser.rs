use crate::ast::*;
use crate::error::{ParseError, ParseResult, Position};
use crate::tokenizer::{render, tokenize, Token, TokenKind};
use std::mem;

/// Parser for the HCL native syntax
///
/// Works on a lossless token stream and builds a [`File`] whose nodes own
/// their tokens, so nothing is lost between parsing and rendering.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    /// Bracket nesting of the expression being parsed. Newlines and
    /// comments are insignificant while it is non-zero.
    pub(crate) nesting: usize,
}

impl Parser {
    /// Create a parser over a token stream.
    ///
    /// The stream is expected to end with [`TokenKind::Eof`]; one is
    /// appended when missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            tokens.push(Token::new(TokenKind::Eof, ""));
        }
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    /// Parse a complete file
    pub fn parse_file(&mut self) -> ParseResult<File> {
        let body = self.parse_body(false)?;
        let eof = self.advance();
        Ok(File::new(body, eof))
    }

    /// Parse a standalone expression spanning the whole input.
    ///
    /// Surrounding whitespace and newlines are allowed; the returned tokens
    /// hold the expression only.
    pub fn parse_standalone_expression(&mut self) -> ParseResult<Vec<Token>> {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
        if self.check(TokenKind::Eof) {
            return Err(ParseError::unexpected_eof(self.peek_position(), "expression"));
        }

        let start = self.pos;
        self.expression()?;
        let end = self.pos;

        while self.check(TokenKind::Newline) {
            self.advance();
        }
        if !self.check(TokenKind::Eof) {
            return Err(self.unexpected("end of expression"));
        }

        let mut tokens = self.tokens[start..end].to_vec();
        if let Some(first) = tokens.first_mut() {
            first.leading.clear();
        }
        Ok(tokens)
    }

    /// Parse body items until end of file or, for nested bodies, the closing brace.
    fn parse_body(&mut self, nested: bool) -> ParseResult<Body> {
        let mut items = Vec::new();
        let mut pending: Vec<Token> = Vec::new();
        // Only the brace line of a nested body starts mid-line.
        let mut pending_at_line_start = !nested;

        loop {
            match self.peek().kind {
                TokenKind::Eof if nested => {
                    return Err(ParseError::unexpected_eof(self.peek_position(), "'}'"));
                }
                TokenKind::Eof => break,
                TokenKind::RBrace if nested => break,
                TokenKind::Newline | TokenKind::Comment => pending.push(self.advance()),
                TokenKind::Ident => {
                    let lead_comments = split_lead_comments(&mut pending, pending_at_line_start);
                    if !pending.is_empty() {
                        items.push(Node::Unstructured(mem::take(&mut pending)));
                    }
                    items.push(self.parse_item(lead_comments, nested)?);
                    pending_at_line_start = true;
                }
                _ => return Err(self.unexpected("attribute or block")),
            }
        }

        if !pending.is_empty() {
            items.push(Node::Unstructured(pending));
        }
        Ok(Body::new(items))
    }

    fn parse_item(&mut self, lead_comments: Vec<Token>, nested: bool) -> ParseResult<Node> {
        let name = self.advance();

        if self.check(TokenKind::Equal) {
            let equals = self.advance();
            let expr = self.expression_tokens()?;
            let line_end = self.parse_line_end(nested, "newline after attribute value")?;
            return Ok(Node::Attribute(Attribute {
                lead_comments,
                name,
                equals,
                expr,
                line_end,
            }));
        }

        let mut labels = Vec::new();
        while self.check(TokenKind::Ident) || self.check(TokenKind::QuotedString) {
            labels.push(self.advance());
        }

        if !self.check(TokenKind::LBrace) {
            let expected = if labels.is_empty() {
                "'=' or block label"
            } else {
                "block label or '{'"
            };
            return Err(self.unexpected(expected));
        }
        let open_brace = self.advance();
        let body = self.parse_body(true)?;
        let close_brace = self.expect(TokenKind::RBrace)?;
        let line_end = self.parse_line_end(nested, "newline after block")?;

        Ok(Node::Block(Block {
            lead_comments,
            type_name: name,
            labels,
            open_brace,
            body,
            close_brace,
            line_end,
        }))
    }

    /// Consume an optional trailing comment and the newline ending an item.
    fn parse_line_end(&mut self, nested: bool, expected: &str) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while self.check(TokenKind::Comment) {
            tokens.push(self.advance());
        }
        match self.peek().kind {
            TokenKind::Newline => tokens.push(self.advance()),
            TokenKind::Eof => {}
            TokenKind::RBrace if nested => {}
            _ => return Err(self.unexpected(expected)),
        }
        Ok(tokens)
    }

    /// Run the expression recognizer and return the tokens it consumed.
    fn expression_tokens(&mut self) -> ParseResult<Vec<Token>> {
        let start = self.pos;
        self.expression()?;
        Ok(self.tokens[start..self.pos].to_vec())
    }

    // Helper methods

    pub(crate) fn peek(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Consume the current token. The trailing `Eof` is never passed.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    pub(crate) fn check_keyword(&self, keyword: &str) -> bool {
        self.check(TokenKind::Ident) && self.peek().text == keyword
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("keyword '{}'", keyword)))
        }
    }

    /// Position of the text of the next token.
    pub(crate) fn peek_position(&self) -> Position {
        let idx = self.pos.min(self.tokens.len() - 1);
        let mut consumed = render(&self.tokens[..idx]);
        consumed.push_str(&self.tokens[idx].leading);
        Position::locate(&consumed, consumed.len())
    }

    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let token = self.peek();
        if token.is(TokenKind::Eof) {
            ParseError::unexpected_eof(self.peek_position(), expected)
        } else {
            ParseError::unexpected_token(self.peek_position(), expected, Self::format_token(token))
        }
    }

    /// Format a token for display in error messages
    fn format_token(token: &Token) -> String {
        match token.kind {
            TokenKind::Ident => format!("identifier '{}'", token.text),
            TokenKind::Number => format!("number {}", token.text),
            TokenKind::QuotedString => format!("string {}", token.text),
            kind => kind.to_string(),
        }
    }
}

/// Split off the comment lines directly above an item.
///
/// A comment belongs to the item when it starts its own line and only
/// single newlines separate it from the item. `at_line_start` tells whether
/// the first pending token begins a line.
fn split_lead_comments(pending: &mut Vec<Token>, at_line_start: bool) -> Vec<Token> {
    let mut start = pending.len();

    // `/* ... */ name = value` on the same line
    while start > 0 && pending[start - 1].is(TokenKind::Comment) {
        start -= 1;
    }

    while start >= 2
        && pending[start - 1].is(TokenKind::Newline)
        && pending[start - 2].is(TokenKind::Comment)
    {
        let comment_at = start - 2;
        let begins_line = if comment_at == 0 {
            at_line_start
        } else {
            pending[comment_at - 1].is(TokenKind::Newline)
        };
        if !begins_line {
            break;
        }
        start = comment_at;
    }

    pending.split_off(start)
}

pub fn parse(source: &str) -> ParseResult<File> {
    parse_tokens(tokenize(source)?)
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<File> {
    Parser::new(tokens).parse_file()
}

/// Parse text that must consist of exactly one expression.
pub fn parse_expression(source: &str) -> ParseResult<Vec<Token>> {
    Parser::new(tokenize(source)?).parse_standalone_expression()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_blocks() {
        let file = parse("a0 = v0\nb1 \"l1\" {\n  a1 = v1\n}\n").unwrap();
        assert_eq!(file.body.items.len(), 2);

        let attr = file.body.items[0].as_attribute().unwrap();
        assert_eq!(attr.name(), "a0");
        assert_eq!(attr.expr_text(), "v0");

        let block = file.body.items[1].as_block().unwrap();
        assert_eq!(block.type_name(), "b1");
        assert_eq!(block.label_values(), vec!["l1"]);
        assert_eq!(block.body.get_attribute("a1").unwrap().expr_text(), "v1");
    }

    #[test]
    fn test_roundtrip_is_lossless() {
        let source = "\n// header\n\na0   =  v0 # trailing\nb1  l1   {\n    a1=[1,\n 2]\n}\n\n\n  ";
        let file = parse(source).unwrap();
        assert_eq!(file.to_string(), source);
    }

    #[test]
    fn test_lead_comments_attach_to_item() {
        let file = parse("// detached\n\n// before attr\na0 = \"v0\" // inline\n").unwrap();
        assert_eq!(file.body.items.len(), 2);
        assert!(matches!(file.body.items[0], Node::Unstructured(_)));

        let attr = file.body.items[1].as_attribute().unwrap();
        assert_eq!(attr.lead_comments[0].text, "// before attr");
        assert_eq!(attr.line_end[0].text, "// inline");
        assert!(attr.line_end[1].is(TokenKind::Newline));
    }

    #[test]
    fn test_comment_on_brace_line_stays_in_body() {
        let file = parse("b { # note\n  a = 1\n}\n").unwrap();
        let block = file.body.items[0].as_block().unwrap();
        assert!(matches!(block.body.items[0], Node::Unstructured(_)));
        let attr = block.body.items[1].as_attribute().unwrap();
        assert!(attr.lead_comments.is_empty());
    }

    #[test]
    fn test_lead_comments_in_nested_body() {
        let file = parse("b {\n  a = 1\n  # about c\n  c = 2\n}\n").unwrap();
        let block = file.body.items[0].as_block().unwrap();
        let attr = block.body.get_attribute("c").unwrap();
        assert_eq!(attr.lead_comments[0].text, "# about c");
    }

    #[test]
    fn test_single_line_block() {
        let file = parse("b { a = 1 }\n").unwrap();
        let block = file.body.items[0].as_block().unwrap();
        assert_eq!(block.body.get_attribute("a").unwrap().expr_text(), "1");
    }

    #[test]
    fn test_multiline_expression() {
        let file = parse("a = {\n  x = 1\n  y = [\n    2,\n  ]\n}\nb = 2\n").unwrap();
        assert_eq!(file.body.items.len(), 2);
        assert_eq!(
            file.body.items[0].as_attribute().unwrap().expr_text(),
            "{\n  x = 1\n  y = [\n    2,\n  ]\n}"
        );
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        let err = parse("\nb1 {\n  a1 = v1\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
        assert_eq!(err.position().line, 4);
    }

    #[test]
    fn test_two_items_on_one_line_is_an_error() {
        let err = parse("a = 1 b = 2\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
        assert_eq!(err.position().column, 7);
    }

    #[test]
    fn test_missing_brace_after_labels() {
        let err = parse("b l1 = 1\n").unwrap_err();
        assert!(err.to_string().contains("block label or '{'"));
    }

    #[test]
    fn test_parse_expression() {
        let tokens = parse_expression("  \"v2\"\n").unwrap();
        assert_eq!(render(&tokens), "\"v2\"");

        assert!(parse_expression("").is_err());
        assert!(parse_expression("a b").is_err());
        assert!(parse_expression("[1, 2").is_err());
        assert!(parse_expression("a = 1").is_err());
    }
}
