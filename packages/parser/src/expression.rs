//! Expression recognizer
//!
//! Attribute values are kept as raw tokens, so expressions are only
//! recognized here, never turned into a tree. The recognizer decides where
//! a value ends and rejects malformed input.
//!
//! Precedence, lowest first:
//!
//! ```text
//! cond ? a : b
//! ||
//! &&
//! == !=
//! < > <= >=
//! + -
//! * / %
//! ! - (unary)
//! postfix: .attr .0 .* [index] [*]
//! ```

use crate::error::ParseResult;
use crate::parser::Parser;
use crate::tokenizer::{Token, TokenKind};

impl Parser {
    /// Recognize one expression starting at the current token.
    pub(crate) fn expression(&mut self) -> ParseResult<()> {
        self.binary(0)?;

        self.skip_trivia();
        if self.match_token(TokenKind::Question) {
            self.skip_trivia();
            self.expression()?;
            self.skip_trivia();
            self.expect(TokenKind::Colon)?;
            self.skip_trivia();
            self.expression()?;
        }
        Ok(())
    }

    fn binary(&mut self, min_precedence: u8) -> ParseResult<()> {
        self.unary()?;

        loop {
            self.skip_trivia();
            let precedence = match binary_precedence(self.peek().kind) {
                Some(p) if p >= min_precedence => p,
                _ => return Ok(()),
            };
            self.advance();
            self.skip_trivia();
            self.binary(precedence + 1)?;
        }
    }

    fn unary(&mut self) -> ParseResult<()> {
        if self.match_token(TokenKind::Bang) || self.match_token(TokenKind::Minus) {
            self.skip_trivia();
            return self.unary();
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<()> {
        self.primary()?;

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    match self.peek().kind {
                        TokenKind::Ident | TokenKind::Number | TokenKind::Star => {
                            self.advance();
                        }
                        _ => return Err(self.unexpected("attribute name, index or '*'")),
                    }
                }
                TokenKind::LBracket => {
                    self.open();
                    if !self.match_token(TokenKind::Star) {
                        self.expression()?;
                    }
                    self.close(TokenKind::RBracket)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn primary(&mut self) -> ParseResult<()> {
        match self.peek().kind {
            TokenKind::Number | TokenKind::QuotedString | TokenKind::Heredoc => {
                self.advance();
                Ok(())
            }
            TokenKind::Ident => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    self.call_arguments()?;
                }
                Ok(())
            }
            TokenKind::LParen => {
                self.open();
                self.expression()?;
                self.close(TokenKind::RParen)
            }
            TokenKind::LBracket => {
                self.open();
                if self.starts_for() {
                    self.for_expression(false)?;
                } else {
                    self.tuple_items()?;
                }
                self.close(TokenKind::RBracket)
            }
            TokenKind::LBrace => {
                self.open();
                if self.starts_for() {
                    self.for_expression(true)?;
                } else {
                    self.object_items()?;
                }
                self.close(TokenKind::RBrace)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn call_arguments(&mut self) -> ParseResult<()> {
        self.open();
        while !self.check(TokenKind::RParen) {
            self.expression()?;
            self.skip_trivia();
            if self.match_token(TokenKind::Ellipsis) {
                self.skip_trivia();
                break;
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
            self.skip_trivia();
        }
        self.close(TokenKind::RParen)
    }

    fn tuple_items(&mut self) -> ParseResult<()> {
        while !self.check(TokenKind::RBracket) {
            self.expression()?;
            self.skip_trivia();
            if !self.match_token(TokenKind::Comma) {
                break;
            }
            self.skip_trivia();
        }
        Ok(())
    }

    fn object_items(&mut self) -> ParseResult<()> {
        while !self.check(TokenKind::RBrace) {
            self.expression()?;
            self.skip_trivia();
            if !self.match_token(TokenKind::Equal) && !self.match_token(TokenKind::Colon) {
                return Err(self.unexpected("'=' or ':'"));
            }
            self.skip_trivia();
            self.expression()?;
            self.skip_trivia();
            self.match_token(TokenKind::Comma);
            self.skip_trivia();
        }
        Ok(())
    }

    /// `for k, v in coll : value` with optional `=> key` / `...` / `if cond`
    fn for_expression(&mut self, object: bool) -> ParseResult<()> {
        self.expect_keyword("for")?;
        self.skip_trivia();
        self.expect(TokenKind::Ident)?;
        self.skip_trivia();
        if self.match_token(TokenKind::Comma) {
            self.skip_trivia();
            self.expect(TokenKind::Ident)?;
            self.skip_trivia();
        }
        self.expect_keyword("in")?;
        self.skip_trivia();
        self.expression()?;
        self.skip_trivia();
        self.expect(TokenKind::Colon)?;
        self.skip_trivia();
        self.expression()?;
        self.skip_trivia();

        if object {
            self.expect(TokenKind::FatArrow)?;
            self.skip_trivia();
            self.expression()?;
            self.skip_trivia();
            if self.match_token(TokenKind::Ellipsis) {
                self.skip_trivia();
            }
        }

        if self.check_keyword("if") {
            self.advance();
            self.skip_trivia();
            self.expression()?;
            self.skip_trivia();
        }
        Ok(())
    }

    fn starts_for(&self) -> bool {
        self.check_keyword("for") && self.peek_ahead_significant(1).is(TokenKind::Ident)
    }

    /// Peek past newlines and comments, which are insignificant inside brackets.
    fn peek_ahead_significant(&self, mut n: usize) -> &Token {
        let mut offset = 0;
        loop {
            let token = self.peek_ahead(offset);
            if token.is(TokenKind::Eof) {
                return token;
            }
            if !token.is(TokenKind::Newline) && !token.is(TokenKind::Comment) {
                if n == 0 {
                    return token;
                }
                n -= 1;
            }
            offset += 1;
        }
    }

    fn open(&mut self) {
        self.advance();
        self.nesting += 1;
        self.skip_trivia();
    }

    fn close(&mut self, kind: TokenKind) -> ParseResult<()> {
        self.skip_trivia();
        self.expect(kind)?;
        self.nesting -= 1;
        Ok(())
    }

    fn skip_trivia(&mut self) {
        if self.nesting == 0 {
            return;
        }
        while self.check(TokenKind::Newline) || self.check(TokenKind::Comment) {
            self.advance();
        }
    }
}

fn binary_precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Or => Some(1),
        TokenKind::And => Some(2),
        TokenKind::EqualEqual | TokenKind::NotEqual => Some(3),
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEqual | TokenKind::GreaterEqual => {
            Some(4)
        }
        TokenKind::Plus | TokenKind::Minus => Some(5),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_expression;
    use crate::tokenizer::render;

    fn accepts(source: &str) {
        if let Err(err) = parse_expression(source) {
            panic!("expected {:?} to parse: {}", source, err);
        }
    }

    fn rejects(source: &str) {
        assert!(
            parse_expression(source).is_err(),
            "expected {:?} to be rejected",
            source
        );
    }

    #[test]
    fn test_literals_and_references() {
        accepts("v2");
        accepts("\"v2\"");
        accepts("2");
        accepts("1.5e3");
        accepts("false");
        accepts("null");
        accepts("var.foo");
        accepts("local.list[0].name");
        accepts("aws_instance.web.*.id");
        accepts("var.list[*].id");
    }

    #[test]
    fn test_operators() {
        accepts("1 + 2 * 3");
        accepts("!var.enabled");
        accepts("-1");
        accepts("a == b && c != d || e >= f");
        accepts("var.enabled ? 1 : 0");
        accepts("(1 + 2) % 3");
        rejects("1 +");
        rejects("a ? b");
        rejects("* 2");
    }

    #[test]
    fn test_function_calls() {
        accepts("upper(\"a\")");
        accepts("max(1, 2, 3)");
        accepts("concat(var.a, var.b...)");
        accepts("f()");
        accepts("merge(\n  var.a,\n  var.b,\n)");
        rejects("f(1 2)");
    }

    #[test]
    fn test_collections() {
        accepts("[]");
        accepts("[1, 2, 3,]");
        accepts("{}");
        accepts("{ a = 1, b = \"x\" }");
        accepts("{\n  a = 1\n  b = 2 # comment\n}");
        accepts("{ \"key\": \"value\" }");
        accepts("{ (var.k) = 1 }");
        rejects("{ a 1 }");
        rejects("[1, 2");
    }

    #[test]
    fn test_for_expressions() {
        accepts("[for s in var.list : upper(s)]");
        accepts("[for i, v in var.list : v if i > 0]");
        accepts("{for k, v in var.map : k => v}");
        accepts("{for v in var.list : v.key => v...}");
        rejects("[for s in var.list]");
        rejects("{for k, v in var.map : v}");
    }

    #[test]
    fn test_for_as_reference_is_not_a_for_expression() {
        accepts("[for]");
        accepts("{ for = 1 }");
    }

    #[test]
    fn test_templates_and_heredocs() {
        accepts("\"${var.a}-${upper(\"b\")}\"");
        accepts("<<EOT\nhello\nEOT\n");
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        rejects("a b");
        rejects("a # comment");
        rejects("");
        rejects("   \n");
    }

    #[test]
    fn test_parsed_tokens_exclude_surrounding_whitespace() {
        let tokens = parse_expression("\n  [1,  2]  \n").unwrap();
        assert_eq!(render(&tokens), "[1,  2]");
    }
}
