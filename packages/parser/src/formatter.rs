use crate::error::ParseResult;
use crate::parser::parse_tokens;
use crate::tokenizer::{render, tokenize, Token, TokenKind};
use std::ops::Range;

/// Horizontal formatter
///
/// Rewrites only the whitespace in front of tokens; newlines and every
/// other token are left alone, so vertical layout is preserved. Three passes
/// run over the stream one line at a time:
///
/// 1. indentation from bracket nesting
/// 2. spacing between tokens on a line
/// 3. alignment of `=` and of trailing comments across neighbouring lines
pub struct Formatter {
    indent_string: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_string: indent.to_string(),
        }
    }

    /// Parse `source` and return it formatted.
    pub fn format(&self, source: &str) -> ParseResult<String> {
        let mut tokens = tokenize(source)?;
        // Validate before touching anything.
        parse_tokens(tokens.clone())?;
        self.format_tokens(&mut tokens);
        Ok(render(&tokens))
    }

    pub fn format_tokens(&self, tokens: &mut [Token]) {
        let mut lines = split_lines(tokens);
        self.format_indent(tokens, &lines);
        format_spaces(tokens, &lines);
        for line in &mut lines {
            line.find_cells(tokens);
        }
        format_cells(tokens, &lines);
    }

    fn format_indent(&self, tokens: &mut [Token], lines: &[Line]) {
        // Each entry is the number of brackets a line left open. A line with
        // a net decrease pops entries until its closers are accounted for.
        let mut indents: Vec<usize> = Vec::new();

        for line in lines {
            let first = line.range.start;
            if line.lead().is_empty() {
                tokens[first].leading.clear();
                continue;
            }

            let net: isize = tokens[line.lead()]
                .iter()
                .map(|t| bracket_change(t.kind))
                .sum();

            if net < 0 {
                let mut closed = net.unsigned_abs();
                while closed > 0 {
                    let Some(top) = indents.last_mut() else {
                        break;
                    };
                    if closed >= *top {
                        closed -= *top;
                        indents.pop();
                    } else {
                        *top -= closed;
                        closed = 0;
                    }
                }
            }

            tokens[first].leading = self.indent_string.repeat(indents.len());

            if net > 0 {
                indents.push(net.unsigned_abs());
            }
        }
    }
}

/// Format a token stream in place with the default settings.
pub fn format_tokens(tokens: &mut [Token]) {
    Formatter::new().format_tokens(tokens);
}

/// Format source text with the default settings.
pub fn format(source: &str) -> ParseResult<String> {
    Formatter::new().format(source)
}

/// One physical line: its tokens including the terminating newline or eof.
struct Line {
    range: Range<usize>,
    /// Index of the `=` whose right-hand side is a complete expression
    assign: Option<usize>,
    /// Index of a trailing comment
    comment: Option<usize>,
}

impl Line {
    /// Tokens of the line without the terminating newline or eof.
    fn lead(&self) -> Range<usize> {
        self.range.start..self.range.end - 1
    }

    fn find_cells(&mut self, tokens: &[Token]) {
        let lead = self.lead();
        if lead.is_empty() || tokens[lead.clone()].iter().any(is_multiline) {
            return;
        }

        let mut content_end = lead.end;
        if lead.len() > 1 && tokens[lead.end - 1].is(TokenKind::Comment) {
            self.comment = Some(lead.end - 1);
            content_end -= 1;
        }

        for idx in lead.start + 1..content_end {
            if tokens[idx].is(TokenKind::Equal) {
                // Only single-line right-hand sides take part in alignment.
                let net: isize = tokens[idx..content_end]
                    .iter()
                    .map(|t| bracket_change(t.kind))
                    .sum();
                if net == 0 {
                    self.assign = Some(idx);
                }
                break;
            }
        }
    }
}

fn is_multiline(token: &Token) -> bool {
    token.is(TokenKind::Heredoc) || token.text.contains('\n')
}

fn split_lines(tokens: &[Token]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, token) in tokens.iter().enumerate() {
        if token.is(TokenKind::Newline) || token.is(TokenKind::Eof) {
            lines.push(Line {
                range: start..idx + 1,
                assign: None,
                comment: None,
            });
            start = idx + 1;
        }
    }
    if start < tokens.len() {
        // Stream without a terminating eof; treat the rest as one line.
        lines.push(Line {
            range: start..tokens.len() + 1,
            assign: None,
            comment: None,
        });
    }
    lines
}

fn bracket_change(kind: TokenKind) -> isize {
    if kind.is_open_bracket() {
        1
    } else if kind.is_close_bracket() {
        -1
    } else {
        0
    }
}

fn format_spaces(tokens: &mut [Token], lines: &[Line]) {
    for line in lines {
        let end = line.range.end.min(tokens.len());
        for idx in line.range.start + 1..end {
            let before = if idx >= line.range.start + 2 {
                Some(&tokens[idx - 2])
            } else {
                None
            };
            let spaces = spaces_between(before, &tokens[idx - 1], &tokens[idx]);
            tokens[idx].leading = " ".repeat(spaces);
        }
    }
}

/// Number of spaces between `prev` and `cur` on the same line.
///
/// `before` is the token preceding `prev`, used to tell unary minus apart
/// from subtraction.
fn spaces_between(before: Option<&Token>, prev: &Token, cur: &Token) -> usize {
    use TokenKind::*;

    match (prev.kind, cur.kind) {
        (_, Newline | Eof) => 0,
        (_, Comment) | (Comment, _) => 1,
        (_, Comma | Ellipsis) => 0,
        (Dot, _) | (_, Dot) => 0,
        (LParen | LBracket, _) => 0,
        (_, RParen | RBracket) => 0,
        (LBrace, RBrace) => 0,
        (Ident, LParen) if !is_keyword(prev) => 0,
        (Ident | RBracket | RParen | QuotedString | Star | Number, LBracket) if !is_keyword(prev) => 0,
        (Bang, _) => 0,
        (Minus, _) if is_unary_position(before) => 0,
        _ => 1,
    }
}

fn is_keyword(token: &Token) -> bool {
    matches!(token.text.as_str(), "for" | "in" | "if")
}

/// Whether an operator following `before` is in prefix position.
fn is_unary_position(before: Option<&Token>) -> bool {
    use TokenKind::*;

    match before {
        None => true,
        Some(token) => matches!(
            token.kind,
            Equal
                | EqualEqual
                | NotEqual
                | Less
                | Greater
                | LessEqual
                | GreaterEqual
                | And
                | Or
                | Bang
                | Plus
                | Minus
                | Star
                | Slash
                | Percent
                | Question
                | Colon
                | Comma
                | FatArrow
                | LParen
                | LBracket
                | LBrace
        ) || is_keyword(token),
    }
}

fn columns(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .map(|t| t.leading.chars().count() + t.text.chars().count())
        .sum()
}

fn format_cells(tokens: &mut [Token], lines: &[Line]) {
    // `=` first, since moving it shifts the comments after it.
    align_chains(tokens, lines, |line| line.assign);
    align_chains(tokens, lines, |line| line.comment);
}

/// Align the cell selected by `cell` across runs of consecutive lines that
/// all have one.
fn align_chains(tokens: &mut [Token], lines: &[Line], cell: impl Fn(&Line) -> Option<usize>) {
    // (token index, columns in front of it)
    let mut chain: Vec<(usize, usize)> = Vec::new();

    for line in lines {
        match cell(line) {
            Some(idx) => {
                let width = columns(&tokens[line.range.start..idx]);
                chain.push((idx, width));
            }
            None => close_chain(tokens, &mut chain),
        }
    }
    close_chain(tokens, &mut chain);
}

fn close_chain(tokens: &mut [Token], chain: &mut Vec<(usize, usize)>) {
    let max = chain.iter().map(|(_, width)| *width).max().unwrap_or(0);
    for (idx, width) in chain.drain(..) {
        tokens[idx].leading = " ".repeat(max - width + 1);
    }
}
