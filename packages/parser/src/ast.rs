//! Editable, lossless document tree.
//!
//! Every node owns the exact tokens it was parsed from, so rendering an
//! unmodified tree reproduces the source byte for byte. Nodes are kept in
//! plain vectors: a child is addressed by its index in the parent body.

use crate::tokenizer::{render, Token, TokenKind};
use std::fmt;

/// Root of a parsed configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub body: Body,
    /// End-of-file token; its leading whitespace is the file's trailing whitespace.
    pub eof: Token,
}

impl File {
    pub fn new(body: Body, eof: Token) -> Self {
        Self { body, eof }
    }

    /// Flatten the tree back into its token stream.
    pub fn build_tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.body.build_tokens(&mut tokens);
        tokens.push(self.eof.clone());
        tokens
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.build_tokens()))
    }
}

/// Ordered container of attributes and blocks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    pub items: Vec<Node>,
}

impl Body {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items }
    }

    pub fn build_tokens(&self, out: &mut Vec<Token>) {
        for item in &self.items {
            item.build_tokens(out);
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (usize, &Attribute)> {
        self.items.iter().enumerate().filter_map(|(idx, item)| match item {
            Node::Attribute(attr) => Some((idx, attr)),
            _ => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.items.iter().enumerate().filter_map(|(idx, item)| match item {
            Node::Block(block) => Some((idx, block)),
            _ => None,
        })
    }

    /// First attribute with the given name, in document order.
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes()
            .map(|(_, attr)| attr)
            .find(|attr| attr.name() == name)
    }

    /// Remove the item at `index`, together with the blank lines directly
    /// above it.
    ///
    /// `nested` tells whether this body sits inside braces: the newline
    /// right after an opening brace ends the brace line and is not blank.
    /// Removing the last item of a nested body also drops the blank lines
    /// left before the closing brace.
    pub fn remove(&mut self, index: usize, nested: bool) -> Node {
        let removed = self.items.remove(index);
        let was_last = self.items[index..]
            .iter()
            .all(|node| matches!(node, Node::Unstructured(_)));

        if index > 0 {
            self.trim_unstructured(index - 1, nested);
        }
        if nested && was_last {
            while let Some(last) = self.items.len().checked_sub(1) {
                if !self.trim_unstructured(last, nested) {
                    break;
                }
            }
        }
        removed
    }

    /// Trim blank lines off the end of the unstructured item at `index`,
    /// dropping it when nothing is left. Returns whether it was dropped.
    fn trim_unstructured(&mut self, index: usize, nested: bool) -> bool {
        let preceded_by_newline = self.ends_with_newline(index, nested);
        let Node::Unstructured(tokens) = &mut self.items[index] else {
            return false;
        };
        trim_blank_lines(tokens, preceded_by_newline);
        if tokens.is_empty() {
            self.items.remove(index);
            return true;
        }
        false
    }

    /// Whether the content before item `index` ends a line.
    fn ends_with_newline(&self, index: usize, nested: bool) -> bool {
        if index == 0 {
            return !nested;
        }
        self.items[index - 1]
            .last_token()
            .map(|token| token.is(TokenKind::Newline))
            .unwrap_or(!nested)
    }
}

/// Drop trailing newline tokens that form blank lines.
fn trim_blank_lines(tokens: &mut Vec<Token>, preceded_by_newline: bool) {
    while let Some(last) = tokens.last() {
        if !last.is(TokenKind::Newline) {
            break;
        }
        let before_is_newline = match tokens.len() {
            1 => preceded_by_newline,
            len => tokens[len - 2].is(TokenKind::Newline),
        };
        if !before_is_newline {
            break;
        }
        tokens.pop();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Attribute(Attribute),
    Block(Block),
    /// Blank lines and comments that do not belong to an item
    Unstructured(Vec<Token>),
}

impl Node {
    pub fn build_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Node::Attribute(attr) => attr.build_tokens(out),
            Node::Block(block) => block.build_tokens(out),
            Node::Unstructured(tokens) => out.extend(tokens.iter().cloned()),
        }
    }

    pub fn last_token(&self) -> Option<&Token> {
        match self {
            Node::Attribute(attr) => attr.line_end.last().or_else(|| attr.expr.last()),
            Node::Block(block) => block.line_end.last().or(Some(&block.close_brace)),
            Node::Unstructured(tokens) => tokens.last(),
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Node::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_attribute_mut(&mut self) -> Option<&mut Attribute> {
        match self {
            Node::Attribute(attr) => Some(attr),
            _ => None,
        }
    }
}

/// `name = expr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub lead_comments: Vec<Token>,
    pub name: Token,
    pub equals: Token,
    pub expr: Vec<Token>,
    /// Optional trailing comment and the newline ending the line
    pub line_end: Vec<Token>,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// Source text of the value expression without surrounding whitespace.
    pub fn expr_text(&self) -> String {
        render(&self.expr).trim().to_string()
    }

    /// Replace the value expression, keeping the spacing after `=`.
    pub fn set_expr(&mut self, mut tokens: Vec<Token>) {
        if let (Some(first), Some(old)) = (tokens.first_mut(), self.expr.first()) {
            first.leading = old.leading.clone();
        }
        self.expr = tokens;
    }

    pub fn build_tokens(&self, out: &mut Vec<Token>) {
        out.extend(self.lead_comments.iter().cloned());
        out.push(self.name.clone());
        out.push(self.equals.clone());
        out.extend(self.expr.iter().cloned());
        out.extend(self.line_end.iter().cloned());
    }
}

/// `type "label" ... { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub lead_comments: Vec<Token>,
    pub type_name: Token,
    pub labels: Vec<Token>,
    pub open_brace: Token,
    pub body: Body,
    pub close_brace: Token,
    pub line_end: Vec<Token>,
}

impl Block {
    pub fn type_name(&self) -> &str {
        &self.type_name.text
    }

    /// Label values: identifiers by text, quoted strings by content.
    pub fn label_values(&self) -> Vec<String> {
        self.labels.iter().map(label_value).collect()
    }

    pub fn build_tokens(&self, out: &mut Vec<Token>) {
        out.extend(self.lead_comments.iter().cloned());
        out.push(self.type_name.clone());
        out.extend(self.labels.iter().cloned());
        out.push(self.open_brace.clone());
        self.body.build_tokens(out);
        out.push(self.close_brace.clone());
        out.extend(self.line_end.iter().cloned());
    }
}

/// Literal value of a label token.
pub fn label_value(token: &Token) -> String {
    match token.kind {
        TokenKind::QuotedString => unquote(&token.text),
        _ => token.text.clone(),
    }
}

/// Strip the quotes of a string literal and resolve its escape sequences.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
