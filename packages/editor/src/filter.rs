//! # Edit Filters
//!
//! Structural mutations applied to a parsed [`File`].
//!
//! ## Semantics
//!
//! ### AttributeSet
//! - Replaces the value tokens of the first matching attribute
//! - Name, comments and spacing around the value are kept
//!
//! ### AttributeRemove / BlockRemove
//! - Removes the matched item with its lead comments and line end
//! - Blank lines directly above the item go with it
//! - BlockRemove removes every match of a wildcard address
//!
//! A filter that matches nothing leaves the file untouched and succeeds;
//! [`Filter::apply`] returns `false` for it. Formatting filters always
//! report `true`, and `Multi` reports its first filter, skipping the rest
//! when that one matched nothing.

use crate::address::Address;
use crate::errors::{EditorError, EditorResult};
use crate::matcher::{attribute_at_mut, body_at_mut, find_attribute, find_blocks, NodePath};
use crate::vertical_formatter::vertical_format;
use hcledit_parser::ast::{Body, File};
use hcledit_parser::{format_tokens, parse_expression, parse_tokens, Token};
use tracing::debug;

/// Name reported for syntax errors in tokens the filters produced themselves
const REFORMATTED: &str = "<reformatted>";

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Replace the value expression of an attribute
    AttributeSet { address: Address, value: Vec<Token> },

    /// Remove an attribute
    AttributeRemove { address: Address },

    /// Remove one block, or every block matched by a wildcard
    BlockRemove { address: Address },

    /// Normalize blank lines only
    VerticalFormat,

    /// Full formatting: blank lines, indentation, spacing and alignment
    Format,

    /// Apply filters in order
    Multi(Vec<Filter>),
}

impl Filter {
    /// `value` must be a single valid expression.
    pub fn attribute_set(address: &str, value: &str) -> EditorResult<Self> {
        let address = Address::parse(address)?;
        let value_tokens =
            parse_expression(value).map_err(|source| EditorError::InvalidValueExpression {
                value: value.to_string(),
                source,
            })?;
        Ok(Filter::AttributeSet {
            address,
            value: value_tokens,
        })
    }

    pub fn attribute_remove(address: &str) -> EditorResult<Self> {
        Ok(Filter::AttributeRemove {
            address: Address::parse(address)?,
        })
    }

    pub fn block_remove(address: &str) -> EditorResult<Self> {
        Ok(Filter::BlockRemove {
            address: Address::parse(address)?,
        })
    }

    /// Run `self`, then the vertical formatter.
    pub fn then_vertical_format(self) -> Self {
        match self {
            Filter::Multi(mut filters) => {
                filters.push(Filter::VerticalFormat);
                Filter::Multi(filters)
            }
            filter => Filter::Multi(vec![filter, Filter::VerticalFormat]),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::AttributeSet { .. } => "attribute_set",
            Filter::AttributeRemove { .. } => "attribute_remove",
            Filter::BlockRemove { .. } => "block_remove",
            Filter::VerticalFormat => "vertical_format",
            Filter::Format => "format",
            Filter::Multi(_) => "multi",
        }
    }

    /// Apply the filter to `file` in place. Returns whether the address
    /// matched anything.
    pub fn apply(&self, file: &mut File) -> EditorResult<bool> {
        match self {
            Filter::AttributeSet { address, value } => {
                Self::apply_attribute_set(file, address, value)
            }

            Filter::AttributeRemove { address } => {
                let matched: Vec<NodePath> = find_attribute(&file.body, address).into_iter().collect();
                debug!(%address, matches = matched.len(), "attribute remove");
                let found = !matched.is_empty();
                Self::remove_all(&mut file.body, matched);
                Ok(found)
            }

            Filter::BlockRemove { address } => {
                let matched = find_blocks(&file.body, address);
                debug!(%address, matches = matched.len(), "block remove");
                let found = !matched.is_empty();
                Self::remove_all(&mut file.body, matched);
                Ok(found)
            }

            Filter::VerticalFormat => {
                *file = reparse(vertical_format(file.build_tokens()))?;
                Ok(true)
            }

            Filter::Format => {
                let mut tokens = vertical_format(file.build_tokens());
                format_tokens(&mut tokens);
                *file = reparse(tokens)?;
                Ok(true)
            }

            Filter::Multi(filters) => {
                let mut filters = filters.iter();
                if let Some(first) = filters.next() {
                    if !first.apply(file)? {
                        return Ok(false);
                    }
                }
                for filter in filters {
                    filter.apply(file)?;
                }
                Ok(true)
            }
        }
    }

    fn apply_attribute_set(file: &mut File, address: &Address, value: &[Token]) -> EditorResult<bool> {
        let Some(path) = find_attribute(&file.body, address) else {
            debug!(%address, "attribute set: no match");
            return Ok(false);
        };
        let Some(attr) = attribute_at_mut(&mut file.body, &path) else {
            return Ok(false);
        };
        debug!(%address, ?path, "attribute set");
        attr.set_expr(value.to_vec());
        Ok(true)
    }

    /// Remove nodes against a snapshot of their paths, later ones first so
    /// the remaining paths stay valid.
    fn remove_all(root: &mut Body, mut paths: Vec<NodePath>) {
        paths.sort();
        for path in paths.iter().rev() {
            let Some((&index, parents)) = path.split_last() else {
                continue;
            };
            if let Some(body) = body_at_mut(root, parents) {
                if index < body.items.len() {
                    body.remove(index, !parents.is_empty());
                }
            }
        }
    }
}

fn reparse(tokens: Vec<Token>) -> EditorResult<File> {
    parse_tokens(tokens).map_err(|source| EditorError::syntax(REFORMATTED, source))
}
