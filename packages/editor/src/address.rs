//! # Addresses
//!
//! A dotted path naming an attribute or one or more blocks:
//!
//! ```text
//! a0            attribute a0 at the top level
//! b1.l1.a1      attribute a1 inside block `b1 "l1"`
//! b1.l\.1.a1    same, with a label containing a dot
//! b1.l1.*       every `b1 "l1" ...` block with at least one more label
//! ```
//!
//! `\` escapes the next character, so `\.` is a literal dot, `\\` a
//! backslash and `\*` a label that is literally `*`.

use crate::errors::{EditorError, EditorResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Block type or attribute name; always the first segment
    Name(String),
    /// Block label, or a name inside a block body once the labels run out
    Label(String),
    /// Any further labels; only valid last
    Wildcard,
}

impl Segment {
    /// Literal text of the segment; `None` for a wildcard.
    pub fn text(&self) -> Option<&str> {
        match self {
            Segment::Name(text) | Segment::Label(text) => Some(text),
            Segment::Wildcard => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Wildcard => f.write_str("*"),
            Segment::Name(text) | Segment::Label(text) => {
                if text == "*" {
                    return f.write_str("\\*");
                }
                for ch in text.chars() {
                    if ch == '.' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", ch)?;
                }
                Ok(())
            }
        }
    }
}

/// A parsed, validated address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<Segment>,
}

impl Address {
    pub fn parse(raw: &str) -> EditorResult<Self> {
        parse_address(raw)
    }

    /// Address of a block by its type and label values.
    pub fn for_block(type_name: &str, labels: &[String]) -> Self {
        let mut segments = vec![Segment::Name(type_name.to_string())];
        segments.extend(labels.iter().cloned().map(Segment::Label));
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_wildcard)
    }

    /// Append the address of something nested inside the addressed block.
    pub fn join(&self, child: &Address) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().map(|segment| match segment {
            Segment::Name(text) => Segment::Label(text.clone()),
            other => other.clone(),
        }));
        Self { segments }
    }
}

impl FromStr for Address {
    type Err = EditorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_address(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Split `raw` on unescaped dots, resolving one level of escapes.
pub fn parse_address(raw: &str) -> EditorResult<Address> {
    if raw.is_empty() {
        return Err(EditorError::invalid_address(raw, "address is empty"));
    }

    // (text, whether any character was escaped)
    let mut parts: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(next) => {
                    current.push(next);
                    escaped = true;
                }
                None => {
                    return Err(EditorError::invalid_address(
                        raw,
                        "trailing escape character",
                    ))
                }
            },
            '.' => {
                parts.push((std::mem::take(&mut current), escaped));
                escaped = false;
            }
            _ => current.push(ch),
        }
    }
    parts.push((current, escaped));

    let last = parts.len() - 1;
    let mut segments = Vec::with_capacity(parts.len());
    for (i, (text, escaped)) in parts.into_iter().enumerate() {
        if text.is_empty() {
            return Err(EditorError::invalid_address(
                raw,
                format!("segment {} is empty", i + 1),
            ));
        }

        let segment = if text == "*" && !escaped {
            if i == 0 {
                return Err(EditorError::invalid_address(
                    raw,
                    "wildcard cannot stand for a block type",
                ));
            }
            if i != last {
                return Err(EditorError::invalid_address(
                    raw,
                    "wildcard is only allowed as the last segment",
                ));
            }
            Segment::Wildcard
        } else if i == 0 {
            Segment::Name(text)
        } else {
            Segment::Label(text)
        };
        segments.push(segment);
    }

    tracing::trace!(address = raw, segments = segments.len(), "parsed address");
    Ok(Address { segments })
}
