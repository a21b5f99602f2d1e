//! # Address Matcher
//!
//! Resolves an [`Address`] against a document body. Matches are returned as
//! index paths instead of references: each entry is the position of an
//! enclosing block in its parent's item list, the last one is the target's
//! own index. Paths stay valid while the tree is mutated, as long as later
//! siblings are removed first.

use crate::address::{Address, Segment};
use hcledit_parser::ast::{Attribute, Block, Body, Node};

/// Position of a node in the tree: indices into `Body::items`, outermost first.
pub type NodePath = Vec<usize>;

/// First attribute addressed by `address`, in document order.
///
/// Addresses ending in a wildcard never name an attribute.
pub fn find_attribute(body: &Body, address: &Address) -> Option<NodePath> {
    if address.has_wildcard() {
        return None;
    }
    let mut path = Vec::new();
    resolve_attribute(body, address.segments(), &mut path).then_some(path)
}

/// Blocks addressed by `address`, in document order.
///
/// Without a wildcard only the first match is returned.
pub fn find_blocks(body: &Body, address: &Address) -> Vec<NodePath> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    resolve_blocks(
        body,
        address.segments(),
        address.has_wildcard(),
        &mut path,
        &mut found,
    );
    found
}

fn resolve_attribute(body: &Body, segments: &[Segment], path: &mut NodePath) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    let Some(name) = first.text() else {
        return false;
    };

    if rest.is_empty() {
        return match body.attributes().find(|(_, attr)| attr.name() == name) {
            Some((idx, _)) => {
                path.push(idx);
                true
            }
            None => false,
        };
    }

    for (idx, block) in body.blocks() {
        if block.type_name() != name {
            continue;
        }
        let labels = block.label_values();
        // The labels must leave at least the attribute name.
        if labels.len() >= rest.len() || !labels_match(&labels, &rest[..labels.len()]) {
            continue;
        }
        path.push(idx);
        if resolve_attribute(&block.body, &rest[labels.len()..], path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Collects matches into `found`; returns early after the first one unless
/// `all` is set.
fn resolve_blocks(
    body: &Body,
    segments: &[Segment],
    all: bool,
    path: &mut NodePath,
    found: &mut Vec<NodePath>,
) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Some(type_name) = first.text() else {
        return;
    };

    for (idx, block) in body.blocks() {
        if block.type_name() != type_name {
            continue;
        }
        let labels = block.label_values();
        path.push(idx);

        match rest.last() {
            Some(Segment::Wildcard) if labels.len() >= rest.len() => {
                let prefix = &rest[..rest.len() - 1];
                if labels_match(&labels[..prefix.len()], prefix) {
                    found.push(path.clone());
                }
            }
            _ if labels.len() == rest.len() => {
                if labels_match(&labels, rest) {
                    found.push(path.clone());
                }
            }
            _ if labels.len() < rest.len() && !rest[labels.len()].is_wildcard() => {
                if labels_match(&labels, &rest[..labels.len()]) {
                    resolve_blocks(&block.body, &rest[labels.len()..], all, path, found);
                }
            }
            _ => {}
        }

        path.pop();
        if !all && !found.is_empty() {
            return;
        }
    }
}

fn labels_match(labels: &[String], segments: &[Segment]) -> bool {
    labels.len() == segments.len()
        && labels
            .iter()
            .zip(segments)
            .all(|(label, segment)| segment.text() == Some(label.as_str()))
}

pub fn node_at<'a>(body: &'a Body, path: &[usize]) -> Option<&'a Node> {
    let (last, parents) = path.split_last()?;
    let mut current = body;
    for &idx in parents {
        current = &current.items.get(idx)?.as_block()?.body;
    }
    current.items.get(*last)
}

pub fn attribute_at<'a>(body: &'a Body, path: &[usize]) -> Option<&'a Attribute> {
    node_at(body, path)?.as_attribute()
}

pub fn block_at<'a>(body: &'a Body, path: &[usize]) -> Option<&'a Block> {
    node_at(body, path)?.as_block()
}

pub fn attribute_at_mut<'a>(body: &'a mut Body, path: &[usize]) -> Option<&'a mut Attribute> {
    let (last, parents) = path.split_last()?;
    body_at_mut(body, parents)?
        .items
        .get_mut(*last)?
        .as_attribute_mut()
}

/// Body of the block reached through `parents`; the root for an empty path.
pub fn body_at_mut<'a>(body: &'a mut Body, parents: &[usize]) -> Option<&'a mut Body> {
    let mut current = body;
    for &idx in parents {
        current = &mut current.items.get_mut(idx)?.as_block_mut()?.body;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcledit_parser::parse;

    fn blocks(source: &str, address: &str) -> Vec<NodePath> {
        let file = parse(source).unwrap();
        find_blocks(&file.body, &Address::parse(address).unwrap())
    }

    fn attribute(source: &str, address: &str) -> Option<String> {
        let file = parse(source).unwrap();
        let path = find_attribute(&file.body, &Address::parse(address).unwrap())?;
        attribute_at(&file.body, &path).map(|attr| attr.expr_text())
    }

    const LABELLED: &str = "b1 {\n}\n\nb1 l1 {\n}\n\nb1 l1 l2 {\n}\n\nb1 l1 l3 {\n}\n\nb1 l2 l1 {\n}\n";

    #[test]
    fn test_top_level_attribute() {
        assert_eq!(attribute("a0 = v0\na1 = v1\n", "a1").as_deref(), Some("v1"));
        assert_eq!(attribute("a0 = v0\n", "a2"), None);
    }

    #[test]
    fn test_attribute_in_labelled_block() {
        let source = "b1 {\n  a1 = v0\n}\nb1 \"l1\" {\n  a1 = v1\n}\n";
        assert_eq!(attribute(source, "b1.l1.a1").as_deref(), Some("v1"));
        assert_eq!(attribute(source, "b1.a1").as_deref(), Some("v0"));
    }

    #[test]
    fn test_attribute_with_escaped_label() {
        let source = "b1 \"l.1\" {\n  a1 = v1\n}\nb1 \"l\" \"1\" {\n  a1 = v2\n}\n";
        assert_eq!(attribute(source, r"b1.l\.1.a1").as_deref(), Some("v1"));
        assert_eq!(attribute(source, "b1.l.1.a1").as_deref(), Some("v2"));
    }

    #[test]
    fn test_attribute_in_nested_block() {
        let source = "b1 l1 {\n  b2 {\n    a2 = v2\n  }\n}\n";
        assert_eq!(attribute(source, "b1.l1.b2.a2").as_deref(), Some("v2"));
    }

    #[test]
    fn test_attribute_wildcard_never_matches() {
        assert_eq!(attribute("b1 l1 {\n  a = 1\n}\n", "b1.*"), None);
    }

    #[test]
    fn test_first_block_match_only() {
        assert_eq!(blocks("b1 {\n}\nb1 {\n}\n", "b1"), vec![vec![0]]);
    }

    #[test]
    fn test_block_with_label() {
        assert_eq!(blocks(LABELLED, "b1.l1"), vec![vec![2]]);
    }

    #[test]
    fn test_wildcard_matches_extra_labels() {
        assert_eq!(blocks(LABELLED, "b1.l1.*"), vec![vec![4], vec![6]]);
        assert_eq!(blocks(LABELLED, "b1.*").len(), 4);
    }

    #[test]
    fn test_nested_block() {
        let source = "b1 l1 {\n  b2 {\n  }\n  b2 x {\n  }\n}\n";
        // The newline after `{` is the first item of the inner body; a
        // block's closing line belongs to the block itself.
        assert_eq!(blocks(source, "b1.l1.b2"), vec![vec![0, 1]]);
        assert_eq!(blocks(source, "b1.l1.b2.*"), vec![vec![0, 2]]);
    }

    #[test]
    fn test_no_match() {
        assert!(blocks(LABELLED, "b2").is_empty());
        assert!(blocks(LABELLED, "b1.l9.*").is_empty());
    }

    #[test]
    fn test_body_at_mut() {
        let mut file = parse("b1 {\n  b2 {\n  }\n}\n").unwrap();
        let body = body_at_mut(&mut file.body, &[0]).unwrap();
        assert_eq!(body.blocks().count(), 1);
        assert!(body_at_mut(&mut file.body, &[5]).is_none());
    }
}
