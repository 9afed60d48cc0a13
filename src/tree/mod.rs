//! @dose
//! purpose: The comment tree as a generic graph. Publishes the traversal key table (which
//!     child-bearing fields each node kind has) and NodeRef, a borrowed view that walks any node
//!     through those keys. The builder that folds tokenized lines into a tree lives in `builder`.
//!
//! when-editing:
//!     - !Keys are listed in the serialized (camelCase) field names, selector queries and the
//!       stringifier both rely on that
//!     - Type node keys come from type_expr::VISITOR_KEYS, do not duplicate them here
//!
//! invariants:
//!     - visitor_keys(kind) is Some for every kind NodeRef::kind() can return
//!     - NodeRef::children(key) yields children in stored order
//!
//! flows:
//!     - Walk: NodeRef::walk -> visitor_keys(kind) -> children(key) -> recurse

pub mod builder;

use crate::type_expr::{self, TypeNode};
use crate::types::ast::{JsdocBlock, JsdocDescriptionLine, JsdocInlineTag, JsdocTag, JsdocTypeLine};

pub use builder::{build, build_with, BuildError, BuildOptions};

/// Child-bearing fields of each comment node kind, in traversal order.
pub const JSDOC_VISITOR_KEYS: &[(&str, &[&str])] = &[
    ("JsdocBlock", &["descriptionLines", "tags", "inlineTags"]),
    ("JsdocDescriptionLine", &[]),
    ("JsdocTypeLine", &[]),
    (
        "JsdocTag",
        &["parsedType", "typeLines", "descriptionLines", "inlineTags"],
    ),
    ("JsdocInlineTag", &[]),
];

/// Traversal keys for a comment or type node kind.
pub fn visitor_keys(kind: &str) -> Option<&'static [&'static str]> {
    JSDOC_VISITOR_KEYS
        .iter()
        .chain(type_expr::VISITOR_KEYS.iter())
        .find(|(name, _)| *name == kind)
        .map(|(_, keys)| *keys)
}

/// Every node kind with its keys, comment kinds first.
pub fn all_visitor_keys() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    JSDOC_VISITOR_KEYS
        .iter()
        .chain(type_expr::VISITOR_KEYS.iter())
        .copied()
}

/// Borrowed view of any node in a comment tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Block(&'a JsdocBlock),
    Tag(&'a JsdocTag),
    DescriptionLine(&'a JsdocDescriptionLine),
    TypeLine(&'a JsdocTypeLine),
    InlineTag(&'a JsdocInlineTag),
    Type(&'a TypeNode),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Block(_) => "JsdocBlock",
            Self::Tag(_) => "JsdocTag",
            Self::DescriptionLine(_) => "JsdocDescriptionLine",
            Self::TypeLine(_) => "JsdocTypeLine",
            Self::InlineTag(_) => "JsdocInlineTag",
            Self::Type(node) => node.kind(),
        }
    }

    /// Children stored under `key`; empty for keys the kind does not have.
    pub fn children(&self, key: &str) -> Vec<NodeRef<'a>> {
        match (*self, key) {
            (Self::Block(block), "descriptionLines") => block
                .description_lines
                .iter()
                .map(NodeRef::DescriptionLine)
                .collect(),
            (Self::Block(block), "tags") => block.tags.iter().map(NodeRef::Tag).collect(),
            (Self::Block(block), "inlineTags") => {
                block.inline_tags.iter().map(NodeRef::InlineTag).collect()
            }
            (Self::Tag(tag), "parsedType") => tag.parsed_type.iter().map(NodeRef::Type).collect(),
            (Self::Tag(tag), "typeLines") => tag.type_lines.iter().map(NodeRef::TypeLine).collect(),
            (Self::Tag(tag), "descriptionLines") => tag
                .description_lines
                .iter()
                .map(NodeRef::DescriptionLine)
                .collect(),
            (Self::Tag(tag), "inlineTags") => {
                tag.inline_tags.iter().map(NodeRef::InlineTag).collect()
            }
            (Self::Type(node), key) => node.children(key).into_iter().map(NodeRef::Type).collect(),
            _ => Vec::new(),
        }
    }

    /// Visit this node and its descendants in pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(NodeRef<'a>)) {
        visit(*self);
        for key in visitor_keys(self.kind()).unwrap_or_default() {
            for child in self.children(key) {
                child.walk(visit);
            }
        }
    }
}

impl<'a> From<&'a JsdocBlock> for NodeRef<'a> {
    fn from(block: &'a JsdocBlock) -> Self {
        NodeRef::Block(block)
    }
}

impl<'a> From<&'a JsdocTag> for NodeRef<'a> {
    fn from(tag: &'a JsdocTag) -> Self {
        NodeRef::Tag(tag)
    }
}

impl<'a> From<&'a TypeNode> for NodeRef<'a> {
    fn from(node: &'a TypeNode) -> Self {
        NodeRef::Type(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_expr::{parse, ParseMode};

    #[test]
    fn test_visitor_keys_lookup() {
        assert_eq!(
            visitor_keys("JsdocBlock"),
            Some(&["descriptionLines", "tags", "inlineTags"][..])
        );
        assert_eq!(visitor_keys("JsdocTypeUnion"), Some(&["elements"][..]));
        assert_eq!(visitor_keys("JsdocInlineTag"), Some(&[][..]));
        assert!(visitor_keys("Program").is_none());
        assert!(all_visitor_keys().any(|(kind, _)| kind == "JsdocTypeFunction"));
    }

    #[test]
    fn test_walk_reaches_type_nodes() {
        let tag = JsdocTag {
            tag: "param".to_string(),
            parsed_type: Some(parse("Bar | Foo", ParseMode::Typescript).unwrap()),
            type_lines: vec![JsdocTypeLine::default()],
            ..JsdocTag::default()
        };
        let block = JsdocBlock {
            tags: vec![tag],
            ..JsdocBlock::default()
        };

        let mut kinds = Vec::new();
        NodeRef::from(&block).walk(&mut |node| kinds.push(node.kind()));
        assert_eq!(
            kinds,
            vec![
                "JsdocBlock",
                "JsdocTag",
                "JsdocTypeUnion",
                "JsdocTypeName",
                "JsdocTypeName",
                "JsdocTypeLine",
            ]
        );
    }

    #[test]
    fn test_unknown_key_has_no_children() {
        let block = JsdocBlock::default();
        assert!(NodeRef::from(&block).children("parsedType").is_empty());
    }
}
