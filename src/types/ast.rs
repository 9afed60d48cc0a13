//! @dose
//! purpose: Node types of the comment tree. Field names and the `type` discriminator serialize in
//!     the ESTree-like shape that selector queries and external tooling walk.
//!
//! when-editing:
//!     - !Formatting fields (initial, delimiter, postDelimiter, post*, lineEnd, terminal) are
//!       copied from source text and must never be normalized
//!     - !A new child-bearing field needs an entry in tree::JSDOC_VISITOR_KEYS
//!
//! invariants:
//!     - JsdocBlock.tags is in physical-line order of each tag's first line
//!     - JsdocTag.raw_type has its enclosing braces stripped exactly once
//!
//! gotchas:
//!     - Nodes are freely mutable after building; keeping raw_type and parsed_type in sync is the
//!       caller's job

use crate::type_expr::TypeNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The whole documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "JsdocBlock", rename_all = "camelCase")]
pub struct JsdocBlock {
    /// Opening delimiter, normally `/**`
    pub delimiter: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_end_line: Option<usize>,
    pub description_lines: Vec<JsdocDescriptionLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_start_line: Option<usize>,
    /// Block description text shares the terminator's line
    pub has_preterminal_description: bool,
    /// A tag's content shares the terminator's line
    pub has_preterminal_tag_description: bool,
    pub initial: String,
    pub inline_tags: Vec<JsdocInlineTag>,
    /// First line carrying a tag or the terminator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_description_line: Option<usize>,
    /// Number of physical lines minus one
    pub end_line: usize,
    pub line_end: String,
    pub post_delimiter: String,
    pub tags: Vec<JsdocTag>,
    /// Closing mark, normally `*/`
    pub terminal: String,
    /// Prefix of a bare terminator line when it is not a space plus `initial`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_initial: Option<String>,
}

/// One physical line of a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "JsdocDescriptionLine", rename_all = "camelCase")]
pub struct JsdocDescriptionLine {
    pub delimiter: String,
    pub description: String,
    pub post_delimiter: String,
    pub initial: String,
    /// Starts a physical line of its own instead of following a tag head or the opening mark
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub own_line: bool,
}

/// One physical line of a multi-line type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "JsdocTypeLine", rename_all = "camelCase")]
pub struct JsdocTypeLine {
    pub delimiter: String,
    pub post_delimiter: String,
    pub raw_type: String,
    pub initial: String,
}

/// One `@tag` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "JsdocTag", rename_all = "camelCase")]
pub struct JsdocTag {
    pub delimiter: String,
    pub description: String,
    pub description_lines: Vec<JsdocDescriptionLine>,
    pub initial: String,
    pub inline_tags: Vec<JsdocInlineTag>,
    pub name: String,
    pub post_delimiter: String,
    pub post_name: String,
    pub post_tag: String,
    pub post_type: String,
    pub raw_type: String,
    /// `None` when there is no type or it failed to parse
    pub parsed_type: Option<TypeNode>,
    /// Tag name without the leading `@`
    pub tag: String,
    pub type_lines: Vec<JsdocTypeLine>,
}

/// Layout of an inline tag within description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineTagFormat {
    /// `{@link target}`
    Plain,
    /// `{@link target|text}`
    Pipe,
    /// `[text]{@link target}`
    Prefix,
    /// `{@link target text}`
    Space,
}

impl fmt::Display for InlineTagFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Pipe => "pipe",
            Self::Prefix => "prefix",
            Self::Space => "space",
        };
        f.write_str(name)
    }
}

/// Whitespace and separator text inside an inline tag, kept when it differs from the usual
/// layout of its format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineTagSpacing {
    /// Between the tag name and the target
    pub post_tag: String,
    /// Between the target and the separator (or the text, when there is no separator)
    pub pre_separator: String,
    /// `|`, or empty
    pub separator: String,
    /// Between the separator and the text
    pub post_separator: String,
}

impl InlineTagSpacing {
    /// The layout a format prints with when no spacing was recorded.
    pub fn canonical(format: InlineTagFormat) -> Self {
        let (pre_separator, separator) = match format {
            InlineTagFormat::Pipe => ("", "|"),
            InlineTagFormat::Space => (" ", ""),
            InlineTagFormat::Plain | InlineTagFormat::Prefix => ("", ""),
        };
        Self {
            post_tag: " ".to_string(),
            pre_separator: pre_separator.to_string(),
            separator: separator.to_string(),
            post_separator: String::new(),
        }
    }
}

/// An inline reference such as `{@link Foo}` lifted out of description text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "JsdocInlineTag")]
pub struct JsdocInlineTag {
    pub format: InlineTagFormat,
    #[serde(rename = "namepathOrURL")]
    pub namepath_or_url: String,
    pub tag: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<InlineTagSpacing>,
}
