//! @dose
//! purpose: Turns a comment tree back into comment text. Children are rendered first through
//!     the traversal key table, then each node kind concatenates its own formatting fields with
//!     the rendered children. An unmodified tree gives back the exact source text.
//!
//! when-editing:
//!     - !Field order per kind is fixed: Block = head, description lines, tags, terminator;
//!       Tag = formatting, @tag, postTag, {type}, postType, name, postName, description lines
//!     - !Never normalize formatting fields here, the builder copied them from the source
//!     - A new node kind needs both a visitor key entry and a case in stringify_node
//!
//! invariants:
//!     - stringify(build(tokens)) == source for canonical types, or any types with
//!       prefer_raw_type
//!     - Items of a block are joined with line_end + '\n'; lines inside one tag with '\n' before
//!       the line end is applied
//!
//! gotchas:
//!     - A parsed type wins over raw type lines unless prefer_raw_type is set; with it the type
//!       node itself renders as an empty string
//!     - Whether the first item shares the opening line is read from description_start_line and
//!       last_description_line, both 0 in that case
//!
//! flows:
//!     - stringify_node: visitor keys -> render children -> kind-specific concatenation
//!     - stringify_value: JSON `type` -> typed node -> stringify_node

use crate::tree::{visitor_keys, NodeRef};
use crate::type_expr::{self, TypeNode};
use crate::types::ast::{
    InlineTagFormat, InlineTagSpacing, JsdocBlock, JsdocDescriptionLine, JsdocInlineTag, JsdocTag,
    JsdocTypeLine,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Render tag types from their type lines even when a parsed type is present
    pub prefer_raw_type: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StringifyError {
    #[error("Unhandled node type: {0}")]
    UnknownNodeKind(String),
    #[error("Malformed {kind} node: {message}")]
    Malformed { kind: String, message: String },
}

/// Render a whole comment.
pub fn stringify(block: &JsdocBlock, options: &StringifyOptions) -> String {
    stringify_node(NodeRef::Block(block), options)
}

/// Render any node of a comment tree.
pub fn stringify_node(node: NodeRef<'_>, options: &StringifyOptions) -> String {
    let mut children = render_children(node, options);
    let mut take = |key: &str| children.remove(key).unwrap_or_default();

    match node {
        NodeRef::Block(block) => {
            let description_lines = take("descriptionLines");
            let tags = take("tags");
            block_text(block, description_lines, tags)
        }
        NodeRef::Tag(tag) => {
            let parsed = take("parsedType").into_iter().next();
            let type_lines = take("typeLines");
            let description_lines = take("descriptionLines");
            tag_text(tag, options, parsed, type_lines, description_lines)
        }
        NodeRef::DescriptionLine(line) => description_line_text(line),
        NodeRef::TypeLine(line) => type_line_text(line),
        NodeRef::InlineTag(tag) => inline_tag_text(tag),
        NodeRef::Type(node) => type_text(node, options),
    }
}

/// Render a node given in its JSON form, dispatching on its `type` field.
pub fn stringify_value(value: &Value, options: &StringifyOptions) -> Result<String, StringifyError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| StringifyError::UnknownNodeKind(String::new()))?;

    let text = match kind {
        "JsdocBlock" => stringify_node(NodeRef::Block(&decode::<JsdocBlock>(kind, value)?), options),
        "JsdocTag" => stringify_node(NodeRef::Tag(&decode::<JsdocTag>(kind, value)?), options),
        "JsdocDescriptionLine" => description_line_text(&decode(kind, value)?),
        "JsdocTypeLine" => type_line_text(&decode(kind, value)?),
        "JsdocInlineTag" => inline_tag_text(&decode(kind, value)?),
        _ if kind.starts_with("JsdocType") => type_text(&decode::<TypeNode>(kind, value)?, options),
        _ => return Err(StringifyError::UnknownNodeKind(kind.to_string())),
    };
    Ok(text)
}

fn decode<T: DeserializeOwned>(kind: &str, value: &Value) -> Result<T, StringifyError> {
    T::deserialize(value).map_err(|e| StringifyError::Malformed {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

fn render_children(node: NodeRef<'_>, options: &StringifyOptions) -> HashMap<&'static str, Vec<String>> {
    // Type nodes print as a whole
    if matches!(node, NodeRef::Type(_)) {
        return HashMap::new();
    }
    visitor_keys(node.kind())
        .unwrap_or_default()
        .iter()
        .map(|key| {
            let rendered: Vec<String> = node
                .children(key)
                .into_iter()
                .map(|child| stringify_node(child, options))
                .collect();
            (*key, rendered)
        })
        .collect()
}

fn block_text(block: &JsdocBlock, description_lines: Vec<String>, tags: Vec<String>) -> String {
    let head = format!("{}{}{}", block.initial, block.delimiter, block.post_delimiter);
    let mut parts: Vec<String> = description_lines.into_iter().chain(tags).collect();

    if block.end_line == 0 {
        return format!("{}{}{}", head, parts.concat(), block.terminal);
    }

    let preterminal = block.has_preterminal_description || block.has_preterminal_tag_description;
    match parts.last_mut() {
        Some(last) if preterminal => last.push_str(&block.terminal),
        _ => {
            let prefix = block
                .terminal_initial
                .clone()
                .unwrap_or_else(|| format!(" {}", block.initial));
            parts.push(format!("{}{}", prefix, block.terminal));
        }
    }

    let shares_first_line =
        block.description_start_line == Some(0) || block.last_description_line == Some(0);
    let mut text = head;
    if !shares_first_line {
        text.push('\n');
    }
    text.push_str(&parts.join("\n"));

    if block.line_end.is_empty() {
        text
    } else {
        text.replace('\n', &format!("{}\n", block.line_end))
    }
}

fn tag_text(
    tag: &JsdocTag,
    options: &StringifyOptions,
    parsed: Option<String>,
    type_lines: Vec<String>,
    description_lines: Vec<String>,
) -> String {
    let r#type = match parsed {
        Some(parsed) if !options.prefer_raw_type => parsed,
        _ if !type_lines.is_empty() => format!("{{{}}}", type_lines.join("\n")),
        _ if !tag.raw_type.is_empty() => format!("{{{}}}", tag.raw_type),
        _ => String::new(),
    };

    let mut text = format!(
        "{}{}{}@{}{}{}{}{}{}",
        tag.initial,
        tag.delimiter,
        tag.post_delimiter,
        tag.tag,
        tag.post_tag,
        r#type,
        tag.post_type,
        tag.name,
        tag.post_name
    );
    if tag.description_lines.first().is_some_and(|line| line.own_line) {
        text.push('\n');
    }
    text.push_str(&description_lines.join("\n"));
    text
}

fn description_line_text(line: &JsdocDescriptionLine) -> String {
    format!(
        "{}{}{}{}",
        line.initial, line.delimiter, line.post_delimiter, line.description
    )
}

fn type_line_text(line: &JsdocTypeLine) -> String {
    format!(
        "{}{}{}{}",
        line.initial, line.delimiter, line.post_delimiter, line.raw_type
    )
}

/// Lay an inline tag out in the form it was found in.
pub fn inline_tag_text(tag: &JsdocInlineTag) -> String {
    let spacing = tag
        .spacing
        .clone()
        .unwrap_or_else(|| InlineTagSpacing::canonical(tag.format));
    match tag.format {
        InlineTagFormat::Prefix => format!(
            "[{}]{{@{}{}{}}}",
            tag.text, tag.tag, spacing.post_tag, tag.namepath_or_url
        ),
        _ => format!(
            "{{@{}{}{}{}{}{}{}}}",
            tag.tag,
            spacing.post_tag,
            tag.namepath_or_url,
            spacing.pre_separator,
            spacing.separator,
            spacing.post_separator,
            tag.text
        ),
    }
}

fn type_text(node: &TypeNode, options: &StringifyOptions) -> String {
    if options.prefer_raw_type {
        String::new()
    } else {
        format!("{{{}}}", type_expr::stringify(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_description, CommentParser};
    use crate::tree::{build, BuildOptions};
    use crate::type_expr::{parse, ParseMode};
    use serde_json::json;

    fn build_text(text: &str) -> JsdocBlock {
        let block = CommentParser::default().parse(text).remove(0);
        build(&block, &BuildOptions::default()).unwrap()
    }

    fn round_trip(text: &str, options: &StringifyOptions) -> String {
        stringify(&build_text(text), options)
    }

    #[test]
    fn test_round_trip_layouts() {
        let samples = [
            "/**\n * Desc\n */",
            "/** Desc */",
            "/** */",
            "/**\n */",
            "/** @param x */",
            "/**\n * @param {string} x description\n * @returns {number} value\n */",
            "  /**\n   * One\n   *\n   * Two\n   * @param {string} x\n   *   more text\n   */",
            "/**\n * @returns value */",
            "/**\n * Desc */",
            "/** Desc\n * @param x\n */",
            "/** @param x\n * @param y\n */",
            "/**\n * Desc\n   */",
            "/**\n * @param x\n * */",
            "/**\n * @example\n * ```js\n * @foo()\n * ```\n */",
            "/**\n * @param {Array<string>} [x=[]] list\n */",
            "/**\n * @template T, U desc\n */",
            "/**\n * @param x\n *\n *   after a blank line\n */",
            "/**\n * See {@link Foo|the foo} and [bar]{@link Bar}.\n */",
            "/**\n * @param x\nsecond line of x\n */",
            "/**@]\n]*/",
            "/**\n * @param {string} x\n\n */",
        ];
        for text in samples {
            assert_eq!(round_trip(text, &StringifyOptions::default()), text);
        }
    }

    #[test]
    fn test_round_trip_line_ends() {
        let text = "/**\r\n * Desc\r\n * @param {string} x\r\n *   more\r\n */";
        assert_eq!(round_trip(text, &StringifyOptions::default()), text);
    }

    #[test]
    fn test_raw_types() {
        let text = "/**\n * @param {string|\n *   number} x\n * @param {{\n *   a: A\n * }} y\n */";
        let raw = StringifyOptions {
            prefer_raw_type: true,
        };
        assert_eq!(round_trip(text, &raw), text);
        assert_eq!(
            round_trip(text, &StringifyOptions::default()),
            "/**\n * @param {string | number} x\n * @param {{a: A}} y\n */"
        );
    }

    #[test]
    fn test_unparsed_type_uses_type_lines() {
        let text = "/**\n * @param {string<} x\n */";
        assert_eq!(round_trip(text, &StringifyOptions::default()), text);
    }

    #[test]
    fn test_edited_type() {
        let mut block = build_text("/**\n * @param {string} x\n */");
        block.tags[0].parsed_type = Some(parse("number | null", ParseMode::Typescript).unwrap());
        assert_eq!(
            stringify(&block, &StringifyOptions::default()),
            "/**\n * @param {number | null} x\n */"
        );
        let raw = StringifyOptions {
            prefer_raw_type: true,
        };
        assert_eq!(stringify(&block, &raw), "/**\n * @param {string} x\n */");
    }

    #[test]
    fn test_inline_tag_layouts() {
        for text in [
            "{@link Foo}",
            "{@link Foo|the foo}",
            "[the foo]{@link Foo}",
            "{@link Foo the foo}",
            "{@see http://example.com}",
            "{@link Foo | the foo}",
            "{@link Foo  bar}",
            "{@link Foo|}",
            "{@link  Foo}",
            "[the foo]{@linkFoo}",
        ] {
            let tags = parse_description(text);
            assert_eq!(tags.len(), 1);
            let node = JsdocInlineTag::from(&tags[0]);
            assert_eq!(inline_tag_text(&node), text);
            assert_eq!(stringify_node(NodeRef::InlineTag(&node), &StringifyOptions::default()), text);
        }
    }

    #[test]
    fn test_hand_built_tag() {
        let tag = JsdocTag {
            tag: "returns".to_string(),
            post_tag: " ".to_string(),
            raw_type: "number".to_string(),
            post_type: " ".to_string(),
            description: "the sum".to_string(),
            description_lines: vec![JsdocDescriptionLine {
                description: "the sum".to_string(),
                ..JsdocDescriptionLine::default()
            }],
            ..JsdocTag::default()
        };
        assert_eq!(
            stringify_node(NodeRef::Tag(&tag), &StringifyOptions::default()),
            "@returns {number} the sum"
        );
    }

    #[test]
    fn test_stringify_value() {
        let block = build_text("/**\n * @param {string} x\n */");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            stringify_value(&value, &StringifyOptions::default()).unwrap(),
            "/**\n * @param {string} x\n */"
        );

        let value = json!({"type": "JsdocTypeName", "value": "Foo"});
        assert_eq!(
            stringify_value(&value, &StringifyOptions::default()).unwrap(),
            "{Foo}"
        );
        let raw = StringifyOptions {
            prefer_raw_type: true,
        };
        assert_eq!(stringify_value(&value, &raw).unwrap(), "");
    }

    #[test]
    fn test_unknown_node_kind() {
        let value = json!({"type": "Program"});
        assert_eq!(
            stringify_value(&value, &StringifyOptions::default()),
            Err(StringifyError::UnknownNodeKind("Program".to_string()))
        );
        assert_eq!(
            StringifyError::UnknownNodeKind("Program".to_string()).to_string(),
            "Unhandled node type: Program"
        );
        assert!(matches!(
            stringify_value(&json!({"type": "JsdocTag"}), &StringifyOptions::default()),
            Err(StringifyError::Malformed { .. })
        ));
    }
}
