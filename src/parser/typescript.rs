//! @dose
//! purpose: Finds documentation comments in TypeScript and JavaScript source. It uses tree-sitter
//!     to walk declarations, climbs from expressions to the statement that carries their comment,
//!     and picks the nearest preceding `/** ... */` block within a configurable line gap.
//!
//! when-editing:
//!     - !The tree-sitter language selection depends on file extension (tsx vs ts vs js)
//!     - !Comment lookup only looks at the previous sibling chain; comments are extras in
//!       tree-sitter and sit next to the node they precede
//!     - Line comments between a doc comment and its declaration are skipped
//!
//! invariants:
//!     - A SourceComment value is the text between `/*` and `*/`, so it starts with `*`
//!     - Each doc comment is paired with at most one declaration
//!
//! do-not:
//!     - Never use regex for locating declarations; always use tree-sitter
//!     - Never panic on parse errors; return LookupError instead
//!
//! gotchas:
//!     - Decorators on class members are siblings of the member, not children
//!     - Function and class expressions passed as call arguments keep their own comment
//!
//! flows:
//!     - Lookup: declaration -> reduce_declaration -> find_doc_comment -> SourceComment

use crate::config::Settings;
use crate::parser::LookupError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::trace;
use tree_sitter::{Node, Parser, TreeCursor};

/// Declarations that may be wrapped in an `export` statement.
const DECLARATIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "function_signature",
];

/// Expressions whose comment usually sits on an enclosing statement.
const EXPRESSIONS: &[&str] = &[
    "function_expression",
    "arrow_function",
    "class",
    "object",
    "generator_function",
];

/// Nodes that may carry a comment for an expression they contain.
const COMMENT_HOLDERS: &[&str] = &[
    "assignment_pattern",
    "lexical_declaration",
    "variable_declaration",
    "expression_statement",
    "method_definition",
    "pair",
    "public_field_definition",
    "field_definition",
    "export_statement",
    "return_statement",
];

/// Nodes reported by documented_declarations.
const DOCUMENTABLE: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "function_signature",
    "method_definition",
    "method_signature",
    "abstract_method_signature",
    "public_field_definition",
    "field_definition",
    "property_signature",
    "function_expression",
    "arrow_function",
    "class",
];

/// Grammar used for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostLanguage {
    TypeScript,
    Tsx,
    JavaScript,
}

impl HostLanguage {
    pub fn from_extension(ext: &str) -> Result<Self, LookupError> {
        match ext {
            "ts" | "mts" | "cts" => Ok(Self::TypeScript),
            "tsx" => Ok(Self::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Ok(Self::JavaScript),
            other => Err(LookupError::UnsupportedLanguage(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, LookupError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    fn create_parser(self) -> Result<Parser, LookupError> {
        let mut parser = Parser::new();
        let language = match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        };
        parser
            .set_language(&language)
            .map_err(|e| LookupError::ParseError(e.to_string()))?;
        Ok(parser)
    }
}

/// A `/** ... */` comment found in host source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceComment {
    /// Text between `/*` and `*/`
    pub value: String,
    /// Whitespace before the comment on its first line
    pub indent: String,
    /// 0-based line of `/**`
    pub start_line: usize,
    /// 0-based line of `*/`
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl SourceComment {
    fn from_node(node: Node, source: &str) -> Option<Self> {
        let text = node_text(node, source);
        let value = text.strip_prefix("/*")?.strip_suffix("*/")?;

        let line_start = source[..node.start_byte()]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let prefix = &source[line_start..node.start_byte()];
        let indent = if prefix.chars().all(char::is_whitespace) {
            prefix.to_string()
        } else {
            " ".repeat(node.start_position().column)
        };

        Some(Self {
            value: value.to_string(),
            indent,
            start_line: node.start_position().row,
            end_line: node.end_position().row,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        })
    }
}

/// A declaration and the doc comment attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documented {
    /// tree-sitter kind of the declaration node
    pub kind: String,
    pub name: Option<String>,
    /// 0-based line where the commented node starts
    pub line: usize,
    pub comment: SourceComment,
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn is_comment(node: Node) -> bool {
    node.kind() == "comment"
}

fn has_comment_before(node: Node) -> bool {
    node.prev_sibling().is_some_and(is_comment)
}

/// Climb from `node` to the node whose leading comment documents it.
pub fn reduce_declaration(node: Node) -> Node {
    let kind = node.kind();
    if DECLARATIONS.contains(&kind) {
        return match node.parent() {
            Some(parent) if parent.kind() == "export_statement" => parent,
            _ => node,
        };
    }
    if EXPRESSIONS.contains(&kind) {
        return reduce_expression(node);
    }
    node
}

fn reduce_expression(node: Node) -> Node {
    let Some(mut parent) = node.parent() else {
        return node;
    };
    // call or new argument
    if parent.kind() == "arguments" {
        return node;
    }
    if preceding_token(node).is_some_and(is_comment) {
        return node;
    }

    while !has_comment_before(parent)
        && !parent.kind().contains("function")
        && !COMMENT_HOLDERS.contains(&parent.kind())
    {
        match parent.parent() {
            Some(next) => parent = next,
            None => return node,
        }
    }

    if parent.kind() == "function_declaration" || parent.kind() == "program" {
        return node;
    }
    match parent.parent() {
        Some(grand) if grand.kind() == "export_statement" => grand,
        _ => parent,
    }
}

/// Previous sibling, looking through opening parentheses.
fn preceding_token(node: Node) -> Option<Node> {
    let mut prev = node.prev_sibling();
    while let Some(token) = prev {
        if token.kind() != "(" {
            break;
        }
        prev = token.prev_sibling();
    }
    prev
}

/// The doc comment for an already-reduced node, if one sits within `[min_lines, max_lines]`
/// lines above it.
pub fn find_doc_comment(
    node: Node,
    source: &str,
    min_lines: usize,
    max_lines: usize,
) -> Option<SourceComment> {
    let mut current = node;
    let comment = loop {
        let mut before = preceding_token(current)?;
        while before.kind() == "decorator" {
            current = before;
            before = preceding_token(current)?;
        }
        if !is_comment(before) {
            return None;
        }
        if node_text(before, source).starts_with("//") {
            current = before;
            continue;
        }
        break before;
    };

    let found = SourceComment::from_node(comment, source)?;
    let is_doc = found
        .value
        .strip_prefix('*')
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace);
    let gap = current.start_position().row.checked_sub(found.end_line)?;

    trace!(
        kind = node.kind(),
        line = current.start_position().row,
        gap,
        is_doc,
        "comment before declaration"
    );

    if is_doc && gap >= min_lines && gap <= max_lines {
        Some(found)
    } else {
        None
    }
}

fn parse_tree(source: &str, lang: HostLanguage) -> Result<tree_sitter::Tree, LookupError> {
    let mut parser = lang.create_parser()?;
    parser
        .parse(source, None)
        .ok_or_else(|| LookupError::ParseError("Failed to parse source".to_string()))
}

/// Every `/**` comment in `source`, in source order.
pub fn collect_doc_comments(
    source: &str,
    lang: HostLanguage,
) -> Result<Vec<SourceComment>, LookupError> {
    let tree = parse_tree(source, lang)?;
    let mut comments = Vec::new();
    let mut cursor = tree.walk();
    visit(&mut cursor, &mut |node| {
        if is_comment(node) {
            let text = node_text(node, source);
            if text.starts_with("/**") && !text.starts_with("/***") {
                comments.extend(SourceComment::from_node(node, source));
            }
        }
    });
    Ok(comments)
}

/// Declarations in `source` paired with their doc comments.
pub fn documented_declarations(
    source: &str,
    lang: HostLanguage,
    settings: &Settings,
) -> Result<Vec<Documented>, LookupError> {
    let tree = parse_tree(source, lang)?;
    let mut found: Vec<Documented> = Vec::new();
    let mut cursor = tree.walk();

    visit(&mut cursor, &mut |node| {
        if !DOCUMENTABLE.contains(&node.kind()) {
            return;
        }
        let reduced = reduce_declaration(node);
        let Some(comment) =
            find_doc_comment(reduced, source, settings.min_lines, settings.max_lines)
        else {
            return;
        };
        if found
            .iter()
            .any(|d| d.comment.start_byte == comment.start_byte)
        {
            return;
        }
        found.push(Documented {
            kind: node.kind().to_string(),
            name: declaration_name(reduced, source),
            line: reduced.start_position().row,
            comment,
        });
    });

    Ok(found)
}

/// Read a file and pair its declarations with their doc comments.
pub fn documented_declarations_in_file(
    path: &Path,
    settings: &Settings,
) -> Result<Vec<Documented>, LookupError> {
    let lang = HostLanguage::from_path(path)?;
    let source = std::fs::read_to_string(path)?;
    documented_declarations(&source, lang, settings)
}

fn visit<'t>(cursor: &mut TreeCursor<'t>, f: &mut dyn FnMut(Node<'t>)) {
    loop {
        f(cursor.node());
        if cursor.goto_first_child() {
            visit(cursor, f);
            cursor.goto_parent();
        }
        if !cursor.goto_next_sibling() {
            return;
        }
    }
}

fn declaration_name(node: Node, source: &str) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(name, source).to_string());
    }
    match node.kind() {
        "export_statement" => {
            let declaration = node.child_by_field_name("declaration")?;
            declaration_name(declaration, source)
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            let declarator = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "variable_declarator")?;
            declaration_name(declarator, source)
        }
        "pair" => {
            let key = node.child_by_field_name("key")?;
            Some(node_text(key, source).to_string())
        }
        "expression_statement" => {
            let expression = node.named_child(0)?;
            let left = expression.child_by_field_name("left")?;
            Some(node_text(left, source).to_string())
        }
        _ => None,
    }
}
