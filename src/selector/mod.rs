//! @dose
//! purpose: A selector language for querying comment trees in their JSON form: node kinds,
//!     attribute tests, `:has`/`:not`/`:matches`/`:nth-child` pseudo-classes and the `>` and
//!     descendant combinators. Children are reached only through the traversal key table.
//!
//! when-editing:
//!     - !Node kinds compare case-insensitively (`JSDocTag` matches `JsdocTag`)
//!     - !`:has` searches the subtree of the tested node, and ancestry inside it is rooted there
//!     - Sibling positions are 1-based and count only nodes in the same child array
//!
//! invariants:
//!     - compile() never panics on user input; every failure is a SelectorError
//!     - query() returns nodes in pre-order document order
//!
//! gotchas:
//!     - A node held in a single-valued field (e.g. parsedType) has no sibling position, so
//!       `:nth-child` never matches it
//!
//! flows:
//!     - compile: text -> parse::Parser -> Selector
//!     - match: node + ancestry -> rightmost compound -> combinators walk the ancestry

mod matcher;
mod parse;

use crate::config::Settings;
use crate::error::Error;
use crate::tree::builder::build;
use crate::types::tokens::CommentBlock;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Invalid selector at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("Unknown pseudo-class :{0}")]
    UnknownPseudo(String),
    #[error("Invalid regular expression /{pattern}/: {message}")]
    Regex { pattern: String, message: String },
}

/// A compiled selector: one or more comma-separated alternatives.
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Compounds joined by combinators, leftmost first.
#[derive(Debug, Clone)]
struct Complex {
    head: Compound,
    rest: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    /// Lowercased node kind; `None` for `*` or no kind at all
    kind: Option<String>,
    tests: Vec<Test>,
}

#[derive(Debug, Clone)]
enum Test {
    Attribute {
        path: Vec<String>,
        condition: Option<Condition>,
    },
    Has(Selector),
    Not(Selector),
    Matches(Selector),
    NthChild(usize),
    NthLastChild(usize),
    /// The node a relative `:has(> ...)` search starts from
    Scope,
}

#[derive(Debug, Clone)]
struct Condition {
    negated: bool,
    value: AttributeValue,
}

#[derive(Debug, Clone)]
enum AttributeValue {
    Literal(String),
    Pattern(Regex),
}

/// Compile selector text.
pub fn compile(text: &str) -> Result<Selector, SelectorError> {
    parse::Parser::new(text).parse()
}

/// Does `root` itself match?
pub fn matches(root: &Value, selector: &Selector) -> bool {
    matcher::matches(root, selector, &[])
}

/// Every node under and including `root` that matches, in document order.
pub fn query<'a>(root: &'a Value, selector: &Selector) -> Vec<&'a Value> {
    let mut found = Vec::new();
    matcher::traverse(root, &mut Vec::new(), &mut |node, ancestry| {
        if matcher::matches(node, selector, ancestry) {
            found.push(node);
        }
    });
    found
}

/// A reusable test of comments against selectors, building trees with `settings`.
pub fn comment_handler(
    settings: &Settings,
) -> impl Fn(&str, &CommentBlock) -> Result<bool, Error> {
    let options = settings.build_options();
    move |selector: &str, comment: &CommentBlock| {
        let selector = compile(selector)?;
        let tree = build(comment, &options)?;
        let value = serde_json::to_value(&tree)?;
        Ok(matches(&value, &selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_comment;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "type": "JsdocBlock",
            "descriptionLines": [],
            "inlineTags": [],
            "tags": [
                {
                    "type": "JsdocTag",
                    "tag": "param",
                    "name": "opt_a",
                    "parsedType": {
                        "type": "JsdocTypeUnion",
                        "elements": [
                            {"type": "JsdocTypeName", "value": "Bar"},
                            {"type": "JsdocTypeName", "value": "Foo"}
                        ]
                    },
                    "typeLines": [],
                    "descriptionLines": [],
                    "inlineTags": []
                },
                {
                    "type": "JsdocTag",
                    "tag": "returns",
                    "name": "",
                    "parsedType": null,
                    "typeLines": [],
                    "descriptionLines": [],
                    "inlineTags": []
                }
            ]
        })
    }

    fn count(selector: &str) -> usize {
        query(&tree(), &compile(selector).unwrap()).len()
    }

    #[test]
    fn test_kinds_and_wildcard() {
        assert_eq!(count("JsdocTag"), 2);
        assert_eq!(count("jsdoctag"), 2);
        assert_eq!(count("JSDocTypeName"), 2);
        assert_eq!(count("*"), 6);
        assert!(matches(&tree(), &compile("JsdocBlock").unwrap()));
        assert!(!matches(&tree(), &compile("JsdocTag").unwrap()));
    }

    #[test]
    fn test_attributes() {
        assert_eq!(count("[tag=\"param\"]"), 1);
        assert_eq!(count("[tag='returns']"), 1);
        assert_eq!(count("[tag=param]"), 1);
        assert_eq!(count("JsdocTag[tag!=\"param\"]"), 1);
        assert_eq!(count("[name=/^opt_/]"), 1);
        assert_eq!(count("[value=/^bar$/i]"), 1);
        assert_eq!(count("[parsedType]"), 1);
        assert_eq!(count("JsdocTag[parsedType.type=\"JsdocTypeUnion\"]"), 1);
    }

    #[test]
    fn test_combinators() {
        assert_eq!(count("JsdocTag > JsdocTypeUnion"), 1);
        assert_eq!(count("JsdocBlock > JsdocTypeUnion"), 0);
        assert_eq!(count("JsdocBlock JsdocTypeName"), 2);
        assert_eq!(count("JsdocTag JsdocTypeName, JsdocTypeUnion"), 3);
    }

    #[test]
    fn test_pseudo_classes() {
        assert_eq!(count("JsdocTypeName:nth-child(1)"), 1);
        assert_eq!(count("JsdocTypeName:first-child"), 1);
        assert_eq!(count("JsdocTypeName:last-child[value=\"Foo\"]"), 1);
        assert_eq!(count("JsdocTypeName:nth-last-child(2)"), 1);
        assert_eq!(count("JsdocTag:first-child"), 1);
        assert_eq!(count("JsdocTypeUnion:first-child"), 0);
        assert_eq!(count("JsdocTag:has(JsdocTypeName)"), 1);
        assert_eq!(count("JsdocTag:not([tag=\"param\"])"), 1);
        assert_eq!(count("JsdocTag:matches([tag=\"param\"], [tag=\"returns\"])"), 2);
        assert_eq!(count(":is(JsdocTypeUnion, JsdocTypeName)"), 3);
    }

    #[test]
    fn test_has_is_rooted_at_tested_node() {
        assert_eq!(count("JsdocTag:has(> JsdocTypeUnion)"), 1);
        assert_eq!(count("JsdocBlock:has(> JsdocTypeUnion)"), 0);
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            compile("JsdocTag["),
            Err(SelectorError::Syntax { .. })
        ));
        assert_eq!(
            compile("JsdocTag:hover").unwrap_err(),
            SelectorError::UnknownPseudo("hover".to_string())
        );
        assert!(matches!(
            compile("[name=/(/]"),
            Err(SelectorError::Regex { .. })
        ));
        assert!(compile("").is_err());
        assert!(compile("A >").is_err());
    }

    #[test]
    fn test_comment_handler() {
        let handler = comment_handler(&Settings::default());
        let comment = parse_comment("*\n * @param {string} x\n ", "").unwrap();
        assert!(handler("JsdocBlock:has(JsdocTag[name=\"x\"])", &comment).unwrap());
        assert!(!handler("JsdocBlock:has(JsdocTag[name=\"y\"])", &comment).unwrap());
        assert!(handler("JsdocTag[", &comment).is_err());
    }
}
