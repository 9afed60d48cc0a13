//! @dose
//! purpose: Library crate root for docblock. Turns JSDoc comments into lossless ESTree-style
//!     trees, queries them with selectors and prints them back to the exact source text.
//!     Re-exports the types and entry points consumers reach for most.
//!
//! when-editing:
//!     - !All public modules must be declared here with pub mod
//!     - !Re-exports should include commonly used types and functions
//!     - Keep the re-export list organized by module
//!
//! invariants:
//!     - build then stringify reproduces the comment text for every layout the builder accepts
//!     - parse_all returns one result per input comment, in input order
//!
//! do-not:
//!     - Never install a tracing subscriber from library code
//!
//! flows:
//!     - Parse: comment value -> parser::parse_comment -> tree::build -> JsdocBlock
//!     - Print: JsdocBlock -> formatter::stringify -> text
//!     - Query: JsdocBlock -> serde_json::Value -> selector::query

pub mod config;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod selector;
pub mod tree;
pub mod type_expr;
pub mod types;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};

// Re-export main types for convenience
pub use config::Settings;
pub use error::Error;
pub use formatter::{stringify, stringify_node, stringify_value, StringifyError, StringifyOptions};
pub use parser::{
    documented_declarations, parse_comment, parse_comment_with, CommentParser, Documented,
    HostLanguage, LookupError, SourceComment,
};
pub use selector::{comment_handler, compile, query, Selector, SelectorError};
pub use tree::{build, build_with, visitor_keys, BuildError, BuildOptions, NodeRef};
pub use type_expr::{ParseMode, TypeNode, TypeParseError};
pub use types::{
    CommentBlock, InlineTagFormat, JsdocBlock, JsdocDescriptionLine, JsdocInlineTag, JsdocTag,
    JsdocTypeLine,
};

static WORD_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([a-z])").unwrap());

/// Turn a snake_case name into an upper camel case one: `test_one` becomes `TestOne`.
pub fn to_camel_case(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    let capitalized = match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            format!("{}{}", first.to_ascii_uppercase(), chars.as_str())
        }
        _ => lower.clone(),
    };
    WORD_BREAK
        .replace_all(&capitalized, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Parse and build one comment value (the text between `/*` and `*/`).
pub fn parse_to_tree(value: &str, indent: &str, settings: &Settings) -> Result<JsdocBlock, Error> {
    let parser = CommentParser::new(settings.tokenization_policy());
    let block = parse_comment_with(&parser, value, indent)
        .ok_or_else(|| Error::NotDocComment(value.to_string()))?;
    Ok(build(&block, &settings.build_options())?)
}

/// Build a tree for every comment, in parallel. Results keep input order.
pub fn parse_all(comments: &[SourceComment], settings: &Settings) -> Vec<Result<JsdocBlock, Error>> {
    let parser = CommentParser::new(settings.tokenization_policy());
    let options = settings.build_options();

    comments
        .par_iter()
        .map(|comment| {
            let block = parse_comment_with(&parser, &comment.value, &comment.indent)
                .ok_or_else(|| Error::NotDocComment(comment.value.clone()))?;
            Ok(build(&block, &options)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(value: &str) -> SourceComment {
        SourceComment {
            value: value.to_string(),
            indent: String::new(),
            start_line: 0,
            end_line: 0,
            start_byte: 0,
            end_byte: 0,
        }
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("test_one"), "TestOne");
        assert_eq!(to_camel_case("JSDOC_TYPE_NAME"), "JsdocTypeName");
        assert_eq!(to_camel_case("already"), "Already");
        assert_eq!(to_camel_case("_lead"), "Lead");
        assert_eq!(to_camel_case("a_1b"), "A_1b");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_parse_to_tree() {
        let tree = parse_to_tree("* @param {string} a first\n ", "", &Settings::default()).unwrap();
        assert_eq!(tree.tags.len(), 1);
        assert_eq!(tree.tags[0].name, "a");
    }

    #[test]
    fn test_parse_to_tree_rejects_plain_block_comment() {
        let result = parse_to_tree(" plain ", "", &Settings::default());
        assert!(matches!(result, Err(Error::NotDocComment(_))));
    }

    #[test]
    fn test_parse_all_keeps_order() {
        let comments = vec![
            comment("*\n * first\n "),
            comment(" not a doc comment "),
            comment("*\n * @returns {number} total\n "),
        ];
        let results = parse_all(&comments, &Settings::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().description, "first");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().tags[0].tag, "returns");
    }

    #[test]
    fn test_parse_all_strict_types() {
        let settings = Settings {
            throw_on_type_parsing_errors: true,
            ..Settings::default()
        };
        let results = parse_all(&[comment("*\n * @param {string<} a\n ")], &settings);
        assert!(matches!(results[0], Err(Error::Build(BuildError::TypeParse { .. }))));
    }
}
