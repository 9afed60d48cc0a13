//! @dose
//! purpose: Turns raw comment text into tokenized CommentBlocks. Lines are split by the source
//!     parser, cut into sections, and each tag section runs through the tokenizer pipeline
//!     chosen by a TokenizationPolicy. Inline tags are extracted from the joined descriptions.
//!
//! when-editing:
//!     - !The tokenizer list is built once per CommentParser and shared across threads
//!     - Host-language lookup (finding the comment for a declaration) lives in `typescript`
//!
//! invariants:
//!     - Every line of a comment appears exactly once in CommentBlock.source
//!     - CommentBlock.tags is ordered by the line each tag starts on
//!
//! gotchas:
//!     - parse_comment receives the comment value as a host parser reports it, i.e. the text
//!       between `/*` and `*/`, so `/**` comments start with `*`
//!
//! flows:
//!     - Parse: source lines -> sections -> tokenizer pipeline per tag -> inline tags

pub mod block;
pub mod inline_tags;
pub mod source;
pub mod tokenizers;
pub mod typescript;

use crate::types::tokens::{CommentBlock, Line, TagSpec};
use block::{join_description, split_sections, Spacing};
use thiserror::Error;
use tokenizers::{run_pipeline, TokenizationPolicy, Tokenizer};

pub use inline_tags::{parse_description, InlineTag};
pub use typescript::{
    collect_doc_comments, documented_declarations, find_doc_comment, reduce_declaration,
    Documented, HostLanguage, SourceComment,
};

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse source: {0}")]
    ParseError(String),
    #[error("Unsupported language for extension: {0}")]
    UnsupportedLanguage(String),
}

/// Comment parser with a fixed tokenizer pipeline.
pub struct CommentParser {
    tokenizers: Vec<Box<dyn Tokenizer>>,
}

impl CommentParser {
    pub fn new(policy: &TokenizationPolicy) -> Self {
        Self::with_tokenizers(policy.tokenizers())
    }

    pub fn with_tokenizers(tokenizers: Vec<Box<dyn Tokenizer>>) -> Self {
        Self { tokenizers }
    }

    /// Parse every `/** ... */` comment in `text`.
    pub fn parse(&self, text: &str) -> Vec<CommentBlock> {
        source::parse_source(text)
            .into_iter()
            .map(|lines| self.parse_lines(lines))
            .collect()
    }

    /// Tokenize the lines of one comment.
    pub fn parse_lines(&self, mut lines: Vec<Line>) -> CommentBlock {
        let sections = split_sections(&lines);
        let description = sections
            .first()
            .map(|range| join_description(&lines[range.clone()], Spacing::Compact))
            .unwrap_or_default();

        let mut tags = Vec::with_capacity(sections.len().saturating_sub(1));
        let mut problems = Vec::new();
        for range in sections.into_iter().skip(1) {
            let mut spec = TagSpec::new(range.clone());
            run_pipeline(&self.tokenizers, &mut spec, &mut lines[range]);
            spec.inline_tags = parse_description(&spec.description);
            problems.extend(spec.problems.iter().cloned());
            tags.push(spec);
        }

        CommentBlock {
            inline_tags: parse_description(&description),
            description,
            tags,
            source: lines,
            problems,
        }
    }
}

impl Default for CommentParser {
    fn default() -> Self {
        Self::new(&TokenizationPolicy::default())
    }
}

/// Parse a host comment value (the text between `/*` and `*/`), re-indenting the opening line
/// by `indent`. Returns `None` unless the value forms a `/**` comment.
pub fn parse_comment(value: &str, indent: &str) -> Option<CommentBlock> {
    parse_comment_with(&CommentParser::default(), value, indent)
}

pub fn parse_comment_with(
    parser: &CommentParser,
    value: &str,
    indent: &str,
) -> Option<CommentBlock> {
    let text = format!("{}/*{}*/", indent, value);
    parser.parse(&text).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tokens::ProblemCode;
    use crate::types::InlineTagFormat;

    #[test]
    fn test_parse_comment_sections() {
        let value = "*\n * Adds {@link Num} values.\n * @param {number} a first\n * @returns {number}\n ";
        let block = parse_comment(value, "").unwrap();
        assert_eq!(block.description, "Adds {@link Num} values.");
        assert_eq!(block.source.len(), 5);
        assert_eq!(block.tags.len(), 2);
        assert_eq!(block.tags[0].tag, "param");
        assert_eq!(block.tags[0].name, "a");
        assert_eq!(block.tags[0].lines, 2..3);
        assert_eq!(block.tags[1].tag, "returns");
        assert_eq!(block.tags[1].r#type, "number");
        assert_eq!(block.inline_tags.len(), 1);
        assert_eq!(block.inline_tags[0].format, InlineTagFormat::Plain);
    }

    #[test]
    fn test_indent_applies_to_first_line() {
        let block = parse_comment("* x ", "    ").unwrap();
        assert_eq!(block.source[0].tokens.start, "    ");
        assert_eq!(block.source[0].source, "    /** x */");
    }

    #[test]
    fn test_non_doc_comments() {
        assert!(parse_comment(" plain ", "").is_none());
        assert!(parse_comment("** banner ", "").is_none());
    }

    #[test]
    fn test_tag_inline_tags_and_problems() {
        let block =
            parse_comment("*\n * @see {@link Foo|the foo}\n * @param {string name\n ", "").unwrap();
        assert_eq!(block.tags[0].inline_tags.len(), 1);
        assert_eq!(block.tags[0].inline_tags[0].format, InlineTagFormat::Pipe);
        assert_eq!(block.problems.len(), 1);
        assert_eq!(block.problems[0].code, ProblemCode::TypeUnpairedCurlies);
    }

    #[test]
    fn test_custom_tokenizers() {
        let parser = CommentParser::with_tokenizers(vec![Box::new(tokenizers::TagTokenizer)]);
        let block = parser.parse("/** @param {string} x */").remove(0);
        assert_eq!(block.tags[0].tag, "param");
        assert!(block.tags[0].r#type.is_empty());
        assert_eq!(block.source[0].tokens.description, "{string} x ");
    }
}
