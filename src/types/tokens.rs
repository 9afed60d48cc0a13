//! @dose
//! purpose: Tokenizer-side data types. Every physical comment line becomes a Line holding raw
//!     Tokens; tag sections become TagSpecs; a whole comment becomes a CommentBlock that the
//!     tree builder folds into a JsdocBlock.
//!
//! when-editing:
//!     - !Token fields are raw source slices; concatenating them in field order must give back
//!       the physical line
//!     - TagSpec.lines indexes into CommentBlock.source, it never owns lines
//!
//! invariants:
//!     - CommentBlock.source is in physical-line order
//!     - A TagSpec's first line is the line carrying its @tag marker
//!
//! gotchas:
//!     - Tokenizers mutate Line.tokens in place, so the same Line is seen by both the block and
//!       its TagSpec

use crate::parser::inline_tags::InlineTag;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Raw fields of one physical comment line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tokens {
    /// Leading whitespace before the delimiter
    pub start: String,
    /// `/**` on the opening line, `*` on continuation lines, or empty
    pub delimiter: String,
    pub post_delimiter: String,
    /// Tag marker including the `@`
    pub tag: String,
    pub post_tag: String,
    pub name: String,
    pub post_name: String,
    /// Type text including braces on the first and last type line
    pub r#type: String,
    pub post_type: String,
    pub description: String,
    /// `*/` plus any trailing whitespace on the closing line
    pub end: String,
    /// Trailing carriage returns
    pub line_end: String,
}

impl Tokens {
    /// Reassemble the physical line from its fields.
    pub fn join(&self) -> String {
        [
            self.start.as_str(),
            &self.delimiter,
            &self.post_delimiter,
            &self.tag,
            &self.post_tag,
            &self.r#type,
            &self.post_type,
            &self.name,
            &self.post_name,
            &self.description,
            &self.end,
            &self.line_end,
        ]
        .concat()
    }
}

/// One physical line of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Line number within the parsed text (0-based)
    pub number: usize,
    /// The untouched line text
    pub source: String,
    pub tokens: Tokens,
}

/// Problem codes reported by the field tokenizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemCode {
    #[serde(rename = "spec:tag:prefix")]
    TagPrefix,
    #[serde(rename = "spec:type:unpaired-curlies")]
    TypeUnpairedCurlies,
    #[serde(rename = "spec:name:unpaired-brackets")]
    NameUnpairedBrackets,
    #[serde(rename = "spec:name:empty-name")]
    NameEmpty,
    #[serde(rename = "spec:name:empty-default")]
    NameEmptyDefault,
    #[serde(rename = "spec:name:invalid-default")]
    NameInvalidDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub code: ProblemCode,
    pub message: String,
    /// Line number of the tag's first line
    pub line: usize,
    /// A critical problem stops the tokenizer pipeline for its tag
    pub critical: bool,
}

/// A tag section after tokenization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSpec {
    /// Tag name without the `@`
    pub tag: String,
    pub name: String,
    /// Type text without the enclosing braces
    pub r#type: String,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub description: String,
    pub problems: Vec<Problem>,
    /// Lines of this section as indices into `CommentBlock::source`
    pub lines: Range<usize>,
    pub inline_tags: Vec<InlineTag>,
}

impl TagSpec {
    pub fn new(lines: Range<usize>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn has_critical_problem(&self) -> bool {
        self.problems.last().is_some_and(|p| p.critical)
    }
}

/// A tokenized comment, ready for the tree builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBlock {
    /// Compact-joined description preceding the first tag
    pub description: String,
    pub tags: Vec<TagSpec>,
    pub source: Vec<Line>,
    pub problems: Vec<Problem>,
    pub inline_tags: Vec<InlineTag>,
}

impl CommentBlock {
    /// The tokenized tag whose section starts at `line`.
    pub fn tag_at_line(&self, line: usize) -> Option<&TagSpec> {
        self.tags.iter().find(|spec| spec.lines.start == line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_join_restores_line() {
        let tokens = Tokens {
            start: "  ".to_string(),
            delimiter: "*".to_string(),
            post_delimiter: " ".to_string(),
            tag: "@param".to_string(),
            post_tag: " ".to_string(),
            r#type: "{string}".to_string(),
            post_type: " ".to_string(),
            name: "x".to_string(),
            post_name: " ".to_string(),
            description: "the x".to_string(),
            ..Tokens::default()
        };
        assert_eq!(tokens.join(), "  * @param {string} x the x");
    }

    #[test]
    fn test_tag_at_line() {
        let block = CommentBlock {
            tags: vec![TagSpec::new(1..3), TagSpec::new(3..4)],
            ..CommentBlock::default()
        };
        assert_eq!(block.tag_at_line(3).map(|t| t.lines.clone()), Some(3..4));
        assert!(block.tag_at_line(2).is_none());
    }

    #[test]
    fn test_critical_problem_is_last() {
        let mut spec = TagSpec::new(0..1);
        assert!(!spec.has_critical_problem());
        spec.problems.push(Problem {
            code: ProblemCode::NameEmpty,
            message: "empty name".to_string(),
            line: 0,
            critical: true,
        });
        assert!(spec.has_critical_problem());
    }
}
