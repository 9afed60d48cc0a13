//! Section splitting and description joiners.
//!
//! A comment's lines are cut into sections: the first holds the block description, every
//! further section starts at a line whose description begins with `@tag`. Tag markers inside
//! fenced code (```` ``` ````) do not start sections.

use crate::parser::source::MARKERS;
use crate::types::tokens::Line;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

static TAG_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@\S+").unwrap());

const FENCE: &str = "```";

/// How multi-line text is joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// Trim lines and join them with single spaces
    #[default]
    Compact,
    /// Keep line breaks and indentation beyond the delimiter
    Preserve,
}

/// Cut a comment into sections. The first range is the block description and may be empty.
pub fn split_sections(lines: &[Line]) -> Vec<Range<usize>> {
    let mut starts = vec![0];
    let mut fenced = false;

    for (idx, line) in lines.iter().enumerate() {
        let description = &line.tokens.description;
        if !fenced && TAG_START.is_match(description) {
            starts.push(idx);
        }
        if description.matches(FENCE).count() % 2 == 1 {
            fenced = !fenced;
        }
    }

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(lines.len());
        sections.push(start..end);
    }
    sections
}

/// Join the description tokens of `lines`.
pub fn join_description(lines: &[Line], spacing: Spacing) -> String {
    match spacing {
        Spacing::Compact => compact(lines),
        Spacing::Preserve => preserve(lines),
    }
}

fn compact(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.tokens.description.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn preserve(mut lines: &[Line]) -> String {
    if let Some(first) = lines.first() {
        if first.tokens.description.is_empty() && first.tokens.delimiter == MARKERS.start {
            lines = &lines[1..];
        }
    }
    if let Some(last) = lines.last() {
        if last.tokens.description.is_empty() && last.tokens.end.ends_with(MARKERS.end) {
            lines = &lines[..lines.len() - 1];
        }
    }

    // text starts on the line where the type ends
    let from = lines
        .iter()
        .rposition(|line| !line.tokens.r#type.is_empty())
        .unwrap_or(0);

    lines[from..]
        .iter()
        .map(|line| {
            let tokens = &line.tokens;
            let indent = if tokens.delimiter.is_empty() {
                tokens.start.as_str()
            } else {
                skip_first_char(&tokens.post_delimiter)
            };
            format!("{}{}", indent, tokens.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn skip_first_char(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::source::parse_source;

    fn lines(text: &str) -> Vec<Line> {
        parse_source(text).into_iter().next().unwrap()
    }

    #[test]
    fn test_sections() {
        let source = lines("/**\n * Desc\n * @param a\n * more\n * @returns x\n */");
        assert_eq!(split_sections(&source), vec![0..2, 2..4, 4..6]);
    }

    #[test]
    fn test_tag_on_first_line() {
        let source = lines("/** @param a */");
        assert_eq!(split_sections(&source), vec![0..0, 0..1]);
    }

    #[test]
    fn test_fenced_tags_are_ignored() {
        let source = lines("/**\n * @example\n * ```\n * @notatag\n * ```\n * @since 1\n */");
        assert_eq!(split_sections(&source), vec![0..1, 1..5, 5..7]);
    }

    #[test]
    fn test_compact_join() {
        let source = lines("/**\n *  one \n *\n * two\n */");
        assert_eq!(join_description(&source, Spacing::Compact), "one two");
    }

    #[test]
    fn test_preserve_join_keeps_indentation() {
        let source = lines("/**\n * one\n *   two\n *\n * three\n */");
        assert_eq!(
            join_description(&source, Spacing::Preserve),
            "one\n  two\n\nthree"
        );
    }

    #[test]
    fn test_preserve_join_without_delimiters() {
        let source = lines("/**\n one\n   two\n */");
        assert_eq!(join_description(&source, Spacing::Preserve), " one\n   two");
    }
}
