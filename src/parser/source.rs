//! @dose
//! purpose: Splits comment text into physical lines and each line into raw Tokens (indentation,
//!     delimiter, post-delimiter whitespace, description, terminator, line end). Lines outside a
//!     `/** ... */` block are skipped.
//!
//! when-editing:
//!     - !Only the opening, delimiter and closing marks are split here; tag/type/name splitting
//!       belongs to the field tokenizers
//!     - Keep the parser stateful per text: a block may span many pushed lines
//!
//! invariants:
//!     - Tokens::join() of every emitted line equals the line's source
//!
//! gotchas:
//!     - `/***` does not open a block
//!     - The closing token keeps whitespace that trails `*/`

use crate::types::tokens::{Line, Tokens};

/// Comment markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub start: &'static str,
    pub nostart: &'static str,
    pub delim: &'static str,
    pub end: &'static str,
}

pub const MARKERS: Markers = Markers {
    start: "/**",
    nostart: "/***",
    delim: "*",
    end: "*/",
};

/// Split trailing carriage returns: `(line_end, rest)`.
pub fn split_cr(source: &str) -> (&str, &str) {
    let rest = source.trim_end_matches('\r');
    (&source[rest.len()..], rest)
}

/// Split leading whitespace: `(space, rest)`.
pub fn split_space(source: &str) -> (&str, &str) {
    let rest = source.trim_start();
    (&source[..source.len() - rest.len()], rest)
}

/// Stateful line parser; feed it lines in order and it hands back each finished block.
#[derive(Debug)]
pub struct SourceParser {
    markers: Markers,
    block: Option<Vec<Line>>,
    number: usize,
}

impl SourceParser {
    pub fn new(start_line: usize) -> Self {
        Self {
            markers: MARKERS,
            block: None,
            number: start_line,
        }
    }

    /// Push one physical line (without its `\n`). Returns the block's lines once the line
    /// closing it has been seen.
    pub fn push_line(&mut self, source: &str) -> Option<Vec<Line>> {
        let markers = self.markers;
        let number = self.number;
        self.number += 1;

        let mut tokens = Tokens::default();
        let (line_end, rest) = split_cr(source);
        tokens.line_end = line_end.to_string();
        let (start, mut rest) = split_space(rest);
        tokens.start = start.to_string();

        if self.block.is_none()
            && rest.starts_with(markers.start)
            && !rest.starts_with(markers.nostart)
        {
            self.block = Some(Vec::new());
            tokens.delimiter = markers.start.to_string();
            let (post_delimiter, after) = split_space(&rest[markers.start.len()..]);
            tokens.post_delimiter = post_delimiter.to_string();
            rest = after;
        }

        let block = self.block.as_mut()?;

        let is_closed = rest.trim_end().ends_with(markers.end);

        if tokens.delimiter.is_empty()
            && rest.starts_with(markers.delim)
            && !rest.starts_with(markers.end)
        {
            tokens.delimiter = markers.delim.to_string();
            let (post_delimiter, after) = split_space(&rest[markers.delim.len()..]);
            tokens.post_delimiter = post_delimiter.to_string();
            rest = after;
        }

        if is_closed {
            let trimmed = rest.trim_end();
            let body_len = trimmed.len() - markers.end.len();
            tokens.end = rest[body_len..].to_string();
            rest = &trimmed[..body_len];
        }

        tokens.description = rest.to_string();
        block.push(Line {
            number,
            source: source.to_string(),
            tokens,
        });

        if is_closed {
            self.block.take()
        } else {
            None
        }
    }
}

/// Tokenize every `/** ... */` block in `source`.
pub fn parse_source(source: &str) -> Vec<Vec<Line>> {
    let mut parser = SourceParser::new(0);
    source
        .split('\n')
        .filter_map(|line| parser.push_line(line))
        .collect()
}
