//! @dose
//! purpose: Folds a tokenized CommentBlock into a JsdocBlock tree. Every physical line lands in
//!     exactly one place (the block head, a description line, a tag head, a type line, or the
//!     terminator) so the stringifier can rebuild the comment byte for byte.
//!
//! when-editing:
//!     - !Type braces are stripped once, when a tag is finalized; never strip in the stringifier
//!       or on raw_type afterwards
//!     - !Formatting of a node sharing line 0 stays empty, the block already owns that prefix
//!     - Per-tag inline tags come from the TagSpec that starts on the tag's line
//!
//! invariants:
//!     - Tags are appended in physical-line order and never reordered
//!     - A tag description line has empty formatting iff it shares the tag's head line (the tag
//!       line or a line holding its type)
//!     - description strings are their lines joined with '\n', leading/trailing blank lines
//!       removed
//!
//! gotchas:
//!     - A blank line inside an unbalanced `{...}` is a type line, not a description line
//!     - last_description_line is the first line carrying a tag or the terminator
//!
//! flows:
//!     - Fold: per line -> open tag? -> type line? -> description line? -> terminator
//!     - Finalize tag: strip braces -> join raw type -> parse (strict: error, else debug!)

use crate::type_expr::{self, ParseMode, TypeNode, TypeParseError};
use crate::types::ast::{JsdocBlock, JsdocDescriptionLine, JsdocTag, JsdocTypeLine};
use crate::types::tokens::{CommentBlock, Line, Tokens};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Dialect passed to the type parser
    pub mode: ParseMode,
    /// Fail the build when a tag's type does not parse
    pub throw_on_type_parsing_errors: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Tag @{tag} with raw type `{raw}` had parsing error: {source}")]
    TypeParse {
        tag: String,
        raw: String,
        source: TypeParseError,
    },
    #[error("No tokenized tag starts on line {line}")]
    MissingTagSpec { line: usize },
}

/// Where incoming description lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FoldState {
    BlockDescription,
    InTag(usize),
}

/// A tag still receiving lines.
#[derive(Debug)]
struct OpenTag {
    tag: JsdocTag,
    /// Unclosed `{` in the type text seen so far
    depth: i32,
}

/// Build a tree with the built-in type parser.
pub fn build(block: &CommentBlock, options: &BuildOptions) -> Result<JsdocBlock, BuildError> {
    build_with(block, options, type_expr::parse)
}

/// Build a tree, parsing tag types with `parse_type`.
pub fn build_with<F>(
    block: &CommentBlock,
    options: &BuildOptions,
    parse_type: F,
) -> Result<JsdocBlock, BuildError>
where
    F: Fn(&str, ParseMode) -> Result<TypeNode, TypeParseError>,
{
    let lines = &block.source;
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return Ok(JsdocBlock::default());
    };
    let end_line = lines.len() - 1;

    let mut root = JsdocBlock {
        delimiter: first.tokens.delimiter.clone(),
        initial: first.tokens.start.clone(),
        post_delimiter: first.tokens.post_delimiter.clone(),
        line_end: first.tokens.line_end.clone(),
        terminal: last.tokens.end.clone(),
        end_line,
        inline_tags: block.inline_tags.iter().map(Into::into).collect(),
        ..JsdocBlock::default()
    };

    let mut state = FoldState::BlockDescription;
    let mut open: Vec<OpenTag> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let tokens = &line.tokens;
        let is_end = idx == end_line;
        let has_content = has_content(tokens);

        if !tokens.tag.is_empty() {
            if let FoldState::InTag(current) = state {
                finalize(&mut open[current].tag, false, options, &parse_type)?;
            } else {
                root.last_description_line = Some(idx);
            }
            open.push(open_tag(block, idx, line)?);
            state = FoldState::InTag(open.len() - 1);
        }

        if is_end && !has_content {
            if end_line > 0 {
                let prefix = format!(
                    "{}{}{}",
                    tokens.start, tokens.delimiter, tokens.post_delimiter
                );
                if prefix != format!(" {}", root.initial) {
                    root.terminal_initial = Some(prefix);
                }
            }
            break;
        }

        match state {
            FoldState::InTag(current) => {
                let entry = &mut open[current];
                let mut head = !tokens.tag.is_empty();

                if !tokens.r#type.is_empty() || entry.depth > 0 {
                    let type_line = if entry.tag.type_lines.is_empty() {
                        JsdocTypeLine {
                            raw_type: tokens.r#type.clone(),
                            ..JsdocTypeLine::default()
                        }
                    } else {
                        JsdocTypeLine {
                            delimiter: tokens.delimiter.clone(),
                            post_delimiter: tokens.post_delimiter.clone(),
                            raw_type: tokens.r#type.clone(),
                            initial: tokens.start.clone(),
                        }
                    };
                    entry.depth += brace_balance(&tokens.r#type);
                    entry.tag.type_lines.push(type_line);
                    entry.tag.post_type = tokens.post_type.clone();
                    head = true;
                }

                if !tokens.description.is_empty() || !head {
                    entry
                        .tag
                        .description_lines
                        .push(description_line(tokens, head));
                }
                if is_end {
                    root.has_preterminal_tag_description = true;
                }
            }
            FoldState::BlockDescription => {
                if idx == 0 && !has_content {
                    continue;
                }
                if !tokens.description.is_empty() {
                    root.description_start_line.get_or_insert(idx);
                    root.description_end_line = Some(idx);
                }
                root.description_lines
                    .push(description_line(tokens, idx == 0));
                if is_end {
                    root.has_preterminal_description = true;
                }
            }
        }
    }

    if let FoldState::InTag(current) = state {
        let on_terminator = root.has_preterminal_tag_description;
        finalize(&mut open[current].tag, on_terminator, options, &parse_type)?;
    }

    root.last_description_line.get_or_insert(end_line);
    root.description =
        join_descriptions(&root.description_lines, root.has_preterminal_description);
    root.tags = open.into_iter().map(|entry| entry.tag).collect();
    Ok(root)
}

fn has_content(tokens: &Tokens) -> bool {
    !(tokens.tag.is_empty()
        && tokens.r#type.is_empty()
        && tokens.name.is_empty()
        && tokens.description.is_empty())
}

fn brace_balance(text: &str) -> i32 {
    text.chars().fold(0, |depth, ch| match ch {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

fn description_line(tokens: &Tokens, shares_line: bool) -> JsdocDescriptionLine {
    if shares_line {
        JsdocDescriptionLine {
            description: tokens.description.clone(),
            ..JsdocDescriptionLine::default()
        }
    } else {
        JsdocDescriptionLine {
            delimiter: tokens.delimiter.clone(),
            description: tokens.description.clone(),
            post_delimiter: tokens.post_delimiter.clone(),
            initial: tokens.start.clone(),
            own_line: true,
        }
    }
}

/// Start a tag on line `idx`, taking its name from the first line of the section that has one.
fn open_tag(block: &CommentBlock, idx: usize, line: &Line) -> Result<OpenTag, BuildError> {
    let spec = block
        .tag_at_line(idx)
        .ok_or(BuildError::MissingTagSpec { line: idx })?;
    let tokens = &line.tokens;

    let mut tag = JsdocTag {
        tag: tokens
            .tag
            .strip_prefix('@')
            .unwrap_or(&tokens.tag)
            .to_string(),
        post_tag: tokens.post_tag.clone(),
        post_type: tokens.post_type.clone(),
        name: tokens.name.clone(),
        post_name: tokens.post_name.clone(),
        inline_tags: spec.inline_tags.iter().map(Into::into).collect(),
        ..JsdocTag::default()
    };
    if idx > 0 {
        tag.initial = tokens.start.clone();
        tag.delimiter = tokens.delimiter.clone();
        tag.post_delimiter = tokens.post_delimiter.clone();
    }

    if tag.name.is_empty() {
        let named = block
            .source
            .get(spec.lines.clone())
            .unwrap_or_default()
            .iter()
            .skip(1)
            .find(|candidate| !candidate.tokens.name.is_empty());
        if let Some(named) = named {
            tag.name = named.tokens.name.clone();
            tag.post_name = named.tokens.post_name.clone();
            tag.post_type = named.tokens.post_type.clone();
        }
    }

    Ok(OpenTag { tag, depth: 0 })
}

/// Strip the outer type braces, join the raw type and parse it.
fn finalize<F>(
    tag: &mut JsdocTag,
    on_terminator: bool,
    options: &BuildOptions,
    parse_type: &F,
) -> Result<(), BuildError>
where
    F: Fn(&str, ParseMode) -> Result<TypeNode, TypeParseError>,
{
    if let Some(first) = tag.type_lines.first_mut() {
        if first.raw_type.starts_with('{') {
            first.raw_type.remove(0);
        }
    }
    if let Some(last) = tag.type_lines.last_mut() {
        if last.raw_type.ends_with('}') {
            last.raw_type.pop();
        }
    }
    tag.raw_type = tag
        .type_lines
        .iter()
        .map(|line| line.raw_type.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    tag.description = join_descriptions(&tag.description_lines, on_terminator);

    if tag.raw_type.trim().is_empty() {
        return Ok(());
    }
    match parse_type(&tag.raw_type, options.mode) {
        Ok(node) => tag.parsed_type = Some(node),
        Err(source) if options.throw_on_type_parsing_errors => {
            return Err(BuildError::TypeParse {
                tag: tag.tag.clone(),
                raw: tag.raw_type.clone(),
                source,
            });
        }
        Err(error) => {
            debug!(tag = %tag.tag, raw_type = %tag.raw_type, %error, "type did not parse");
        }
    }
    Ok(())
}

/// Join description lines; text before the terminator loses its trailing whitespace.
fn join_descriptions(lines: &[JsdocDescriptionLine], on_terminator: bool) -> String {
    let mut text = lines
        .iter()
        .map(|line| line.description.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if on_terminator {
        text.truncate(text.trim_end().len());
    }
    text.trim_matches('\n').to_string()
}
