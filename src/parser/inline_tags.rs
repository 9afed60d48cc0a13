//! @dose
//! purpose: Extracts inline reference tags (`{@link Foo}`, `[text]{@link Foo}`,
//!     `{@link Foo|text}`, `{@link Foo text}`) from description text.
//!
//! when-editing:
//!     - !Keep the two scans separate; a single combined pattern is prone to
//!       pathological matching cost on nested braces
//!     - The suffixed scan must skip markers directly preceded by `]`, those belong to the
//!       prefixed form
//!
//! invariants:
//!     - Every match gets exactly one format
//!     - Results are ordered by start offset
//!
//! gotchas:
//!     - The regex crate has no look-behind, so the `]` check restarts the search one byte
//!       after a rejected match instead of skipping the whole match
//!     - Offsets are byte offsets into the description; they are not kept on tree nodes

use crate::types::ast::{InlineTagFormat, InlineTagSpacing, JsdocInlineTag};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// `[text]{@tag target}`
static PREFIXED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?P<text>[^\]]+)\]\{@(?P<tag>[^}\s]+)(?P<post_tag>\s?)(?P<target>[^}\s|]*)\}")
        .unwrap()
});

/// `{@tag target}` with optional `|text` or ` text`
static SUFFIXED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{@(?P<tag>[^}\s]+)(?P<post_tag>\s?)(?P<target>[^}\s|]*)(?P<pre_separator>\s*)(?P<separator>[\s|])?(?P<post_separator>\s*)(?P<text>[^}]*)\}",
    )
    .unwrap()
});

/// An inline tag found in description text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineTag {
    pub tag: String,
    #[serde(rename = "namepathOrURL")]
    pub namepath_or_url: String,
    pub text: String,
    pub format: InlineTagFormat,
    /// Layout inside the marker when it is not the usual one for `format`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<InlineTagSpacing>,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
}

impl From<&InlineTag> for JsdocInlineTag {
    fn from(tag: &InlineTag) -> Self {
        Self {
            format: tag.format,
            namepath_or_url: tag.namepath_or_url.clone(),
            tag: tag.tag.clone(),
            text: tag.text.clone(),
            spacing: tag.spacing.clone(),
        }
    }
}

/// Classify a match. The display text is a prefix when it ends before the tag name starts.
fn determine_format(caps: &Captures) -> InlineTagFormat {
    let text = caps.name("text");
    let tag_start = caps.name("tag").map_or(0, |m| m.start());

    match text {
        Some(text) if text.end() < tag_start => InlineTagFormat::Prefix,
        Some(text) if !text.as_str().is_empty() => {
            if caps.name("separator").map(|m| m.as_str()) == Some("|") {
                InlineTagFormat::Pipe
            } else {
                InlineTagFormat::Space
            }
        }
        _ => InlineTagFormat::Plain,
    }
}

fn to_inline_tag(caps: &Captures) -> Option<InlineTag> {
    let whole = caps.get(0)?;
    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str()).to_string();

    let format = determine_format(caps);
    let spacing = InlineTagSpacing {
        post_tag: group("post_tag"),
        pre_separator: group("pre_separator"),
        separator: group("separator"),
        post_separator: group("post_separator"),
    };

    Some(InlineTag {
        tag: group("tag"),
        namepath_or_url: group("target"),
        text: group("text"),
        spacing: (spacing != InlineTagSpacing::canonical(format)).then_some(spacing),
        format,
        start: whole.start(),
        end: whole.end(),
    })
}

/// Extract inline tags from a description, ordered by where they start.
pub fn parse_description(description: &str) -> Vec<InlineTag> {
    let mut result: Vec<InlineTag> = PREFIXED_TEXT
        .captures_iter(description)
        .filter_map(|caps| to_inline_tag(&caps))
        .collect();

    let mut at = 0;
    while at <= description.len() {
        let Some(caps) = SUFFIXED_TEXT.captures_at(description, at) else {
            break;
        };
        let Some(whole) = caps.get(0) else { break };

        if description[..whole.start()].ends_with(']') {
            // `{` is one byte, so this stays on a char boundary
            at = whole.start() + 1;
            continue;
        }
        result.extend(to_inline_tag(&caps));
        at = whole.end();
    }

    result.sort_by_key(|tag| tag.start);
    result
}
