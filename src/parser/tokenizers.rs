//! @dose
//! purpose: Field tokenizers that split a tag section's lines into tag, type, name and
//!     description tokens, plus the TokenizationPolicy that decides which of them run for a tag.
//!
//! when-editing:
//!     - !Tokenizers run in order and each sees the tokens left by the previous one
//!     - !The pipeline for a tag stops after a tokenizer records a critical problem
//!     - Token fields must stay raw source slices so lines can be reassembled
//!
//! invariants:
//!     - Tokens::join() of a line is unchanged by every tokenizer
//!     - TagSpec fields hold the cleaned values (name without brackets, type without braces)
//!
//! gotchas:
//!     - Positions are byte offsets; indentation offsets between lines are counted in chars
//!     - The template splitter keeps `T, U` together as one name

use crate::parser::block::{join_description, Spacing};
use crate::parser::source::split_space;
use crate::types::tokens::{Line, Problem, ProblemCode, TagSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(@(\S+))(\s*)").unwrap());

static SEE_WITH_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{@link.+?\}").unwrap());

static OPTIONAL_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<name>[^=]*)=[^\]]*\]").unwrap());

/// Tags whose text never starts with a `{type}`.
pub const DEFAULT_NO_TYPES: &[&str] = &[
    "default",
    "defaultvalue",
    "description",
    "example",
    "file",
    "fileoverview",
    "license",
    "overview",
    "see",
    "summary",
];

/// Tags whose text never starts with a name.
pub const DEFAULT_NO_NAMES: &[&str] = &[
    "access",
    "author",
    "default",
    "defaultvalue",
    "description",
    "example",
    "exception",
    "file",
    "fileoverview",
    "kind",
    "license",
    "overview",
    "return",
    "returns",
    "since",
    "summary",
    "throws",
    "version",
    "variation",
];

/// One step of the field-splitting pipeline.
pub trait Tokenizer: Send + Sync {
    /// Split fields out of `lines`, the lines of the tag section `spec` describes.
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]);
}

fn problem(code: ProblemCode, message: &str, line: usize) -> Problem {
    Problem {
        code,
        message: message.to_string(),
        line,
        critical: true,
    }
}

fn first_number(lines: &[Line]) -> usize {
    lines.first().map_or(0, |line| line.number)
}

/// Split `text` after its first `n` chars.
fn split_at_char(text: &str, n: usize) -> (&str, &str) {
    let at = text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    text.split_at(at)
}

/// `@tag` and the whitespace after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagTokenizer;

impl Tokenizer for TagTokenizer {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        let number = first_number(lines);
        let Some(first) = lines.first_mut() else {
            return;
        };
        let tokens = &mut first.tokens;

        let Some(caps) = TAG_PREFIX.captures(&tokens.description) else {
            spec.problems.push(problem(
                ProblemCode::TagPrefix,
                "tag should start with \"@\" symbol",
                number,
            ));
            return;
        };

        let consumed = caps.get(0).map_or(0, |m| m.end());
        let tag = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let name = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let post_tag = caps.get(3).map_or("", |m| m.as_str()).to_string();
        let rest = tokens.description[consumed..].to_string();

        tokens.tag = tag;
        tokens.post_tag = post_tag;
        tokens.description = rest;
        spec.tag = name;
    }
}

/// `{type}` possibly spanning several lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeTokenizer {
    pub spacing: Spacing,
}

impl Tokenizer for TypeTokenizer {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        if !lines
            .first()
            .is_some_and(|line| line.tokens.description.starts_with('{'))
        {
            return;
        }

        let mut curlies: i32 = 0;
        let mut types: Vec<String> = Vec::new();
        for line in lines.iter() {
            let description = &line.tokens.description;
            let mut end = description.len();
            for (i, ch) in description.char_indices() {
                match ch {
                    '{' => curlies += 1,
                    '}' => curlies -= 1,
                    _ => {}
                }
                if curlies == 0 {
                    end = i + ch.len_utf8();
                    break;
                }
            }
            types.push(description[..end].to_string());
            if curlies == 0 {
                break;
            }
        }

        if curlies != 0 {
            spec.problems.push(problem(
                ProblemCode::TypeUnpairedCurlies,
                "unpaired curlies",
                first_number(lines),
            ));
            return;
        }

        let offset = lines[0].tokens.post_delimiter.chars().count();
        let mut parts = Vec::with_capacity(types.len());
        for (i, (line, r#type)) in lines.iter_mut().zip(types).enumerate() {
            let tokens = &mut line.tokens;
            let rest = tokens.description[r#type.len()..].to_string();
            if i == 0 {
                tokens.r#type = r#type;
            } else {
                let (kept, extra) = split_at_char(&tokens.post_delimiter, offset);
                tokens.r#type = format!("{}{}", extra, r#type);
                tokens.post_delimiter = kept.to_string();
            }
            let (post_type, description) = split_space(&rest);
            tokens.post_type = post_type.to_string();
            tokens.description = description.to_string();
            parts.push(tokens.r#type.clone());
        }

        if let Some(first) = parts.first_mut() {
            first.remove(0);
        }
        if let Some(last) = parts.last_mut() {
            last.pop();
        }

        spec.r#type = match self.spacing {
            Spacing::Compact => parts.iter().map(|part| part.trim()).collect(),
            Spacing::Preserve => parts.join("\n"),
        };
    }
}

/// Parameter-style names: `name`, `"quoted name"`, `[name]`, `[name=default]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameTokenizer;

impl Tokenizer for NameTokenizer {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        let type_end = lines
            .iter()
            .rposition(|line| !line.tokens.r#type.is_empty())
            .unwrap_or(0);
        let Some(line) = lines.get(type_end) else {
            return;
        };
        let source = line.tokens.description.trim_start().to_string();

        let quoted: Vec<&str> = source.split('"').collect();
        if quoted.len() > 1 && quoted[0].is_empty() && quoted.len() % 2 == 1 {
            let name = quoted[1].to_string();
            let token = format!("\"{}\"", name);
            let (post_name, description) = split_space(&source[token.len()..]);
            let tokens = &mut lines[type_end].tokens;
            tokens.post_name = post_name.to_string();
            tokens.description = description.to_string();
            tokens.name = token;
            spec.name = name;
            return;
        }

        let mut brackets: i32 = 0;
        let mut token_end = source.len();
        for (i, ch) in source.char_indices() {
            if brackets == 0 && ch.is_whitespace() {
                token_end = i;
                break;
            }
            match ch {
                '[' => brackets += 1,
                ']' => brackets -= 1,
                _ => {}
            }
        }
        if brackets != 0 {
            spec.problems.push(problem(
                ProblemCode::NameUnpairedBrackets,
                "unpaired brackets",
                first_number(lines),
            ));
            return;
        }

        let token = &source[..token_end];
        let mut name = token.to_string();
        let mut optional = false;
        let mut default = None;

        if token.len() >= 2 && token.starts_with('[') && token.ends_with(']') {
            optional = true;
            let inner = &token[1..token.len() - 1];
            let (raw_name, raw_default) = match inner.split_once('=') {
                Some((n, d)) => (n, Some(d.trim())),
                None => (inner, None),
            };
            name = raw_name.trim().to_string();

            if name.is_empty() {
                spec.problems
                    .push(problem(ProblemCode::NameEmpty, "empty name", first_number(lines)));
                return;
            }
            if raw_default == Some("") {
                spec.problems.push(problem(
                    ProblemCode::NameEmptyDefault,
                    "empty default value",
                    first_number(lines),
                ));
                return;
            }
            if let Some(value) = raw_default {
                if !is_quoted(value) && has_bare_equals(value) {
                    spec.problems.push(problem(
                        ProblemCode::NameInvalidDefault,
                        "invalid default value syntax",
                        first_number(lines),
                    ));
                    return;
                }
                default = Some(value.to_string());
            }
        }

        let (post_name, description) = split_space(&source[token_end..]);
        let tokens = &mut lines[type_end].tokens;
        tokens.name = token.to_string();
        tokens.post_name = post_name.to_string();
        tokens.description = description.to_string();
        spec.optional = optional;
        spec.name = name;
        spec.default = default;
    }
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// An `=` that does not start `=>`.
fn has_bare_equals(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'=' && bytes.get(i + 1) != Some(&b'>'))
}

/// `@template` names: `T`, `T, U`, `[T=Default]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNameTokenizer;

impl Tokenizer for TemplateNameTokenizer {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        let Some(first) = lines.first_mut() else {
            return;
        };
        let tokens = &mut first.tokens;
        let remainder = tokens.description.clone();

        let split = template_name_end(&remainder);
        let name = &remainder[..split];
        let (post_name, description) = split_space(&remainder[split..]);

        match OPTIONAL_TEMPLATE.captures(name) {
            Some(caps) => {
                spec.name = caps.name("name").map_or("", |m| m.as_str()).to_string();
                spec.optional = true;
            }
            None => {
                spec.name = name.to_string();
                spec.optional = false;
            }
        }

        tokens.name = name.to_string();
        tokens.post_name = post_name.to_string();
        tokens.description = description.to_string();
    }
}

/// Byte offset of the first whitespace not preceded by whitespace or a comma.
fn template_name_end(text: &str) -> usize {
    let mut previous: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() && !previous.is_some_and(|p| p.is_whitespace() || p == ',') {
            return i;
        }
        previous = Some(ch);
    }
    text.len()
}

/// Joins the section's description text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionTokenizer {
    pub spacing: Spacing,
}

impl Tokenizer for DescriptionTokenizer {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        spec.description = join_description(lines, self.spacing);
    }
}

/// `@see` whose first line carries a `{@link ...}` has no name.
pub fn has_see_with_link(spec: &TagSpec, lines: &[Line]) -> bool {
    spec.tag == "see"
        && lines
            .first()
            .is_some_and(|line| SEE_WITH_LINK.is_match(&line.source))
}

/// Which tags skip type and name splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TokenizationPolicy {
    pub no_types: Vec<String>,
    pub no_names: Vec<String>,
}

impl Default for TokenizationPolicy {
    fn default() -> Self {
        Self {
            no_types: DEFAULT_NO_TYPES.iter().map(|s| s.to_string()).collect(),
            no_names: DEFAULT_NO_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TokenizationPolicy {
    /// The pipeline in run order: tag, type, name, description.
    pub fn tokenizers(&self) -> Vec<Box<dyn Tokenizer>> {
        vec![
            Box::new(TagTokenizer),
            Box::new(PolicyType {
                no_types: self.no_types.clone(),
                inner: TypeTokenizer {
                    spacing: Spacing::Preserve,
                },
            }),
            Box::new(PolicyName {
                no_names: self.no_names.clone(),
            }),
            Box::new(DescriptionTokenizer {
                spacing: Spacing::Preserve,
            }),
        ]
    }
}

struct PolicyType {
    no_types: Vec<String>,
    inner: TypeTokenizer,
}

impl Tokenizer for PolicyType {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        if self.no_types.contains(&spec.tag) {
            return;
        }
        self.inner.tokenize(spec, lines);
    }
}

struct PolicyName {
    no_names: Vec<String>,
}

impl Tokenizer for PolicyName {
    fn tokenize(&self, spec: &mut TagSpec, lines: &mut [Line]) {
        if spec.tag == "template" {
            TemplateNameTokenizer.tokenize(spec, lines);
            return;
        }
        if self.no_names.contains(&spec.tag) || has_see_with_link(spec, lines) {
            return;
        }
        NameTokenizer.tokenize(spec, lines);
    }
}

/// Run `tokenizers` over one section, stopping at the first critical problem.
pub fn run_pipeline(tokenizers: &[Box<dyn Tokenizer>], spec: &mut TagSpec, lines: &mut [Line]) {
    for tokenizer in tokenizers {
        tokenizer.tokenize(spec, lines);
        if spec.has_critical_problem() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::source::parse_source;

    /// Tokenize the single tag section of `text` with the default policy.
    fn tokenize(text: &str) -> (TagSpec, Vec<Line>) {
        let mut lines: Vec<Line> = parse_source(text).into_iter().next().unwrap();
        let start = lines
            .iter()
            .position(|l| l.tokens.description.starts_with('@'))
            .unwrap();
        let end = lines.len();
        let mut spec = TagSpec::new(start..end);
        let tokenizers = TokenizationPolicy::default().tokenizers();
        run_pipeline(&tokenizers, &mut spec, &mut lines[start..end]);
        (spec, lines)
    }

    #[test]
    fn test_param_fields() {
        let (spec, lines) = tokenize("/**\n * @param {string} name The name\n */");
        assert_eq!(spec.tag, "param");
        assert_eq!(spec.r#type, "string");
        assert_eq!(spec.name, "name");
        assert_eq!(spec.description, "The name");
        let tokens = &lines[1].tokens;
        assert_eq!(tokens.tag, "@param");
        assert_eq!(tokens.post_tag, " ");
        assert_eq!(tokens.r#type, "{string}");
        assert_eq!(tokens.post_type, " ");
        assert_eq!(tokens.name, "name");
        assert_eq!(tokens.post_name, " ");
        assert_eq!(tokens.description, "The name");
        assert_eq!(tokens.join(), lines[1].source);
    }

    #[test]
    fn test_multiline_type() {
        let text = "/**\n * @param {{\n *   a: string\n * }} obj\n */";
        let (spec, lines) = tokenize(text);
        assert_eq!(spec.r#type, "{\n  a: string\n}");
        assert_eq!(spec.name, "obj");
        assert_eq!(lines[2].tokens.r#type, "  a: string");
        assert_eq!(lines[2].tokens.post_delimiter, " ");
        assert_eq!(lines[3].tokens.r#type, "}}");
        assert_eq!(lines[3].tokens.name, "obj");
        for line in &lines {
            assert_eq!(line.tokens.join(), line.source);
        }
    }

    #[test]
    fn test_unpaired_curlies_stop_pipeline() {
        let (spec, _) = tokenize("/**\n * @param {string name\n */");
        assert_eq!(spec.problems.len(), 1);
        assert_eq!(spec.problems[0].code, ProblemCode::TypeUnpairedCurlies);
        assert_eq!(spec.problems[0].line, 1);
        assert!(spec.name.is_empty());
    }

    #[test]
    fn test_optional_name_with_default() {
        let (spec, lines) = tokenize("/** @param {number} [count=10] how many */");
        assert!(spec.optional);
        assert_eq!(spec.name, "count");
        assert_eq!(spec.default.as_deref(), Some("10"));
        assert_eq!(lines[0].tokens.name, "[count=10]");
        assert_eq!(spec.description, "how many ");
    }

    #[test]
    fn test_name_problems() {
        let (spec, _) = tokenize("/** @param [=1] x */");
        assert_eq!(spec.problems[0].code, ProblemCode::NameEmpty);

        let (spec, _) = tokenize("/** @param [a=] x */");
        assert_eq!(spec.problems[0].code, ProblemCode::NameEmptyDefault);

        let (spec, _) = tokenize("/** @param [a=b=c] x */");
        assert_eq!(spec.problems[0].code, ProblemCode::NameInvalidDefault);

        let (spec, _) = tokenize("/** @param [a=() => 1] x */");
        assert!(spec.problems.is_empty());
        assert_eq!(spec.default.as_deref(), Some("() => 1"));

        let (spec, _) = tokenize("/** @param [a x */");
        assert_eq!(spec.problems[0].code, ProblemCode::NameUnpairedBrackets);
    }

    #[test]
    fn test_quoted_name() {
        let (spec, lines) = tokenize("/** @param \"some name\" desc */");
        assert_eq!(spec.name, "some name");
        assert_eq!(lines[0].tokens.name, "\"some name\"");
        assert_eq!(lines[0].tokens.description, "desc ");
    }

    #[test]
    fn test_no_names_and_no_types() {
        let (spec, lines) = tokenize("/** @returns {string} the result */");
        assert_eq!(spec.r#type, "string");
        assert!(spec.name.is_empty());
        assert_eq!(lines[0].tokens.description, "the result ");

        let (spec, lines) = tokenize("/** @example {a} b */");
        assert!(spec.r#type.is_empty());
        assert_eq!(lines[0].tokens.description, "{a} b ");
    }

    #[test]
    fn test_see_with_link_has_no_name() {
        let (spec, _) = tokenize("/** @see {@link Foo} for details */");
        assert!(spec.name.is_empty());
        assert_eq!(spec.description, "{@link Foo} for details ");

        let (spec, _) = tokenize("/** @see Foo for details */");
        assert_eq!(spec.name, "Foo");
    }

    #[test]
    fn test_template_names() {
        let (spec, lines) = tokenize("/** @template T, U Type params */");
        assert_eq!(spec.name, "T, U");
        assert_eq!(lines[0].tokens.post_name, " ");
        assert_eq!(lines[0].tokens.description, "Type params ");

        let (spec, lines) = tokenize("/** @template [T=string] Doc */");
        assert_eq!(spec.name, "T");
        assert!(spec.optional);
        assert_eq!(lines[0].tokens.name, "[T=string]");
    }

    #[test]
    fn test_custom_policy() {
        let policy = TokenizationPolicy {
            no_types: vec!["param".to_string()],
            no_names: Vec::new(),
        };
        let mut lines = parse_source("/** @param {x} y */").remove(0);
        let mut spec = TagSpec::new(0..1);
        run_pipeline(&policy.tokenizers(), &mut spec, &mut lines[..]);
        assert!(spec.r#type.is_empty());
        assert_eq!(spec.name, "{x}");
    }

    #[test]
    fn test_helpers() {
        assert!(has_bare_equals("a=b"));
        assert!(has_bare_equals("a="));
        assert!(!has_bare_equals("a => b"));
        assert_eq!(template_name_end("T, U rest"), 4);
        assert_eq!(template_name_end("T"), 1);
        assert_eq!(split_at_char("  x", 1), (" ", " x"));
    }
}
