//! Tokens of the type grammar.

use super::{ParseMode, Quote, SpecialPathType, TypeParseError};

const PUNCTUATION: &[&str] = &[
    "...", "=>", "(", ")", "[", "]", "{", "}", "<", ">", ",", ";", ":", ".", "|", "&", "?", "!",
    "=", "*", "#", "~",
];

/// Characters that end a special name path value.
const PATH_STOP: &[char] = &[
    ',', '(', ')', '[', ']', '{', '}', '<', '>', '|', '&', ';', '=', '#', '~', '.', '?', '!',
];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Punct(&'static str),
    Ident(String),
    Str { value: String, quote: Quote },
    Number(f64),
    Special { kind: SpecialPathType, value: String },
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            Self::Punct(p) => p.to_string(),
            Self::Ident(name) => name.clone(),
            Self::Str { value, quote } => format!("{0}{1}{0}", quote.as_char(), value),
            Self::Number(n) => n.to_string(),
            Self::Special { kind, value } => format!("{}:{}", kind.as_str(), value),
            Self::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset into the input
    pub offset: usize,
    /// Whitespace before this token contained a line break
    pub newline_before: bool,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '-'
}

pub fn tokenize(input: &str, mode: ParseMode) -> Result<Vec<Token>, TypeParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut newline_before = false;

    while pos < input.len() {
        let rest = &input[pos..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_whitespace() {
            newline_before |= ch == '\n';
            pos += ch.len_utf8();
            continue;
        }

        let start = pos;
        let kind = if ch == '\'' || ch == '"' {
            let (value, len) = read_string(rest, start)?;
            pos += len;
            TokenKind::Str {
                value,
                quote: if ch == '\'' {
                    Quote::Single
                } else {
                    Quote::Double
                },
            }
        } else if starts_number(rest) {
            let len = number_len(rest);
            pos += len;
            let text = &rest[..len];
            let value = text.parse::<f64>().map_err(|_| TypeParseError::UnexpectedToken {
                found: text.to_string(),
                offset: start,
            })?;
            TokenKind::Number(value)
        } else if is_ident_start(ch) {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !is_ident_continue(c))
                .map_or(rest.len(), |(i, _)| i);
            let word = &rest[..len];
            pos += len;

            match special_path(word, &input[pos..], mode) {
                Some((kind, value, consumed)) => {
                    pos += consumed;
                    TokenKind::Special { kind, value }
                }
                None => TokenKind::Ident(word.to_string()),
            }
        } else if let Some(punct) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            pos += punct.len();
            TokenKind::Punct(*punct)
        } else {
            return Err(TypeParseError::UnexpectedChar { ch, offset: start });
        };

        tokens.push(Token {
            kind,
            offset: start,
            newline_before,
        });
        newline_before = false;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
        newline_before,
    });
    Ok(tokens)
}

/// Read a quoted string; returns the raw inner text and the consumed length.
fn read_string(rest: &str, offset: usize) -> Result<(String, usize), TypeParseError> {
    let mut chars = rest.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(TypeParseError::UnterminatedString { offset });
    };
    let mut escaped = false;
    for (i, ch) in chars {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Ok((rest[1..i].to_string(), i + 1));
        }
    }
    Err(TypeParseError::UnterminatedString { offset })
}

fn starts_number(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn number_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut len = usize::from(bytes[0] == b'-');
    len += digits(len);
    if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
        len += 1;
        len += digits(len);
    }
    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            len = exp + digits(exp);
        }
    }
    len
}

/// `module:path`, `event:name`, `external:name` outside typescript mode. The value must start
/// right after the colon.
fn special_path(
    word: &str,
    after: &str,
    mode: ParseMode,
) -> Option<(SpecialPathType, String, usize)> {
    if mode == ParseMode::Typescript {
        return None;
    }
    let kind = SpecialPathType::from_keyword(word)?;
    let value = after.strip_prefix(':')?;
    let first = value.chars().next()?;
    if first.is_whitespace() || PATH_STOP.contains(&first) {
        return None;
    }

    let len = if first == '"' || first == '\'' {
        read_string(value, 0).ok()?.1
    } else {
        value
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() || PATH_STOP.contains(&c))
            .map_or(value.len(), |(i, _)| i)
    };
    Some((kind, value[..len].to_string(), len + 1))
}
