//! Recursive-descent parser for selector text.

use super::{
    AttributeValue, Combinator, Complex, Compound, Condition, Selector, SelectorError, Test,
};
use regex::RegexBuilder;

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '$'
}

pub(super) struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(super) fn parse(mut self) -> Result<Selector, SelectorError> {
        let selector = self.selectors(false)?;
        self.skip_ws();
        if self.pos < self.text.len() {
            return Err(self.error("unexpected character"));
        }
        Ok(selector)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Returns whether any whitespace was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    /// Comma-separated alternatives. `relative` allows a leading `>` (inside `:has`).
    fn selectors(&mut self, relative: bool) -> Result<Selector, SelectorError> {
        let mut alternatives = vec![self.complex(relative)?];
        loop {
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
            alternatives.push(self.complex(relative)?);
        }
        Ok(Selector { alternatives })
    }

    fn complex(&mut self, relative: bool) -> Result<Complex, SelectorError> {
        self.skip_ws();
        let mut complex = if relative && self.eat('>') {
            self.skip_ws();
            Complex {
                head: Compound {
                    kind: None,
                    tests: vec![Test::Scope],
                },
                rest: vec![(Combinator::Child, self.compound()?)],
            }
        } else {
            Complex {
                head: self.compound()?,
                rest: Vec::new(),
            }
        };

        loop {
            let spaced = self.skip_ws();
            let combinator = if self.eat('>') {
                self.skip_ws();
                Combinator::Child
            } else if spaced && self.starts_compound() {
                Combinator::Descendant
            } else {
                break;
            };
            complex.rest.push((combinator, self.compound()?));
        }
        Ok(complex)
    }

    fn starts_compound(&self) -> bool {
        self.peek()
            .is_some_and(|ch| is_ident_char(ch) || matches!(ch, '*' | '[' | ':'))
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut any = false;

        if self.eat('*') {
            any = true;
        } else if let Some(kind) = self.ident() {
            compound.kind = Some(kind.to_lowercase());
            any = true;
        }

        loop {
            if self.eat('[') {
                compound.tests.push(self.attribute()?);
            } else if self.eat(':') {
                compound.tests.push(self.pseudo()?);
            } else {
                break;
            }
            any = true;
        }

        if !any {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        let text: &'a str = self.text;
        (self.pos > start).then(|| &text[start..self.pos])
    }

    /// After `[`.
    fn attribute(&mut self) -> Result<Test, SelectorError> {
        self.skip_ws();
        let mut path = Vec::new();
        loop {
            let segment = self
                .ident()
                .ok_or_else(|| self.error("expected an attribute name"))?;
            path.push(segment.to_string());
            if !self.eat('.') {
                break;
            }
        }

        self.skip_ws();
        if self.eat(']') {
            return Ok(Test::Attribute {
                path,
                condition: None,
            });
        }

        let negated = if self.eat('!') {
            if !self.eat('=') {
                return Err(self.error("expected `=` after `!`"));
            }
            true
        } else if self.eat('=') {
            false
        } else {
            return Err(self.error("expected `=`, `!=` or `]`"));
        };

        self.skip_ws();
        let value = self.attribute_value()?;
        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("expected `]`"));
        }
        Ok(Test::Attribute {
            path,
            condition: Some(Condition { negated, value }),
        })
    }

    fn attribute_value(&mut self) -> Result<AttributeValue, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.string(quote).map(AttributeValue::Literal)
            }
            Some('/') => {
                self.bump();
                self.regex()
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|ch| !ch.is_whitespace() && ch != ']')
                {
                    self.bump();
                }
                if self.pos == start {
                    return Err(self.error("expected an attribute value"));
                }
                Ok(AttributeValue::Literal(self.text[start..self.pos].to_string()))
            }
        }
    }

    /// After the opening quote.
    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => match self.bump() {
                    Some(ch) => value.push(ch),
                    None => return Err(self.error("unterminated string")),
                },
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }

    /// After the opening `/`.
    fn regex(&mut self) -> Result<AttributeValue, SelectorError> {
        let mut pattern = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated regular expression")),
                Some('\\') => {
                    pattern.push('\\');
                    if let Some(ch) = self.bump() {
                        pattern.push(ch);
                    }
                }
                Some('/') => break,
                Some(ch) => pattern.push(ch),
            }
        }

        let mut builder = RegexBuilder::new(&pattern);
        while let Some(flag) = self.peek().filter(char::is_ascii_alphabetic) {
            self.bump();
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'u' | 'g' | 'y' => {}
                other => {
                    return Err(self.error(format!("unknown regular expression flag `{}`", other)))
                }
            }
        }

        builder
            .build()
            .map(AttributeValue::Pattern)
            .map_err(|e| SelectorError::Regex {
                pattern,
                message: e.to_string(),
            })
    }

    /// After `:`.
    fn pseudo(&mut self) -> Result<Test, SelectorError> {
        let name = self
            .ident()
            .ok_or_else(|| self.error("expected a pseudo-class name"))?
            .to_lowercase();

        match name.as_str() {
            "first-child" => Ok(Test::NthChild(1)),
            "last-child" => Ok(Test::NthLastChild(1)),
            "nth-child" => self.parenthesized(Self::position).map(Test::NthChild),
            "nth-last-child" => self.parenthesized(Self::position).map(Test::NthLastChild),
            "has" => self
                .parenthesized(|p| p.selectors(true))
                .map(Test::Has),
            "not" => self
                .parenthesized(|p| p.selectors(false))
                .map(Test::Not),
            "matches" | "is" => self
                .parenthesized(|p| p.selectors(false))
                .map(Test::Matches),
            _ => Err(SelectorError::UnknownPseudo(name)),
        }
    }

    fn parenthesized<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<T, SelectorError>,
    ) -> Result<T, SelectorError> {
        if !self.eat('(') {
            return Err(self.error("expected `(`"));
        }
        let value = inner(self)?;
        self.skip_ws();
        if !self.eat(')') {
            return Err(self.error("expected `)`"));
        }
        Ok(value)
    }

    /// A 1-based sibling position.
    fn position(&mut self) -> Result<usize, SelectorError> {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
        }
        match self.text[start..self.pos].parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(SelectorError::Syntax {
                offset: start,
                message: "expected a positive number".to_string(),
            }),
        }
    }
}
