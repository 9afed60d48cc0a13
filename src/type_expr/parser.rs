//! Recursive-descent parser over lexer tokens.
//!
//! Binding from loosest to tightest: union, intersection (typescript), prefix operators, postfix
//! operators, primary expressions.

use super::lexer::{Token, TokenKind};
use super::{
    Brackets, GenericMeta, ObjectMeta, OptionalQuoteMeta, ParseMode, PathType, Position,
    PositionMeta, QuoteMeta, Separator, TypeNode, TypeParseError, VariadicMeta,
};

static EOF: TokenKind = TokenKind::Eof;

/// Nested union and prefix levels allowed before parsing gives up.
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    mode: ParseMode,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, mode: ParseMode) -> Self {
        Self {
            tokens,
            pos: 0,
            mode,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<TypeNode, TypeParseError> {
        if self.at_eof() {
            return Err(TypeParseError::Empty);
        }
        let node = self.parse_union()?;
        if !self.at_eof() {
            return Err(self.unexpected());
        }
        Ok(node)
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .or_else(|| self.tokens.last())
            .map_or(&EOF, |t| &t.kind)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), TokenKind::Punct(p) if *p == punct)
    }

    fn is_punct_at(&self, ahead: usize, punct: &str) -> bool {
        matches!(self.peek_at(ahead), TokenKind::Punct(p) if *p == punct)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), TypeParseError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> TypeParseError {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind != TokenKind::Eof => TypeParseError::UnexpectedToken {
                found: token.kind.describe(),
                offset: token.offset,
            },
            _ => TypeParseError::UnexpectedEnd,
        }
    }

    fn unsupported(&self, feature: &'static str) -> TypeParseError {
        TypeParseError::Unsupported {
            feature,
            mode: self.mode,
        }
    }

    /// Can the next token begin a type expression?
    fn starts_type(&self) -> bool {
        match self.peek() {
            TokenKind::Ident(_)
            | TokenKind::Str { .. }
            | TokenKind::Number(_)
            | TokenKind::Special { .. } => true,
            TokenKind::Punct(p) => matches!(*p, "(" | "{" | "[" | "*" | "?" | "!" | "..."),
            TokenKind::Eof => false,
        }
    }

    /// Run `inner` one nesting level deeper.
    fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<T, TypeParseError>,
    ) -> Result<T, TypeParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(TypeParseError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn parse_union(&mut self) -> Result<TypeNode, TypeParseError> {
        self.nested(Self::union)
    }

    fn union(&mut self) -> Result<TypeNode, TypeParseError> {
        if self.mode == ParseMode::Typescript {
            self.eat("|");
        }
        let first = self.parse_intersection()?;
        if !self.is_punct("|") {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat("|") {
            elements.push(self.parse_intersection()?);
        }
        Ok(TypeNode::Union { elements })
    }

    fn parse_intersection(&mut self) -> Result<TypeNode, TypeParseError> {
        let first = self.parse_prefix()?;
        if !self.is_punct("&") {
            return Ok(first);
        }
        if self.mode != ParseMode::Typescript {
            return Err(self.unsupported("intersection"));
        }
        let mut elements = vec![first];
        while self.eat("&") {
            elements.push(self.parse_prefix()?);
        }
        Ok(TypeNode::Intersection { elements })
    }

    fn parse_prefix(&mut self) -> Result<TypeNode, TypeParseError> {
        self.nested(Self::prefix)
    }

    fn prefix(&mut self) -> Result<TypeNode, TypeParseError> {
        let prefix = PositionMeta {
            position: Position::Prefix,
        };

        if self.eat("?") {
            if !self.starts_type() {
                return self.parse_postfix(TypeNode::Unknown);
            }
            let element = Box::new(self.parse_prefix()?);
            return Ok(TypeNode::Nullable {
                element,
                meta: prefix,
            });
        }
        if self.eat("!") {
            let element = Box::new(self.parse_prefix()?);
            return Ok(TypeNode::NotNullable {
                element,
                meta: prefix,
            });
        }
        if self.eat("...") {
            return self.parse_variadic_prefix();
        }

        if self.mode == ParseMode::Typescript {
            if let TokenKind::Ident(word) = self.peek() {
                let is_typeof = word == "typeof";
                let is_keyof = word == "keyof";
                if (is_typeof || is_keyof) && self.ident_follows() {
                    self.advance();
                    let element = Box::new(self.parse_prefix()?);
                    return Ok(if is_typeof {
                        TypeNode::Typeof { element }
                    } else {
                        TypeNode::Keyof { element }
                    });
                }
            }
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// True when the token after the current one can start a type.
    fn ident_follows(&self) -> bool {
        match self.peek_at(1) {
            TokenKind::Ident(_) | TokenKind::Str { .. } | TokenKind::Number(_) => true,
            TokenKind::Punct(p) => matches!(*p, "(" | "{" | "["),
            _ => false,
        }
    }

    fn parse_variadic_prefix(&mut self) -> Result<TypeNode, TypeParseError> {
        if self.mode != ParseMode::Typescript && self.is_punct("[") {
            self.advance();
            let element = Box::new(self.parse_union()?);
            self.expect("]")?;
            return Ok(TypeNode::Variadic {
                element: Some(element),
                meta: VariadicMeta {
                    position: None,
                    square_brackets: true,
                },
            });
        }
        if !self.starts_type() {
            return Ok(TypeNode::Variadic {
                element: None,
                meta: VariadicMeta {
                    position: None,
                    square_brackets: false,
                },
            });
        }
        let element = Box::new(self.parse_prefix()?);
        Ok(TypeNode::Variadic {
            element: Some(element),
            meta: VariadicMeta {
                position: Some(Position::Prefix),
                square_brackets: false,
            },
        })
    }

    fn parse_postfix(&mut self, mut node: TypeNode) -> Result<TypeNode, TypeParseError> {
        let suffix = PositionMeta {
            position: Position::Suffix,
        };
        loop {
            if self.is_punct("[") && self.is_punct_at(1, "]") {
                if self.mode == ParseMode::Closure {
                    return Err(self.unsupported("array shorthand `[]`"));
                }
                self.pos += 2;
                node = TypeNode::Generic {
                    left: Box::new(TypeNode::Name {
                        value: "Array".to_string(),
                    }),
                    elements: vec![node],
                    meta: GenericMeta {
                        brackets: Brackets::Square,
                        dot: false,
                    },
                };
            } else if self.is_punct("<") {
                self.advance();
                node = self.parse_generic(node, false)?;
            } else if self.is_punct(".") && self.is_punct_at(1, "<") {
                self.pos += 2;
                node = self.parse_generic(node, true)?;
            } else if let Some(path_type) = self.path_separator() {
                self.advance();
                let right = self.parse_path_segment()?;
                node = TypeNode::NamePath {
                    left: Box::new(node),
                    right: Box::new(right),
                    path_type,
                };
            } else if self.is_punct("?") && !self.question_starts_type() {
                self.advance();
                node = TypeNode::Nullable {
                    element: Box::new(node),
                    meta: suffix,
                };
            } else if self.is_punct("!") {
                self.advance();
                node = TypeNode::NotNullable {
                    element: Box::new(node),
                    meta: suffix,
                };
            } else if self.is_punct("=") {
                self.advance();
                node = TypeNode::Optional {
                    element: Box::new(node),
                    meta: suffix,
                };
            } else if self.is_punct("...") && self.mode != ParseMode::Typescript {
                self.advance();
                node = TypeNode::Variadic {
                    element: Some(Box::new(node)),
                    meta: VariadicMeta {
                        position: Some(Position::Suffix),
                        square_brackets: false,
                    },
                };
            } else {
                return Ok(node);
            }
        }
    }

    /// A `?` directly followed by something that starts a type is not a suffix.
    fn question_starts_type(&self) -> bool {
        match self.peek_at(1) {
            TokenKind::Ident(_) | TokenKind::Str { .. } | TokenKind::Number(_) => true,
            TokenKind::Punct(p) => matches!(*p, "(" | "{" | "["),
            _ => false,
        }
    }

    fn path_separator(&self) -> Option<PathType> {
        let path_type = match self.peek() {
            TokenKind::Punct(".") => PathType::Property,
            TokenKind::Punct("#") => PathType::Instance,
            TokenKind::Punct("~") => PathType::Inner,
            _ => return None,
        };
        match self.peek_at(1) {
            TokenKind::Ident(_)
            | TokenKind::Str { .. }
            | TokenKind::Number(_)
            | TokenKind::Special { .. } => Some(path_type),
            _ => None,
        }
    }

    fn parse_path_segment(&mut self) -> Result<TypeNode, TypeParseError> {
        match self.advance() {
            TokenKind::Ident(value) => Ok(TypeNode::Property {
                value,
                meta: OptionalQuoteMeta::default(),
            }),
            TokenKind::Number(value) => Ok(TypeNode::Property {
                value: value.to_string(),
                meta: OptionalQuoteMeta::default(),
            }),
            TokenKind::Str { value, quote } => Ok(TypeNode::Property {
                value,
                meta: OptionalQuoteMeta { quote: Some(quote) },
            }),
            TokenKind::Special { kind, value } => Ok(TypeNode::SpecialNamePath {
                value,
                special_type: kind,
            }),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn parse_generic(&mut self, left: TypeNode, dot: bool) -> Result<TypeNode, TypeParseError> {
        let mut elements = vec![self.parse_union()?];
        while self.eat(",") {
            elements.push(self.parse_union()?);
        }
        self.expect(">")?;
        Ok(TypeNode::Generic {
            left: Box::new(left),
            elements,
            meta: GenericMeta {
                brackets: Brackets::Angle,
                dot,
            },
        })
    }

    fn parse_primary(&mut self) -> Result<TypeNode, TypeParseError> {
        match self.peek().clone() {
            TokenKind::Ident(word) => {
                self.advance();
                Ok(match word.as_str() {
                    "null" => TypeNode::Null,
                    "undefined" => TypeNode::Undefined,
                    "function" => return self.parse_function_keyword(),
                    _ => TypeNode::Name { value: word },
                })
            }
            TokenKind::Special { kind, value } => {
                self.advance();
                Ok(TypeNode::SpecialNamePath {
                    value,
                    special_type: kind,
                })
            }
            TokenKind::Str { value, quote } => {
                self.advance();
                Ok(TypeNode::StringValue {
                    value,
                    meta: QuoteMeta { quote },
                })
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(TypeNode::Number { value })
            }
            TokenKind::Punct("*") => {
                self.advance();
                Ok(TypeNode::Any)
            }
            TokenKind::Punct("(") => {
                self.advance();
                self.parse_parenthesized()
            }
            TokenKind::Punct("{") => {
                self.advance();
                self.parse_object()
            }
            TokenKind::Punct("[") => {
                if self.mode != ParseMode::Typescript {
                    return Err(self.unsupported("tuple"));
                }
                self.advance();
                self.parse_tuple()
            }
            _ => Err(self.unexpected()),
        }
    }

    /// After `(`: a typescript arrow function or a parenthesized type.
    fn parse_parenthesized(&mut self) -> Result<TypeNode, TypeParseError> {
        if self.mode == ParseMode::Typescript {
            let start = self.pos;
            if let Some(parameters) = self.try_arrow_parameters() {
                let return_type = Box::new(self.parse_union()?);
                return Ok(TypeNode::Function {
                    parameters,
                    return_type: Some(return_type),
                    arrow: true,
                    parenthesis: true,
                });
            }
            self.pos = start;
        }

        let element = Box::new(self.parse_union()?);
        self.expect(")")?;
        Ok(TypeNode::Parenthesis { element })
    }

    /// `a: A, b?: B, ...c: C) =>`; leaves the position after `=>` on success.
    fn try_arrow_parameters(&mut self) -> Option<Vec<TypeNode>> {
        let mut parameters = Vec::new();
        if !self.eat(")") {
            loop {
                let variadic = self.eat("...");
                let TokenKind::Ident(key) = self.peek().clone() else {
                    return None;
                };
                self.advance();
                let optional = self.eat("?");
                let right = if self.eat(":") {
                    Some(Box::new(self.parse_union().ok()?))
                } else {
                    None
                };
                parameters.push(TypeNode::KeyValue {
                    key,
                    right,
                    optional,
                    variadic,
                });
                if self.eat(")") {
                    break;
                }
                if !self.eat(",") {
                    return None;
                }
            }
        }
        if self.eat("=>") {
            Some(parameters)
        } else {
            None
        }
    }

    /// After the `function` keyword.
    fn parse_function_keyword(&mut self) -> Result<TypeNode, TypeParseError> {
        if !self.eat("(") {
            return Ok(TypeNode::Function {
                parameters: Vec::new(),
                return_type: None,
                arrow: false,
                parenthesis: false,
            });
        }

        let mut parameters = Vec::new();
        if !self.eat(")") {
            loop {
                parameters.push(self.parse_function_parameter()?);
                if self.eat(")") {
                    break;
                }
                self.expect(",")?;
            }
        }

        let return_type = if self.eat(":") {
            Some(Box::new(self.parse_prefix()?))
        } else {
            None
        };
        Ok(TypeNode::Function {
            parameters,
            return_type,
            arrow: false,
            parenthesis: true,
        })
    }

    /// A parameter type, or `this:T` / `new:T`.
    fn parse_function_parameter(&mut self) -> Result<TypeNode, TypeParseError> {
        if let TokenKind::Ident(key) = self.peek().clone() {
            if self.is_punct_at(1, ":") {
                self.pos += 2;
                let right = Box::new(self.parse_union()?);
                return Ok(TypeNode::KeyValue {
                    key,
                    right: Some(right),
                    optional: false,
                    variadic: false,
                });
            }
        }
        self.parse_union()
    }

    /// After `{`.
    fn parse_object(&mut self) -> Result<TypeNode, TypeParseError> {
        let mut elements = Vec::new();
        let mut separator = None;

        while !self.eat("}") {
            elements.push(self.parse_object_field()?);

            let found = if self.eat(",") {
                Separator::Comma
            } else if self.eat(";") {
                Separator::Semicolon
            } else if self.is_punct("}") {
                continue;
            } else if self.tokens.get(self.pos).is_some_and(|t| t.newline_before) {
                Separator::Linebreak
            } else {
                return Err(self.unexpected());
            };
            separator.get_or_insert(found);
        }

        Ok(TypeNode::Object {
            elements,
            meta: ObjectMeta { separator },
        })
    }

    fn parse_object_field(&mut self) -> Result<TypeNode, TypeParseError> {
        let readonly = self.mode == ParseMode::Typescript
            && matches!(self.peek(), TokenKind::Ident(w) if w == "readonly")
            && matches!(
                self.peek_at(1),
                TokenKind::Ident(_) | TokenKind::Str { .. } | TokenKind::Number(_)
            );
        if readonly {
            self.advance();
        }

        let (key, quote) = match self.advance() {
            TokenKind::Ident(key) => (key, None),
            TokenKind::Str { value, quote } => (value, Some(quote)),
            TokenKind::Number(n) => (n.to_string(), None),
            _ => {
                self.pos -= 1;
                return Err(self.unexpected());
            }
        };

        let optional = self.eat("?");
        let right = if self.eat(":") {
            Some(Box::new(self.parse_union()?))
        } else {
            None
        };

        Ok(TypeNode::ObjectField {
            key,
            right,
            optional,
            readonly,
            meta: OptionalQuoteMeta { quote },
        })
    }

    /// After `[` in typescript mode.
    fn parse_tuple(&mut self) -> Result<TypeNode, TypeParseError> {
        let mut elements = Vec::new();
        if !self.eat("]") {
            loop {
                elements.push(self.parse_union()?);
                if self.eat("]") {
                    break;
                }
                self.expect(",")?;
            }
        }
        Ok(TypeNode::Tuple { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse, stringify, Quote, SpecialPathType};
    use super::*;

    fn parens(depth: usize) -> String {
        format!("{}A{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_limit() {
        assert!(parse(&parens(60), ParseMode::Typescript).is_ok());
        assert_eq!(
            parse(&parens(10_000), ParseMode::Typescript),
            Err(TypeParseError::TooDeep { limit: MAX_DEPTH })
        );
        let prefixes = format!("{}A", "!".repeat(10_000));
        assert_eq!(
            parse(&prefixes, ParseMode::Closure),
            Err(TypeParseError::TooDeep { limit: MAX_DEPTH })
        );
    }

    fn ts(input: &str) -> TypeNode {
        parse(input, ParseMode::Typescript).unwrap()
    }

    fn name(value: &str) -> TypeNode {
        TypeNode::Name {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_names_and_unions() {
        assert_eq!(ts("string"), name("string"));
        assert_eq!(
            ts("Bar|Foo"),
            TypeNode::Union {
                elements: vec![name("Bar"), name("Foo")]
            }
        );
        assert_eq!(ts("null"), TypeNode::Null);
        assert_eq!(ts("undefined"), TypeNode::Undefined);
    }

    #[test]
    fn test_array_shorthand() {
        assert_eq!(
            ts("string[]"),
            TypeNode::Generic {
                left: Box::new(name("Array")),
                elements: vec![name("string")],
                meta: GenericMeta {
                    brackets: Brackets::Square,
                    dot: false
                },
            }
        );
        assert!(matches!(
            parse("string[]", ParseMode::Closure),
            Err(TypeParseError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_generics() {
        let node = parse("Array.<string, number>", ParseMode::Closure).unwrap();
        let TypeNode::Generic { elements, meta, .. } = node else {
            panic!("expected generic");
        };
        assert_eq!(elements.len(), 2);
        assert!(meta.dot);
    }

    #[test]
    fn test_modifiers() {
        assert!(matches!(
            parse("?number", ParseMode::Closure).unwrap(),
            TypeNode::Nullable { meta: PositionMeta { position: Position::Prefix }, .. }
        ));
        assert!(matches!(
            parse("number?", ParseMode::Jsdoc).unwrap(),
            TypeNode::Nullable { meta: PositionMeta { position: Position::Suffix }, .. }
        ));
        assert!(matches!(
            parse("!Object", ParseMode::Closure).unwrap(),
            TypeNode::NotNullable { .. }
        ));
        assert!(matches!(
            parse("string=", ParseMode::Closure).unwrap(),
            TypeNode::Optional { .. }
        ));
        assert_eq!(parse("?", ParseMode::Jsdoc).unwrap(), TypeNode::Unknown);
        assert_eq!(parse("*", ParseMode::Jsdoc).unwrap(), TypeNode::Any);
    }

    #[test]
    fn test_variadics() {
        let node = parse("...number", ParseMode::Jsdoc).unwrap();
        assert!(matches!(
            node,
            TypeNode::Variadic { element: Some(_), meta: VariadicMeta { position: Some(Position::Prefix), .. } }
        ));
        let node = parse("...[number]", ParseMode::Closure).unwrap();
        assert!(matches!(
            node,
            TypeNode::Variadic { meta: VariadicMeta { square_brackets: true, .. }, .. }
        ));
        let node = parse("...", ParseMode::Jsdoc).unwrap();
        assert!(matches!(node, TypeNode::Variadic { element: None, .. }));
    }

    #[test]
    fn test_functions() {
        let node = parse("function(string, number): boolean", ParseMode::Closure).unwrap();
        let TypeNode::Function {
            parameters,
            return_type,
            arrow,
            ..
        } = node
        else {
            panic!("expected function");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(return_type.as_deref(), Some(&name("boolean")));
        assert!(!arrow);

        let node = ts("(a: string, b?: number) => void");
        let TypeNode::Function { parameters, arrow, .. } = node else {
            panic!("expected arrow");
        };
        assert!(arrow);
        assert!(matches!(
            &parameters[1],
            TypeNode::KeyValue { key, optional: true, .. } if key == "b"
        ));

        let node = parse("function(this:Window)", ParseMode::Closure).unwrap();
        let TypeNode::Function { parameters, .. } = node else {
            panic!("expected function");
        };
        assert!(matches!(&parameters[0], TypeNode::KeyValue { key, .. } if key == "this"));
    }

    #[test]
    fn test_parenthesis_is_not_arrow() {
        assert!(matches!(ts("(A | B)[]"), TypeNode::Generic { .. }));
        assert!(matches!(ts("(A)"), TypeNode::Parenthesis { .. }));
    }

    #[test]
    fn test_objects() {
        let node = ts("{a: string; readonly b?: number}");
        let TypeNode::Object { elements, meta } = node else {
            panic!("expected object");
        };
        assert_eq!(meta.separator, Some(Separator::Semicolon));
        assert!(matches!(
            &elements[1],
            TypeNode::ObjectField { key, optional: true, readonly: true, .. } if key == "b"
        ));

        let node = ts("{\n  a: string\n  b: number\n}");
        assert!(matches!(
            node,
            TypeNode::Object { meta: ObjectMeta { separator: Some(Separator::Linebreak) }, .. }
        ));

        let node = parse("{'x': number}", ParseMode::Jsdoc).unwrap();
        let TypeNode::Object { elements, .. } = node else {
            panic!("expected object");
        };
        assert!(matches!(
            &elements[0],
            TypeNode::ObjectField { meta: OptionalQuoteMeta { quote: Some(Quote::Single) }, .. }
        ));
    }

    #[test]
    fn test_typescript_only_forms() {
        assert!(matches!(ts("[string, number]"), TypeNode::Tuple { .. }));
        assert!(matches!(ts("typeof foo"), TypeNode::Typeof { .. }));
        assert!(matches!(ts("keyof Foo"), TypeNode::Keyof { .. }));
        assert!(matches!(ts("A & B"), TypeNode::Intersection { .. }));
        assert!(matches!(
            parse("A & B", ParseMode::Jsdoc),
            Err(TypeParseError::Unsupported { .. })
        ));
        assert_eq!(parse("typeof", ParseMode::Typescript).unwrap(), name("typeof"));
    }

    #[test]
    fn test_name_paths() {
        let node = parse("module:foo/bar~baz", ParseMode::Jsdoc).unwrap();
        let TypeNode::NamePath {
            left, path_type, ..
        } = node
        else {
            panic!("expected name path");
        };
        assert_eq!(path_type, PathType::Inner);
        assert!(matches!(
            *left,
            TypeNode::SpecialNamePath { special_type: SpecialPathType::Module, .. }
        ));

        let node = ts("a.b.c");
        assert!(matches!(node, TypeNode::NamePath { path_type: PathType::Property, .. }));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("", ParseMode::Typescript), Err(TypeParseError::Empty));
        assert_eq!(parse("   ", ParseMode::Typescript), Err(TypeParseError::Empty));
        assert_eq!(
            parse("Array<string", ParseMode::Typescript),
            Err(TypeParseError::UnexpectedEnd)
        );
        assert!(matches!(
            parse("a b", ParseMode::Typescript),
            Err(TypeParseError::UnexpectedToken { offset: 2, .. })
        ));
    }

    #[test]
    fn test_printed_form_reparses_to_same_tree() {
        let samples = [
            ("Array<string | number>", ParseMode::Typescript),
            ("{a: string, b?: number[]}", ParseMode::Typescript),
            ("(x: number) => Promise<void>", ParseMode::Typescript),
            ("function(this:T, ...string): ?number", ParseMode::Closure),
            ("Object.<string, !Array.<number>>", ParseMode::Closure),
            ("module:foo#bar", ParseMode::Jsdoc),
            ("\"a\" | 'b' | 1", ParseMode::Typescript),
            ("number...", ParseMode::Jsdoc),
        ];
        for (input, mode) in samples {
            let node = parse(input, mode).unwrap();
            let printed = stringify(&node);
            assert_eq!(parse(&printed, mode).unwrap(), node, "reprint of {}", input);
        }
    }
}
