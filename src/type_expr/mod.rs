//! @dose
//! purpose: Type expressions found inside `{...}` in doc tags. Parses them into a TypeNode
//!     tree in one of three dialects (closure, jsdoc, typescript) and prints trees back in a
//!     canonical spacing.
//!
//! when-editing:
//!     - !Every child-bearing TypeNode field must be listed in VISITOR_KEYS, selector queries
//!       walk nodes only through those keys
//!     - !Serialized `type` names are part of the public query surface (`JsdocTypeUnion` ...)
//!
//! invariants:
//!     - parse(&stringify(node), mode) yields a tree equal to `node` for any parsed `node`,
//!       except that line-break separated object fields come back `;` separated
//!     - Empty input never parses
//!
//! gotchas:
//!     - `string[]` parses as a Generic whose left side is the name `Array`
//!     - Special name paths (`module:foo`) are not recognized in typescript mode

mod lexer;
mod parser;
mod printer;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use printer::stringify;

/// Dialect of the type grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Closure,
    Jsdoc,
    #[default]
    Typescript,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closure => "closure",
            Self::Jsdoc => "jsdoc",
            Self::Typescript => "typescript",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    #[error("empty type expression")]
    Empty,
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of type expression")]
    UnexpectedEnd,
    #[error("{feature} is not supported in {mode} mode")]
    Unsupported { feature: &'static str, mode: ParseMode },
    #[error("type expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Parse a type expression.
pub fn parse(input: &str, mode: ParseMode) -> Result<TypeNode, TypeParseError> {
    let tokens = lexer::tokenize(input, mode)?;
    parser::Parser::new(tokens, mode).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brackets {
    Angle,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    Comma,
    Semicolon,
    Linebreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    Property,
    Instance,
    Inner,
}

impl PathType {
    pub fn separator(self) -> char {
        match self {
            Self::Property => '.',
            Self::Instance => '#',
            Self::Inner => '~',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialPathType {
    Module,
    Event,
    External,
}

impl SpecialPathType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "module" => Some(Self::Module),
            "event" => Some(Self::Event),
            "external" => Some(Self::External),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Event => "event",
            Self::External => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMeta {
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariadicMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub square_brackets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericMeta {
    pub brackets: Brackets,
    pub dot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteMeta {
    pub quote: Quote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalQuoteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<Separator>,
}

/// A node of a parsed type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TypeNode {
    #[serde(rename = "JsdocTypeName")]
    Name { value: String },
    #[serde(rename = "JsdocTypeUnion")]
    Union { elements: Vec<TypeNode> },
    #[serde(rename = "JsdocTypeIntersection")]
    Intersection { elements: Vec<TypeNode> },
    #[serde(rename = "JsdocTypeGeneric")]
    Generic {
        left: Box<TypeNode>,
        elements: Vec<TypeNode>,
        meta: GenericMeta,
    },
    #[serde(rename = "JsdocTypeNullable")]
    Nullable {
        element: Box<TypeNode>,
        meta: PositionMeta,
    },
    #[serde(rename = "JsdocTypeNotNullable")]
    NotNullable {
        element: Box<TypeNode>,
        meta: PositionMeta,
    },
    #[serde(rename = "JsdocTypeOptional")]
    Optional {
        element: Box<TypeNode>,
        meta: PositionMeta,
    },
    #[serde(rename = "JsdocTypeVariadic")]
    Variadic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeNode>>,
        meta: VariadicMeta,
    },
    #[serde(rename = "JsdocTypeAny")]
    Any,
    #[serde(rename = "JsdocTypeUnknown")]
    Unknown,
    #[serde(rename = "JsdocTypeNull")]
    Null,
    #[serde(rename = "JsdocTypeUndefined")]
    Undefined,
    #[serde(rename = "JsdocTypeStringValue")]
    StringValue { value: String, meta: QuoteMeta },
    #[serde(rename = "JsdocTypeNumber")]
    Number { value: f64 },
    #[serde(rename = "JsdocTypeFunction")]
    Function {
        parameters: Vec<TypeNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Box<TypeNode>>,
        arrow: bool,
        parenthesis: bool,
    },
    #[serde(rename = "JsdocTypeObject")]
    Object {
        elements: Vec<TypeNode>,
        meta: ObjectMeta,
    },
    #[serde(rename = "JsdocTypeObjectField")]
    ObjectField {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Box<TypeNode>>,
        optional: bool,
        readonly: bool,
        meta: OptionalQuoteMeta,
    },
    #[serde(rename = "JsdocTypeKeyValue")]
    KeyValue {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Box<TypeNode>>,
        optional: bool,
        variadic: bool,
    },
    #[serde(rename = "JsdocTypeParenthesis")]
    Parenthesis { element: Box<TypeNode> },
    #[serde(rename = "JsdocTypeTuple")]
    Tuple { elements: Vec<TypeNode> },
    #[serde(rename = "JsdocTypeTypeof")]
    Typeof { element: Box<TypeNode> },
    #[serde(rename = "JsdocTypeKeyof")]
    Keyof { element: Box<TypeNode> },
    #[serde(rename = "JsdocTypeNamePath")]
    NamePath {
        left: Box<TypeNode>,
        right: Box<TypeNode>,
        path_type: PathType,
    },
    #[serde(rename = "JsdocTypeProperty")]
    Property {
        value: String,
        meta: OptionalQuoteMeta,
    },
    #[serde(rename = "JsdocTypeSpecialNamePath")]
    SpecialNamePath {
        value: String,
        special_type: SpecialPathType,
    },
}

impl TypeNode {
    /// The serialized `type` name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Name { .. } => "JsdocTypeName",
            Self::Union { .. } => "JsdocTypeUnion",
            Self::Intersection { .. } => "JsdocTypeIntersection",
            Self::Generic { .. } => "JsdocTypeGeneric",
            Self::Nullable { .. } => "JsdocTypeNullable",
            Self::NotNullable { .. } => "JsdocTypeNotNullable",
            Self::Optional { .. } => "JsdocTypeOptional",
            Self::Variadic { .. } => "JsdocTypeVariadic",
            Self::Any => "JsdocTypeAny",
            Self::Unknown => "JsdocTypeUnknown",
            Self::Null => "JsdocTypeNull",
            Self::Undefined => "JsdocTypeUndefined",
            Self::StringValue { .. } => "JsdocTypeStringValue",
            Self::Number { .. } => "JsdocTypeNumber",
            Self::Function { .. } => "JsdocTypeFunction",
            Self::Object { .. } => "JsdocTypeObject",
            Self::ObjectField { .. } => "JsdocTypeObjectField",
            Self::KeyValue { .. } => "JsdocTypeKeyValue",
            Self::Parenthesis { .. } => "JsdocTypeParenthesis",
            Self::Tuple { .. } => "JsdocTypeTuple",
            Self::Typeof { .. } => "JsdocTypeTypeof",
            Self::Keyof { .. } => "JsdocTypeKeyof",
            Self::NamePath { .. } => "JsdocTypeNamePath",
            Self::Property { .. } => "JsdocTypeProperty",
            Self::SpecialNamePath { .. } => "JsdocTypeSpecialNamePath",
        }
    }

    /// Children stored under one traversal key (see VISITOR_KEYS).
    pub fn children(&self, key: &str) -> Vec<&TypeNode> {
        match (self, key) {
            (Self::Union { elements }, "elements")
            | (Self::Intersection { elements }, "elements")
            | (Self::Generic { elements, .. }, "elements")
            | (Self::Object { elements, .. }, "elements")
            | (Self::Tuple { elements }, "elements") => elements.iter().collect(),
            (Self::Function { parameters, .. }, "parameters") => parameters.iter().collect(),
            (Self::Generic { left, .. }, "left") | (Self::NamePath { left, .. }, "left") => {
                vec![left.as_ref()]
            }
            (Self::NamePath { right, .. }, "right") => vec![right.as_ref()],
            (Self::Nullable { element, .. }, "element")
            | (Self::NotNullable { element, .. }, "element")
            | (Self::Optional { element, .. }, "element")
            | (Self::Parenthesis { element }, "element")
            | (Self::Typeof { element }, "element")
            | (Self::Keyof { element }, "element") => vec![element.as_ref()],
            (Self::Variadic { element, .. }, "element") => element.iter().map(|e| e.as_ref()).collect(),
            (Self::Function { return_type, .. }, "returnType") => {
                return_type.iter().map(|e| e.as_ref()).collect()
            }
            (Self::ObjectField { right, .. }, "right") | (Self::KeyValue { right, .. }, "right") => {
                right.iter().map(|e| e.as_ref()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

/// Child-bearing fields of each type node kind, in traversal order.
pub const VISITOR_KEYS: &[(&str, &[&str])] = &[
    ("JsdocTypeName", &[]),
    ("JsdocTypeUnion", &["elements"]),
    ("JsdocTypeIntersection", &["elements"]),
    ("JsdocTypeGeneric", &["left", "elements"]),
    ("JsdocTypeNullable", &["element"]),
    ("JsdocTypeNotNullable", &["element"]),
    ("JsdocTypeOptional", &["element"]),
    ("JsdocTypeVariadic", &["element"]),
    ("JsdocTypeAny", &[]),
    ("JsdocTypeUnknown", &[]),
    ("JsdocTypeNull", &[]),
    ("JsdocTypeUndefined", &[]),
    ("JsdocTypeStringValue", &[]),
    ("JsdocTypeNumber", &[]),
    ("JsdocTypeFunction", &["parameters", "returnType"]),
    ("JsdocTypeObject", &["elements"]),
    ("JsdocTypeObjectField", &["right"]),
    ("JsdocTypeKeyValue", &["right"]),
    ("JsdocTypeParenthesis", &["element"]),
    ("JsdocTypeTuple", &["elements"]),
    ("JsdocTypeTypeof", &["element"]),
    ("JsdocTypeKeyof", &["element"]),
    ("JsdocTypeNamePath", &["left", "right"]),
    ("JsdocTypeProperty", &[]),
    ("JsdocTypeSpecialNamePath", &[]),
];
