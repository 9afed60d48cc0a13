//! Crate-level error wrapping each module's failure type.

use crate::formatter::StringifyError;
use crate::parser::LookupError;
use crate::selector::SelectorError;
use crate::tree::BuildError;
use crate::type_expr::TypeParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Stringify(#[from] StringifyError),
    #[error(transparent)]
    TypeParse(#[from] TypeParseError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("Failed to convert tree to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("Not a doc comment: {0:?}")]
    NotDocComment(String),
}
