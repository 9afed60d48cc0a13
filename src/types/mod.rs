//! Core data types: tokenizer-side records and the comment tree.

pub mod ast;
pub mod tokens;

pub use ast::{
    InlineTagFormat, InlineTagSpacing, JsdocBlock, JsdocDescriptionLine, JsdocInlineTag, JsdocTag,
    JsdocTypeLine,
};
pub use tokens::{CommentBlock, Line, Problem, ProblemCode, TagSpec, Tokens};
