mod stringify;

pub use stringify::*;
