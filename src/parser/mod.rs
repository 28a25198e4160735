//! Parser for the visual format language used in `@constraints`

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse;
