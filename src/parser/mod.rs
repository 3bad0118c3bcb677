//! Parser for the template delimiter syntax

pub mod ast;
mod grammar;
pub mod lexer;
pub mod scanner;
mod settings;

pub use ast::*;
pub use grammar::parse;
pub use settings::{Delimiter, TemplateSettings};
