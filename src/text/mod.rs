//! Textual front-end: assembly text to [`Unit`] and back.
//!
//! Two surface syntaxes are supported, selected by [`Syntax`]. Each grammar
//! produces the same parse tree, which one visitor maps onto the AST.

mod directive;
mod keyword;
mod literal;
mod node;
mod printer;
mod rules;
mod scanner;
mod visitor;

use log::trace;
use thiserror::Error;

use crate::ast::{Position, Unit};

/// Text that could not be turned into a unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Syntax {
    /// Upper-case mnemonics with bracketed operand groups.
    #[default]
    Keyword,
    /// Lower-case mnemonics with `method ... end` blocks.
    Directive,
}

#[derive(Clone, Debug)]
pub struct PrintOptions {
    pub syntax: Syntax,
    /// Prefix for instruction and directive lines inside a body.
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            syntax: Syntax::Keyword,
            indent: "    ".to_string(),
        }
    }
}

impl PrintOptions {
    pub fn new(syntax: Syntax) -> Self {
        PrintOptions {
            syntax,
            ..PrintOptions::default()
        }
    }
}

pub fn parse(source: &str, syntax: Syntax) -> Result<Unit, ParseError> {
    trace!("parsing {} chars as {:?}", source.len(), syntax);
    let mut scanner = scanner::Scanner::new(source);
    let nodes = match syntax {
        Syntax::Keyword => keyword::parse(&mut scanner)?,
        Syntax::Directive => directive::parse(&mut scanner)?,
    };
    visitor::visit(nodes, scanner.chars())
}

pub fn print(unit: &Unit, options: &PrintOptions) -> String {
    printer::print(unit, options)
}
