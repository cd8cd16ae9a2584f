//! The assembly AST: what a textual listing means, before any slot or label
//! is resolved.
//!
//! Nodes are plain data. A [`Unit`] is built once by a front-end or by the
//! disassembler and is only read afterwards.

mod annotation;
mod code;
mod definition;
mod instruction;

use std::fmt;

pub use annotation::*;
pub use code::*;
pub use definition::*;
pub use instruction::*;

/// Source location of a node: 1-based line and column plus the `[start, end)`
/// char range in the parsed text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, start: usize, end: usize) -> Self {
        Self {
            line,
            column,
            start,
            end,
        }
    }

    /// Smallest range covering both positions, anchored at the earlier one.
    pub fn merge(self, other: Position) -> Position {
        let first = if self.start <= other.start { self } else { other };
        Position {
            line: first.line,
            column: first.column,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Root of a parsed or disassembled listing: one definition plus, for fields
/// and methods, its code body.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub definition: Definition,
    pub code: Option<Code>,
}

impl Unit {
    pub fn new(definition: Definition) -> Self {
        Self {
            definition,
            code: None,
        }
    }

    pub fn with_code(definition: Definition, code: Code) -> Self {
        Self {
            definition,
            code: Some(code),
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.definition, Definition::Method(_))
    }

    pub fn is_field(&self) -> bool {
        matches!(self.definition, Definition::Field(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.definition, Definition::Class(_))
    }

    pub fn method(&self) -> Option<&MethodDefinition> {
        match &self.definition {
            Definition::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&FieldDefinition> {
        match &self.definition {
            Definition::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassDefinition> {
        match &self.definition {
            Definition::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The code body, or an empty one when the unit has none.
    pub fn code_or_empty(&self) -> std::borrow::Cow<'_, Code> {
        match &self.code {
            Some(code) => std::borrow::Cow::Borrowed(code),
            None => std::borrow::Cow::Owned(Code::default()),
        }
    }
}
