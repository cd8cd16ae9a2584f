use std::collections::HashMap;

use super::{Annotation, ConstVal, Instruction, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryCatch {
    pub start: String,
    pub end: String,
    pub handler: String,
    /// `None` for a catch-all handler.
    pub exception_type: Option<String>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThrownException {
    pub exception_type: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub value: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub text: String,
    pub position: Position,
}

/// Text the front-end could not recognize, kept verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct Unmatched {
    pub text: String,
    pub position: Position,
}

/// An embedded high-level expression, compiled by an external collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub code: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CodeEntry {
    Instruction(Instruction),
    Label(Label),
    TryCatch(TryCatch),
    ThrownException(ThrownException),
    Signature(Signature),
    ConstVal(ConstVal),
    Annotation(Annotation),
    Comment(Comment),
    Unmatched(Unmatched),
    Expression(Expression),
}

impl CodeEntry {
    pub fn position(&self) -> Position {
        match self {
            CodeEntry::Instruction(e) => e.position,
            CodeEntry::Label(e) => e.position,
            CodeEntry::TryCatch(e) => e.position,
            CodeEntry::ThrownException(e) => e.position,
            CodeEntry::Signature(e) => e.position,
            CodeEntry::ConstVal(e) => e.position,
            CodeEntry::Annotation(e) => e.position,
            CodeEntry::Comment(e) => e.position,
            CodeEntry::Unmatched(e) => e.position,
            CodeEntry::Expression(e) => e.position,
        }
    }
}

/// Ordered body of a field or method.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Code {
    entries: Vec<CodeEntry>,
}

impl Code {
    pub const EMPTY: Code = Code {
        entries: Vec::new(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CodeEntry) {
        self.entries.push(entry);
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.entries.push(CodeEntry::Instruction(instruction));
    }

    pub fn add_label(&mut self, name: impl Into<String>) {
        self.entries.push(CodeEntry::Label(Label {
            name: name.into(),
            position: Position::default(),
        }));
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<CodeEntry> {
        &mut self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.entries.iter().filter_map(|e| match e {
            CodeEntry::Instruction(insn) => Some(insn),
            _ => None,
        })
    }

    /// Declared labels by name. A later duplicate shadows an earlier one.
    pub fn labels(&self) -> HashMap<&str, &Label> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                CodeEntry::Label(label) => Some((label.name.as_str(), label)),
                _ => None,
            })
            .collect()
    }

    /// Declared label names in order of appearance.
    pub fn label_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                CodeEntry::Label(label) => Some(label.name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn try_catches(&self) -> impl Iterator<Item = &TryCatch> {
        self.entries.iter().filter_map(|e| match e {
            CodeEntry::TryCatch(tc) => Some(tc),
            _ => None,
        })
    }

    pub fn thrown_exceptions(&self) -> impl Iterator<Item = &ThrownException> {
        self.entries.iter().filter_map(|e| match e {
            CodeEntry::ThrownException(t) => Some(t),
            _ => None,
        })
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter().filter_map(|e| match e {
            CodeEntry::Annotation(a) => Some(a),
            _ => None,
        })
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &Unmatched> {
        self.entries.iter().filter_map(|e| match e {
            CodeEntry::Unmatched(u) => Some(u),
            _ => None,
        })
    }

    /// The last signature entry, if any.
    pub fn signature(&self) -> Option<&Signature> {
        self.entries.iter().rev().find_map(|e| match e {
            CodeEntry::Signature(s) => Some(s),
            _ => None,
        })
    }

    pub fn const_val(&self) -> Option<&ConstVal> {
        self.entries.iter().rev().find_map(|e| match e {
            CodeEntry::ConstVal(c) => Some(c),
            _ => None,
        })
    }

    /// First entry that starts on the given line.
    pub fn entry_on_line(&self, line: usize) -> Option<&CodeEntry> {
        self.entries.iter().find(|e| e.position().line == line)
    }
}
