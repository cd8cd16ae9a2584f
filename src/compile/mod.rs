//! AST to tree compilation.
//!
//! Methods go through [`MethodAssembler`], a chain of stage structs that each
//! consume the previous stage. Fields are a straight mapping in [`field`].

pub mod assembler;
pub mod field;
pub mod locals;
pub mod variables;

use std::error::Error as StdError;

use thiserror::Error;

use crate::ast::{Position, Unit};
use crate::text::ParseError;
use crate::tree::{FieldNode, Insn, TryCatchBlock};

pub use assembler::{
    CompiledMethod, InstructionsLowered, LabelsMaterialized, MethodAssembler, VariablesAllocated,
};
pub use variables::{raw_slot, UsageKind, VariableInfo, VariableSource, Variables};

pub type Result<T> = std::result::Result<T, CompileError>;

/// Boxed error returned by collaborators.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A label or variable name that nothing defines.
    #[error("{position}: {message}")]
    Resolution { message: String, position: Position },
    #[error("{position}: {message}")]
    TypeConsistency { message: String, position: Position },
    #[error("{position}: {message}")]
    WideSlot { message: String, position: Position },
    #[error("{position}: {message}")]
    Structural { message: String, position: Position },
    #[error("{position}: {message}: {source}")]
    Expression {
        message: String,
        position: Position,
        #[source]
        source: BoxError,
    },
}

impl CompileError {
    pub fn resolution(message: impl Into<String>, position: Position) -> Self {
        CompileError::Resolution {
            message: message.into(),
            position,
        }
    }

    pub fn type_consistency(message: impl Into<String>, position: Position) -> Self {
        CompileError::TypeConsistency {
            message: message.into(),
            position,
        }
    }

    pub fn wide_slot(position: Position) -> Self {
        CompileError::WideSlot {
            message: "Illegal usage of reserved wide slot!".into(),
            position,
        }
    }

    pub fn structural(message: impl Into<String>, position: Position) -> Self {
        CompileError::Structural {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn missing_label(name: &str, position: Position) -> Self {
        Self::resolution(
            format!("No identifier mapping to label instance for '{}'", name),
            position,
        )
    }

    pub fn position(&self) -> Position {
        match self {
            CompileError::Parse(err) => err.position,
            CompileError::Resolution { position, .. }
            | CompileError::TypeConsistency { position, .. }
            | CompileError::WideSlot { position, .. }
            | CompileError::Structural { position, .. }
            | CompileError::Expression { position, .. } => *position,
        }
    }

    /// The message without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            CompileError::Parse(err) => &err.message,
            CompileError::Resolution { message, .. }
            | CompileError::TypeConsistency { message, .. }
            | CompileError::WideSlot { message, .. }
            | CompileError::Structural { message, .. }
            | CompileError::Expression { message, .. } => message,
        }
    }
}

/// How far a generated local variable entry reaches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VariableRange {
    /// From the first to the last label of the method.
    #[default]
    WholeMethod,
    /// From the closest label before the first usage to the closest label
    /// after the last usage.
    NearestLabels,
}

#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Internal name of the class declaring the method, the type of `this`.
    pub self_type: String,
    pub variable_range: VariableRange,
    pub emit_local_variables: bool,
    pub max_stack: u16,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            self_type: crate::descriptor::OBJECT.to_string(),
            variable_range: VariableRange::WholeMethod,
            emit_local_variables: true,
            max_stack: 0xFF,
        }
    }
}

impl CompileOptions {
    pub fn for_class(self_type: impl Into<String>) -> Self {
        CompileOptions {
            self_type: self_type.into(),
            ..CompileOptions::default()
        }
    }
}

/// Answers class hierarchy questions for local variable typing.
pub trait InheritanceOracle: Send + Sync {
    /// Closest common supertype of two internal names.
    fn common_supertype(&self, a: &str, b: &str) -> String;
}

/// Provides class file bytes to the expression compiler.
pub trait ClassSupplier: Send + Sync {
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>>;
}

/// What an expression compiler gets to see of the method around it.
pub struct ExpressionContext<'a> {
    pub self_type: &'a str,
    pub method_name: &'a str,
    pub method_desc: &'a str,
    /// Bytes of the declaring class, when the supplier knows it.
    pub class_bytes: Option<Vec<u8>>,
    pub variables: &'a Variables,
}

/// Compiles an embedded high-level snippet to a fragment of instructions.
///
/// Label ids in the returned fragment are local to it; the assembler renumbers
/// them so they can't collide with the method's own labels.
pub trait ExpressionCompiler: Send + Sync {
    fn compile(
        &self,
        snippet: &str,
        context: &ExpressionContext<'_>,
    ) -> std::result::Result<(Vec<Insn>, Vec<TryCatchBlock>), BoxError>;
}

/// Collaborators the assembler may consult. All are optional.
#[derive(Clone, Copy, Default)]
pub struct Collaborators<'a> {
    pub oracle: Option<&'a dyn InheritanceOracle>,
    pub classes: Option<&'a dyn ClassSupplier>,
    pub expressions: Option<&'a dyn ExpressionCompiler>,
}

/// Compiles a method unit in one go.
pub fn compile_method(
    unit: &Unit,
    options: &CompileOptions,
    collaborators: Collaborators<'_>,
) -> Result<CompiledMethod> {
    MethodAssembler::new(unit, options, collaborators)?
        .materialize_labels()?
        .allocate_variables()?
        .lower_instructions()?
        .build()
}

pub fn compile_field(unit: &Unit) -> Result<FieldNode> {
    field::assemble(unit)
}
