//! Low-level member model.
//!
//! This is the interchange form the assembler produces and the disassembler
//! consumes: instructions reference opaque [`LabelId`]s and numbered local
//! variable slots, with no textual names left.

mod annotation;
mod insn;
mod member;

pub use annotation::*;
pub use insn::*;
pub use member::*;
