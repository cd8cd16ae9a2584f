//! Assembler and disassembler for JVM class members.
//!
//! Text is parsed into an [`ast::Unit`] by [`text::parse`], compiled into the
//! [`tree`] model by [`compile`], and [`disassemble`] goes the other way.
//!
//! ```rust
//! use classfile_assembler::compile::{self, Collaborators, CompileOptions};
//! use classfile_assembler::text::{self, Syntax};
//!
//! let unit = text::parse("public static one()I\nICONST_1\nIRETURN", Syntax::Keyword).unwrap();
//! let compiled = compile::compile_method(&unit, &CompileOptions::default(), Collaborators::default())
//!     .unwrap();
//! assert_eq!(compiled.method.instructions.len(), 2);
//! ```

pub mod annotation;
pub mod ast;
pub mod compile;
pub mod descriptor;
pub mod disassemble;
pub mod opcode;
pub mod pipeline;
pub mod text;
pub mod tree;
pub mod types;

pub use compile::{compile_field, compile_method, CompileError, CompileOptions};
pub use disassemble::{disassemble_class, disassemble_field, disassemble_method};
pub use pipeline::AssemblerPipeline;
pub use text::{parse, print, ParseError, Syntax};
