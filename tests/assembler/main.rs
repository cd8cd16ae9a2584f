use classfile_assembler::ast::Unit;
use classfile_assembler::compile::{
    self, BoxError, ClassSupplier, Collaborators, CompileOptions, CompiledMethod,
    ExpressionCompiler, ExpressionContext, InheritanceOracle,
};
use classfile_assembler::text::{self, PrintOptions, Syntax};
use classfile_assembler::tree::{Insn, TryCatchBlock};

mod annotations;
mod compile_method;
mod disassemble;
mod parse;
mod pipeline;

// --- Test helpers ---

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(source: &str) -> Unit {
    init_logging();
    text::parse(source, Syntax::Keyword).unwrap()
}

fn compile(source: &str) -> CompiledMethod {
    compile_with(source, &CompileOptions::default(), Collaborators::default())
}

fn compile_with(
    source: &str,
    options: &CompileOptions,
    collaborators: Collaborators<'_>,
) -> CompiledMethod {
    let unit = parse(source);
    compile::compile_method(&unit, options, collaborators).unwrap()
}

fn compile_err(source: &str) -> compile::CompileError {
    let unit = parse(source);
    compile::compile_method(&unit, &CompileOptions::default(), Collaborators::default())
        .unwrap_err()
}

/// Instructions without labels, for comparisons that ignore label identity.
fn without_labels(insns: &[Insn]) -> Vec<Insn> {
    insns
        .iter()
        .filter(|insn| !insn.is_label())
        .cloned()
        .collect()
}

fn print(unit: &Unit, syntax: Syntax) -> String {
    text::print(unit, &PrintOptions::new(syntax))
}

// --- Collaborators ---

/// Knows that `a/Dog` and `a/Cat` are both `a/Animal`.
struct Zoo;

impl InheritanceOracle for Zoo {
    fn common_supertype(&self, a: &str, b: &str) -> String {
        if a == b {
            a.to_string()
        } else if a.starts_with("a/") && b.starts_with("a/") {
            "a/Animal".to_string()
        } else {
            "java/lang/Object".to_string()
        }
    }
}

struct NoClasses;

impl ClassSupplier for NoClasses {
    fn class_bytes(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Compiles any snippet to `label; iconst_0; pop; label`.
struct Snippets;

impl ExpressionCompiler for Snippets {
    fn compile(
        &self,
        snippet: &str,
        _context: &ExpressionContext<'_>,
    ) -> Result<(Vec<Insn>, Vec<TryCatchBlock>), BoxError> {
        if snippet.contains("fail") {
            return Err("snippet does not compile".into());
        }
        use classfile_assembler::opcode::Opcode;
        use classfile_assembler::tree::LabelId;
        Ok((
            vec![
                Insn::Label(LabelId(0)),
                Insn::Insn(Opcode::Iconst0),
                Insn::Insn(Opcode::Pop),
                Insn::Label(LabelId(1)),
            ],
            Vec::new(),
        ))
    }
}
