use super::*;

use classfile_assembler::ast::CodeEntry;
use classfile_assembler::AssemblerPipeline;

#[test]
fn test_method_generation() {
    init_logging();
    let mut pipeline = AssemblerPipeline::new(Syntax::Keyword);
    pipeline.set_self_type("a/Owner");
    pipeline.set_text("get()La/Owner;\nA:\nALOAD this\nARETURN\nB:");
    assert!(pipeline.update_ast().unwrap());
    assert!(pipeline.is_method());
    assert!(!pipeline.is_field());

    let compiled = pipeline.generate_method(Collaborators::default()).unwrap();
    assert_eq!(compiled.method.local_variables[0].desc, "La/Owner;");
    assert!(!pipeline.is_output_outdated());
    assert_eq!(
        pipeline.last_variables().and_then(|v| v.index_of("this")),
        Some(0)
    );
}

#[test]
fn test_output_is_cached_until_text_changes() {
    let mut pipeline = AssemblerPipeline::new(Syntax::Keyword);
    pipeline.set_text("static m()V\nRETURN");
    pipeline.update_ast().unwrap();
    pipeline.generate_method(Collaborators::default()).unwrap();
    assert!(!pipeline.is_output_outdated());

    pipeline.set_text("static m()V\nNOP\nRETURN");
    assert!(pipeline.is_dirty());
    assert!(pipeline.is_unit_outdated());
    pipeline.update_ast().unwrap();
    assert!(pipeline.is_output_outdated());
    let compiled = pipeline.generate_method(Collaborators::default()).unwrap();
    assert_eq!(compiled.method.instructions.len(), 2);
}

#[test]
fn test_field_generation() {
    let mut pipeline = AssemblerPipeline::new(Syntax::Directive);
    pipeline.set_text("field public static final ANSWER I 42");
    pipeline.update_ast().unwrap();
    assert!(pipeline.is_field());
    let field = pipeline.generate_field().unwrap();
    assert_eq!(field.name, "ANSWER");
    assert!(pipeline.last_field().is_some());
    assert!(pipeline.last_method().is_none());

    let err = pipeline
        .generate_method(Collaborators::default())
        .unwrap_err();
    assert_eq!(err.message(), "Unit does not define a method");
    assert!(pipeline.last_field().is_none());
}

#[test]
fn test_compile_error_clears_output() {
    let mut pipeline = AssemblerPipeline::new(Syntax::Keyword);
    pipeline.set_text("static m()V\nRETURN");
    pipeline.update_ast().unwrap();
    pipeline.generate_method(Collaborators::default()).unwrap();

    pipeline.set_text("static m()V\nGOTO NOWHERE");
    pipeline.update_ast().unwrap();
    let err = pipeline
        .generate_method(Collaborators::default())
        .unwrap_err();
    assert_eq!(err.position().line, 2);
    assert!(pipeline.last_method().is_none());
    assert!(pipeline.is_output_outdated());
}

#[test]
fn test_element_lookup_by_line() {
    let mut pipeline = AssemblerPipeline::new(Syntax::Keyword);
    pipeline.set_text("static m()V\nA:\nNOP\nRETURN");
    pipeline.update_ast().unwrap();
    assert!(matches!(pipeline.element_on_line(2), Some(CodeEntry::Label(_))));
    assert!(matches!(pipeline.element_on_line(4), Some(CodeEntry::Instruction(_))));
    assert!(pipeline.element_on_line(9).is_none());
}
