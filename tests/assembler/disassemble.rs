use super::*;

use classfile_assembler::ast::{AnnoArg, CodeEntry, ConstValue, Operation};
use classfile_assembler::disassemble::{
    disassemble_class, disassemble_field, disassemble_method, DisassembleOptions,
    MethodDisassembler,
};
use classfile_assembler::opcode::Opcode;
use classfile_assembler::tree::{
    AnnotationNode, AnnotationValue, ClassNode, Constant, FieldNode, LabelId, LocalVariable,
    MethodNode,
};
use classfile_assembler::types::AccessFlags;

fn var_names(unit: &Unit) -> Vec<String> {
    unit.code_or_empty()
        .instructions()
        .filter_map(|i| match &i.operation {
            Operation::Var { name, .. } | Operation::Iinc { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn sum_method() -> MethodNode {
    let mut method = MethodNode::new(AccessFlags::PUBLIC | AccessFlags::STATIC, "sum", "(I)I");
    method.instructions = vec![
        Insn::Var {
            op: Opcode::Iload,
            var: 0,
        },
        Insn::Var {
            op: Opcode::Istore,
            var: 1,
        },
        Insn::Iinc { var: 1, incr: 2 },
        Insn::Var {
            op: Opcode::Iload,
            var: 1,
        },
        Insn::Insn(Opcode::Ireturn),
    ];
    method
}

// --- Naming ---

#[test]
fn test_names_without_debug_info() {
    init_logging();
    let unit = disassemble_method(&sum_method(), &DisassembleOptions::default()).unwrap();
    let method = unit.method().unwrap();
    assert_eq!(method.params[0].name, "i0");
    assert_eq!(var_names(&unit), ["i0", "i1", "i1", "i1"]);
}

#[test]
fn test_naming_is_deterministic() {
    let method = sum_method();
    let options = DisassembleOptions::default();
    let first = disassemble_method(&method, &options).unwrap();
    let second = disassemble_method(&method, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_this_in_instance_methods() {
    let mut method = MethodNode::new(AccessFlags::PUBLIC, "self", "()Ljava/lang/Object;");
    method.instructions = vec![
        Insn::Var {
            op: Opcode::Aload,
            var: 0,
        },
        Insn::Insn(Opcode::Areturn),
    ];
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    assert_eq!(var_names(&unit), ["this"]);
}

#[test]
fn test_debug_names_are_used() {
    let mut method = MethodNode::new(AccessFlags::STATIC, "count", "()V");
    method.instructions = vec![
        Insn::Insn(Opcode::Iconst0),
        Insn::Var {
            op: Opcode::Istore,
            var: 0,
        },
        Insn::Label(LabelId(0)),
        Insn::Var {
            op: Opcode::Iload,
            var: 0,
        },
        Insn::Insn(Opcode::Pop),
        Insn::Insn(Opcode::Return),
        Insn::Label(LabelId(1)),
    ];
    method.local_variables = vec![LocalVariable {
        name: "counter".into(),
        desc: "I".into(),
        signature: None,
        start: LabelId(0),
        end: LabelId(1),
        index: 0,
    }];
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    assert_eq!(var_names(&unit), ["counter", "counter"]);
}

#[test]
fn test_unusable_debug_names_are_replaced() {
    let mut method = MethodNode::new(AccessFlags::STATIC, "m", "(Ljava/lang/String;)V");
    method.instructions = vec![
        Insn::Label(LabelId(0)),
        Insn::Var {
            op: Opcode::Aload,
            var: 0,
        },
        Insn::Insn(Opcode::Pop),
        Insn::Insn(Opcode::Return),
        Insn::Label(LabelId(1)),
    ];
    method.local_variables = vec![LocalVariable {
        name: "has space".into(),
        desc: "Ljava/lang/String;".into(),
        signature: None,
        start: LabelId(0),
        end: LabelId(1),
        index: 0,
    }];
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    assert_eq!(unit.method().unwrap().params[0].name, "string0");
}

#[test]
fn test_prepopulated_names_survive() {
    let options = CompileOptions {
        emit_local_variables: false,
        ..CompileOptions::default()
    };
    let compiled = compile_with(
        "static m(I limit)I\nILOAD limit\nISTORE copy\nILOAD copy\nIRETURN",
        &options,
        Collaborators::default(),
    );
    assert!(compiled.method.local_variables.is_empty());

    let disassemble_options = DisassembleOptions::default();
    let unit = MethodDisassembler::new(&compiled.method, &disassemble_options)
        .prepopulate(&compiled.variables)
        .disassemble()
        .unwrap();
    assert_eq!(unit.method().unwrap().params[0].name, "limit");
    assert_eq!(var_names(&unit), ["limit", "copy", "copy"]);
}

// --- Structure ---

#[test]
fn test_labels_and_try_catch() {
    let mut method = MethodNode::new(AccessFlags::STATIC, "m", "()V");
    method.instructions = vec![
        Insn::Label(LabelId(10)),
        Insn::Insn(Opcode::Nop),
        Insn::Label(LabelId(11)),
        Insn::Insn(Opcode::Return),
        Insn::Label(LabelId(12)),
        Insn::Insn(Opcode::Pop),
        Insn::Insn(Opcode::Return),
    ];
    method.try_catch_blocks = vec![classfile_assembler::tree::TryCatchBlock {
        start: LabelId(10),
        end: LabelId(11),
        handler: LabelId(12),
        exception_type: None,
    }];
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    let code = unit.code_or_empty();
    assert_eq!(code.label_names(), ["A", "B", "C", "D"]);
    let tc = code.try_catches().next().unwrap();
    assert_eq!((tc.start.as_str(), tc.end.as_str(), tc.handler.as_str()), ("A", "B", "C"));
    assert!(matches!(code.entries()[0], CodeEntry::TryCatch(_)));
}

#[test]
fn test_empty_method_has_no_labels() {
    let method = MethodNode::new(AccessFlags::ABSTRACT | AccessFlags::PUBLIC, "run", "()V");
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    assert!(unit.code_or_empty().is_empty());
}

#[test]
fn test_meta_is_carried() {
    let mut method = MethodNode::new(AccessFlags::STATIC | AccessFlags::DEPRECATED, "m", "()V");
    method.signature = Some("<T:Ljava/lang/Object;>()V".into());
    method.exceptions = vec!["java/io/IOException".into()];
    method.invisible_annotations = vec![AnnotationNode::new("La/Internal;")];
    method.instructions = vec![Insn::Insn(Opcode::Return)];
    let unit = disassemble_method(&method, &DisassembleOptions::default()).unwrap();
    let meta = &unit.method().unwrap().meta;
    assert!(meta.deprecated);
    assert!(meta.signature.is_some());
    assert_eq!(meta.thrown[0].exception_type, "java/io/IOException");
    assert_eq!(meta.annotations[0].anno_type, "a/Internal");
    assert!(!meta.annotations[0].visible);
    assert!(!unit.method().unwrap().modifiers.contains(AccessFlags::DEPRECATED));
}

#[test]
fn test_field() {
    let mut field = FieldNode::new(
        AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
        "NAME",
        "Ljava/lang/String;",
    );
    field.value = Some(Constant::String("n".into()));
    let mut anno = AnnotationNode::new("La/Tag;");
    anno.values.push(("value".into(), AnnotationValue::Int(4)));
    field.visible_annotations.push(anno);

    let unit = disassemble_field(&field);
    let definition = unit.field().unwrap();
    assert_eq!(
        definition.const_val.as_ref().map(|c| &c.value),
        Some(&ConstValue::String("n".into()))
    );
    let anno = &definition.meta.annotations[0];
    assert_eq!(anno.anno_type, "a/Tag");
    assert_eq!(anno.arg("value"), Some(&AnnoArg::Int(4)));
}

#[test]
fn test_class() {
    let class = ClassNode {
        version: 61,
        access: AccessFlags::PUBLIC | AccessFlags::SUPER,
        name: "a/Thing".into(),
        super_name: Some("java/lang/Object".into()),
        fields: vec![FieldNode::new(AccessFlags::PRIVATE, "size", "I")],
        methods: vec![sum_method()],
        ..ClassNode::default()
    };
    let unit = disassemble_class(&class, &DisassembleOptions::default()).unwrap();
    let definition = unit.class().unwrap();
    assert_eq!(definition.name, "a/Thing");
    assert_eq!(definition.fields[0].name, "size");
    assert_eq!(definition.methods[0].definition.name, "sum");
    assert_eq!(definition.methods[0].code.instructions().count(), 5);

    let listing = print(&unit, Syntax::Keyword);
    assert!(listing.starts_with("// public super class a/Thing extends java/lang/Object"));
    assert!(listing.contains("public static sum(I i0)I"));
}
