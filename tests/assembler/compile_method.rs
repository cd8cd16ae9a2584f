use super::*;

use classfile_assembler::ast::CodeEntry;
use classfile_assembler::compile::{CompileError, VariableRange};
use classfile_assembler::opcode::Opcode;
use classfile_assembler::tree::{Constant, LabelId};
use classfile_assembler::types::AccessFlags;

// --- Basic lowering ---

#[test]
fn test_static_constant_method() {
    let compiled = compile("public static one()I\nICONST_1\nIRETURN");
    let method = &compiled.method;
    assert_eq!(
        method.instructions,
        [Insn::Insn(Opcode::Iconst1), Insn::Insn(Opcode::Ireturn)]
    );
    assert!(method.local_variables.is_empty());
    assert!(method.try_catch_blocks.is_empty());
    assert_eq!(method.max_locals, 0);
    assert_eq!(method.desc, "()I");
    assert!(method.access.contains(AccessFlags::PUBLIC | AccessFlags::STATIC));
}

#[test]
fn test_variables_and_local_table() {
    let options = CompileOptions::for_class("a/Counter");
    let compiled = compile_with(
        "add(I amount)I\n\
         A:\n\
         ILOAD amount\n\
         ISTORE total\n\
         ILOAD total\n\
         IRETURN\n\
         B:",
        &options,
        Collaborators::default(),
    );
    let method = &compiled.method;
    assert_eq!(method.max_locals, 3);
    assert_eq!(
        method.instructions[1],
        Insn::Var {
            op: Opcode::Iload,
            var: 1
        }
    );
    assert_eq!(
        method.instructions[2],
        Insn::Var {
            op: Opcode::Istore,
            var: 2
        }
    );

    let table = &method.local_variables;
    assert_eq!(table.len(), 3);
    let this = table.iter().find(|lv| lv.index == 0).unwrap();
    assert_eq!(this.name, "this");
    assert_eq!(this.desc, "La/Counter;");
    assert_eq!((this.start, this.end), (LabelId(0), LabelId(1)));
    let total = table.iter().find(|lv| lv.name == "total").unwrap();
    assert_eq!(total.desc, "I");
}

#[test]
fn test_wide_parameters_take_two_slots() {
    let compiled = compile(
        "static m(J big, I small)V\nA:\nLLOAD big\nPOP2\nILOAD small\nPOP\nRETURN\nB:",
    );
    assert_eq!(compiled.variables.index_of("small"), Some(2));
    assert_eq!(compiled.method.max_locals, 3);
}

#[test]
fn test_option_disables_local_table() {
    let options = CompileOptions {
        emit_local_variables: false,
        ..CompileOptions::default()
    };
    let compiled = compile_with(
        "static m(I a)I\nA:\nILOAD a\nIRETURN\nB:",
        &options,
        Collaborators::default(),
    );
    assert!(compiled.method.local_variables.is_empty());
}

#[test]
fn test_nearest_labels_range() {
    let options = CompileOptions {
        variable_range: VariableRange::NearestLabels,
        ..CompileOptions::default()
    };
    let compiled = compile_with(
        "static m()V\n\
         A:\n\
         NOP\n\
         B:\n\
         ICONST_0\n\
         ISTORE x\n\
         C:\n\
         RETURN\n\
         D:",
        &options,
        Collaborators::default(),
    );
    let x = &compiled.method.local_variables[0];
    assert_eq!(x.name, "x");
    assert_eq!((x.start, x.end), (LabelId(1), LabelId(2)));
}

#[test]
fn test_nearest_labels_without_labels() {
    let options = CompileOptions {
        variable_range: VariableRange::NearestLabels,
        ..CompileOptions::default()
    };
    let unit = parse("static m(I a)I\nILOAD a\nIRETURN");
    let err = compile::compile_method(&unit, &options, Collaborators::default()).unwrap_err();
    assert!(matches!(err, CompileError::Structural { .. }));
}

#[test]
fn test_nearest_labels_need_a_label_before_first_use() {
    let options = CompileOptions {
        variable_range: VariableRange::NearestLabels,
        ..CompileOptions::default()
    };
    let unit = parse("static m()V\nICONST_0\nISTORE x\nA:\nILOAD x\nPOP\nRETURN\nB:");
    let err = compile::compile_method(&unit, &options, Collaborators::default()).unwrap_err();
    assert!(matches!(err, CompileError::Structural { .. }));
    assert_eq!(err.message(), "Failed to find start label for variable: x");
    assert_eq!(err.position().line, 3);
}

#[test]
fn test_nearest_labels_need_a_label_after_last_use() {
    let options = CompileOptions {
        variable_range: VariableRange::NearestLabels,
        ..CompileOptions::default()
    };
    let unit = parse("static m()V\nA:\nICONST_0\nISTORE x\nILOAD x\nPOP\nRETURN");
    let err = compile::compile_method(&unit, &options, Collaborators::default()).unwrap_err();
    assert_eq!(err.message(), "Failed to find end label for variable: x");
    assert_eq!(err.position().line, 5);
}

#[test]
fn test_nearest_labels_keep_parameters_whole() {
    let options = CompileOptions {
        variable_range: VariableRange::NearestLabels,
        ..CompileOptions::default()
    };
    let compiled = compile_with(
        "static m(I a)I\nNOP\nB:\nILOAD a\nIRETURN\nC:",
        &options,
        Collaborators::default(),
    );
    let a = &compiled.method.local_variables[0];
    assert_eq!((a.start, a.end), (LabelId(0), LabelId(1)));
}

#[test]
fn test_try_catch_and_exceptions() {
    let compiled = compile(
        "THROWS java/io/IOException\n\
         static m()V\n\
         THROWS java/lang/InterruptedException\n\
         TRY A B CATCH(java/lang/Exception) C\n\
         A:\n\
         NOP\n\
         B:\n\
         RETURN\n\
         C:\n\
         POP\n\
         RETURN",
    );
    let method = &compiled.method;
    assert_eq!(
        method.exceptions,
        ["java/io/IOException", "java/lang/InterruptedException"]
    );
    let block = &method.try_catch_blocks[0];
    assert_eq!(
        (block.start, block.end, block.handler),
        (LabelId(0), LabelId(1), LabelId(2))
    );
    assert_eq!(block.exception_type.as_deref(), Some("java/lang/Exception"));
}

#[test]
fn test_constants_and_switch() {
    let compiled = compile(
        "static m(I k)V\n\
         ILOAD k\n\
         TABLESWITCH range(1:2) offsets(A, B) default(B)\n\
         A:\n\
         LDC 5L\n\
         POP2\n\
         B:\n\
         RETURN",
    );
    let insns = without_labels(&compiled.method.instructions);
    assert_eq!(
        insns[1],
        Insn::TableSwitch {
            min: 1,
            max: 2,
            dflt: LabelId(1),
            labels: vec![LabelId(0), LabelId(1)],
        }
    );
    assert_eq!(insns[2], Insn::Ldc(Constant::Long(5)));
}

#[test]
fn test_deprecated_sets_flag() {
    let compiled = compile("DEPRECATED\nstatic m()V\nRETURN");
    assert!(compiled.method.access.contains(AccessFlags::DEPRECATED));
}

#[test]
fn test_source_mapping() {
    let compiled = compile("static m()V\nNOP\n// gap\nRETURN");
    assert_eq!(compiled.line_of(0), Some(2));
    assert_eq!(compiled.line_of(1), Some(4));
    assert!(matches!(compiled.source_of(1), Some(CodeEntry::Instruction(_))));
    assert_eq!(compiled.line_of(2), None);
}

// --- Errors ---

#[test]
fn test_reserved_wide_slot() {
    let err = compile_err(
        "static m()V\n\
         ICONST_0\n\
         ISTORE a\n\
         ICONST_0\n\
         ISTORE b\n\
         LCONST_0\n\
         LSTORE a\n\
         ILOAD b\n\
         RETURN",
    );
    assert!(matches!(err, CompileError::WideSlot { .. }));
    assert_eq!(err.message(), "Illegal usage of reserved wide slot!");
    assert_eq!(err.position().line, 8);
}

#[test]
fn test_narrow_store_releases_wide_slot() {
    let compiled = compile(
        "static m()V\n\
         LCONST_0\n\
         LSTORE a\n\
         ICONST_0\n\
         ISTORE a\n\
         ICONST_0\n\
         ISTORE b\n\
         RETURN",
    );
    assert_eq!(compiled.variables.index_of("b"), Some(2));
}

#[test]
fn test_missing_label() {
    let err = compile_err("static m()V\nGOTO X\nRETURN");
    assert_eq!(err.message(), "No identifier mapping to label instance for 'X'");
    assert!(matches!(err, CompileError::Resolution { .. }));
}

#[test]
fn test_duplicate_label() {
    let err = compile_err("static m()V\nA:\nNOP\nA:\nRETURN");
    assert_eq!(err.message(), "Label 'A' is declared more than once");
}

#[test]
fn test_incompatible_load() {
    let err = compile_err("static m()V\nFCONST_0\nFSTORE f\nILOAD f\nPOP\nRETURN");
    assert!(matches!(err, CompileError::TypeConsistency { .. }));
    assert!(err.message().starts_with("Incompatible variable type usage [0:f]"));
}

#[test]
fn test_slot_retyped_by_store() {
    let compiled = compile(
        "static m()V\n\
         ICONST_0\n\
         ISTORE v\n\
         ACONST_NULL\n\
         ASTORE v\n\
         ALOAD v\n\
         POP\n\
         RETURN",
    );
    assert_eq!(compiled.variables.index_of("v"), Some(0));
    assert_eq!(compiled.method.max_locals, 1);
}

#[test]
fn test_numeric_names_are_slots() {
    let compiled = compile(
        "static m()V\n\
         ICONST_0\n\
         ISTORE count\n\
         ACONST_NULL\n\
         ASTORE 0\n\
         ICONST_1\n\
         ISTORE 3\n\
         RETURN",
    );
    let insns = without_labels(&compiled.method.instructions);
    assert_eq!(
        insns[3],
        Insn::Var {
            op: Opcode::Astore,
            var: 0
        }
    );
    assert_eq!(
        insns[5],
        Insn::Var {
            op: Opcode::Istore,
            var: 3
        }
    );
    assert_eq!(compiled.method.max_locals, 4);
}

#[test]
fn test_int_family_is_compatible() {
    let compiled = compile("static m(S s, Z flag)I\nILOAD s\nILOAD flag\nIADD\nIRETURN");
    assert_eq!(compiled.method.instructions.len(), 4);
}

#[test]
fn test_iinc_on_float() {
    let err = compile_err("static m(F f)V\nIINC f 1\nRETURN");
    assert_eq!(err.message(), "Tried to update 'int' at 'f', but type was: F");
}

#[test]
fn test_code_presence() {
    let err = compile_err("static m()V");
    assert_eq!(err.message(), "Method 'm' must have code");

    let err = compile_err("abstract m()V\nRETURN");
    assert_eq!(err.message(), "Method 'm' is abstract or native and cannot have code");

    let compiled = compile("public abstract m()V");
    assert!(compiled.method.instructions.is_empty());
    assert!(compiled.method.local_variables.is_empty());
}

#[test]
fn test_bad_parameter_descriptor() {
    let err = compile_err("static m(Q p)V\nRETURN");
    assert_eq!(err.message(), "Illegal parameter descriptor for 'p': Q");
}

#[test]
fn test_field_unit_is_not_a_method() {
    let err = compile_err("f I");
    assert_eq!(err.message(), "Unit does not define a method");
}

// --- Expressions ---

#[test]
fn test_expression_needs_class_supplier() {
    let err = compile_err("static m()V\nEXPR System.out.println(); END\nRETURN");
    assert_eq!(
        err.message(),
        "Expression not supported, translator not given class supplier!"
    );
}

#[test]
fn test_expression_needs_compiler() {
    let unit = parse("static m()V\nEXPR x(); END\nRETURN");
    let collaborators = Collaborators {
        classes: Some(&NoClasses),
        ..Collaborators::default()
    };
    let err = compile::compile_method(&unit, &CompileOptions::default(), collaborators)
        .unwrap_err();
    assert_eq!(err.message(), "Expression not supported, no expression compiler given!");
}

#[test]
fn test_expression_fragment_is_spliced() {
    let collaborators = Collaborators {
        classes: Some(&NoClasses),
        expressions: Some(&Snippets),
        ..Collaborators::default()
    };
    let compiled = compile_with(
        "static m()V\nA:\nEXPR int x = 0; END\nRETURN\nB:",
        &CompileOptions::default(),
        collaborators,
    );
    assert_eq!(
        compiled.method.instructions,
        [
            Insn::Label(LabelId(0)),
            Insn::Label(LabelId(2)),
            Insn::Insn(Opcode::Iconst0),
            Insn::Insn(Opcode::Pop),
            Insn::Label(LabelId(3)),
            Insn::Insn(Opcode::Return),
            Insn::Label(LabelId(1)),
        ]
    );
    assert!(matches!(compiled.source_of(2), Some(CodeEntry::Expression(_))));
}

#[test]
fn test_expression_failure() {
    let unit = parse("static m()V\nEXPR fail(); END\nRETURN");
    let collaborators = Collaborators {
        classes: Some(&NoClasses),
        expressions: Some(&Snippets),
        ..Collaborators::default()
    };
    let err = compile::compile_method(&unit, &CompileOptions::default(), collaborators)
        .unwrap_err();
    assert!(matches!(err, CompileError::Expression { .. }));
    assert_eq!(err.position().line, 2);
}

#[test]
fn test_oracle_is_accepted() {
    let collaborators = Collaborators {
        oracle: Some(&Zoo),
        ..Collaborators::default()
    };
    let compiled = compile_with(
        "static m(La/Dog; dog)V\nA:\nALOAD dog\nPOP\nRETURN\nB:",
        &CompileOptions::default(),
        collaborators,
    );
    assert_eq!(compiled.method.local_variables[0].desc, "La/Dog;");
}

// --- Fields ---

#[test]
fn test_compile_field() {
    let unit = parse(
        "DEPRECATED\n\
         INVISIBLE_ANNOTATION a/Note(text=\"n\")\n\
         VALUE 7\n\
         public static final SEVEN I",
    );
    let field = compile::compile_field(&unit).unwrap();
    assert_eq!(field.value, Some(Constant::Int(7)));
    assert!(field.access.contains(AccessFlags::DEPRECATED | AccessFlags::FINAL));
    assert_eq!(field.invisible_annotations.len(), 1);
    assert_eq!(field.invisible_annotations[0].desc, "La/Note;");
    assert!(field.visible_annotations.is_empty());
}

#[test]
fn test_compile_field_rejects_method() {
    let unit = parse("static m()V\nRETURN");
    let err = compile::compile_field(&unit).unwrap_err();
    assert_eq!(err.message(), "Unit does not define a field");
}
