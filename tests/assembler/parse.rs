use super::*;

use classfile_assembler::ast::{AnnoArg, CodeEntry, ConstValue, Operation};
use classfile_assembler::descriptor::JvmType;
use classfile_assembler::opcode::{HandleTag, Opcode};
use classfile_assembler::types::AccessFlags;

// --- Definitions ---

#[test]
fn test_method_definition() {
    let unit = parse("public static varargs main([Ljava/lang/String; args)V\nRETURN");
    let method = unit.method().unwrap();
    assert_eq!(method.name, "main");
    assert_eq!(method.desc(), "([Ljava/lang/String;)V");
    assert_eq!(method.params[0].name, "args");
    assert!(method
        .modifiers
        .contains(AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::VARARGS));
}

#[test]
fn test_field_definition_with_value() {
    let unit = parse("VALUE 10L\nprivate static final LIMIT J");
    let field = unit.field().unwrap();
    assert_eq!(field.desc, "J");
    assert_eq!(
        field.const_val.as_ref().map(|c| &c.value),
        Some(&ConstValue::Long(10))
    );
}

#[test]
fn test_meta_before_definition() {
    let unit = parse(
        "SIGNATURE <T:Ljava/lang/Object;>()TT;\n\
         THROWS java/io/IOException\n\
         DEPRECATED\n\
         get()Ljava/lang/Object;\n\
         ACONST_NULL\n\
         ARETURN",
    );
    let meta = &unit.method().unwrap().meta;
    assert_eq!(
        meta.signature.as_ref().map(|s| s.value.as_str()),
        Some("<T:Ljava/lang/Object;>()TT;")
    );
    assert_eq!(meta.thrown[0].exception_type, "java/io/IOException");
    assert!(meta.deprecated);
}

#[test]
fn test_meta_after_definition_is_code() {
    let unit = parse("get()V\nTHROWS java/lang/Exception\nRETURN");
    assert!(unit.method().unwrap().meta.thrown.is_empty());
    assert_eq!(unit.code_or_empty().thrown_exceptions().count(), 1);
}

#[test]
fn test_inapplicable_modifier() {
    let err = text::parse("volatile run()V\nRETURN", Syntax::Keyword).unwrap_err();
    assert_eq!(err.message, "Modifier 'volatile' does not apply here");
}

#[test]
fn test_comments_are_kept() {
    let unit = parse("run()V\n// entry\nRETURN /* done */");
    let comments: Vec<_> = unit
        .code_or_empty()
        .entries()
        .iter()
        .filter_map(|e| match e {
            CodeEntry::Comment(c) => Some(c.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(comments, ["// entry", "/* done */"]);
}

// --- Instructions ---

#[test]
fn test_instruction_operands() {
    let unit = parse(
        "static run()V\n\
         GETSTATIC java/lang/System.out Ljava/io/PrintStream;\n\
         LDC \"hello\\n\"\n\
         INVOKEVIRTUAL java/io/PrintStream.println(Ljava/lang/String;)V\n\
         BIPUSH -5\n\
         NEWARRAY I\n\
         MULTIANEWARRAY [[I 2\n\
         RETURN",
    );
    let ops: Vec<_> = unit
        .code_or_empty()
        .instructions()
        .map(|i| i.operation.clone())
        .collect();
    assert_eq!(
        ops[0],
        Operation::Field {
            op: Opcode::Getstatic,
            owner: "java/lang/System".into(),
            name: "out".into(),
            desc: "Ljava/io/PrintStream;".into(),
        }
    );
    assert_eq!(
        ops[1],
        Operation::Ldc(classfile_assembler::ast::ArgValue::String("hello\n".into()))
    );
    assert!(matches!(&ops[2], Operation::Method { itf: false, name, .. } if name == "println"));
    assert_eq!(
        ops[3],
        Operation::Int {
            op: Opcode::Bipush,
            value: -5
        }
    );
    assert_eq!(ops[4], Operation::NewArray(JvmType::Int));
    assert!(matches!(&ops[5], Operation::MultiANewArray { dims: 2, desc } if desc == "[[I"));
}

#[test]
fn test_interface_suffix() {
    let unit = parse(
        "static run()V\n\
         INVOKESTATIC java/util/List.of()Ljava/util/List; itf\n\
         INVOKEINTERFACE java/util/List.size()I\n\
         RETURN",
    );
    let itfs: Vec<_> = unit
        .code_or_empty()
        .instructions()
        .filter_map(|i| match &i.operation {
            Operation::Method { itf, .. } => Some(*itf),
            _ => None,
        })
        .collect();
    assert_eq!(itfs, [true, true]);
}

#[test]
fn test_switches() {
    let unit = parse(
        "static run(I k)V\n\
         ILOAD k\n\
         TABLESWITCH range(0:1) offsets(A, B) default(C)\n\
         A:\n\
         ILOAD k\n\
         LOOKUPSWITCH mapping(5=B, 10=C) default(C)\n\
         B:\n\
         C:\n\
         RETURN",
    );
    let ops: Vec<_> = unit
        .code_or_empty()
        .instructions()
        .map(|i| i.operation.clone())
        .collect();
    assert!(matches!(
        &ops[1],
        Operation::TableSwitch { min: 0, max: 1, labels, default } if labels == &["A", "B"] && default == "C"
    ));
    match &ops[3] {
        Operation::LookupSwitch { entries, default } => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[1].key, 10);
            assert_eq!(default, "C");
        }
        other => panic!("expected lookupswitch, got {:?}", other),
    }
}

#[test]
fn test_invokedynamic() {
    let unit = parse(
        "static run()V\n\
         INVOKEDYNAMIC run ()Ljava/lang/Runnable; \
         handle(H_INVOKESTATIC java/lang/invoke/LambdaMetafactory.metafactory \
         (Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;) \
         args(()V, handle(H_INVOKESTATIC a/B.lambda$run$0 ()V), ()V)\n\
         POP\n\
         RETURN",
    );
    let insn = unit.code_or_empty().instructions().next().cloned().unwrap();
    match insn.operation {
        Operation::InvokeDynamic {
            name, bsm, args, ..
        } => {
            assert_eq!(name, "run");
            assert_eq!(bsm.tag, HandleTag::InvokeStatic);
            assert_eq!(bsm.owner, "java/lang/invoke/LambdaMetafactory");
            assert_eq!(args.len(), 3);
        }
        other => panic!("expected invokedynamic, got {:?}", other),
    }
}

#[test]
fn test_try_catch_and_line() {
    let unit = parse(
        "static run()V\n\
         TRY A B CATCH(*) C\n\
         A:\n\
         LINE A 12\n\
         NOP\n\
         B:\n\
         C:\n\
         RETURN",
    );
    let code = unit.code_or_empty();
    let tc = code.try_catches().next().unwrap();
    assert_eq!((tc.start.as_str(), tc.end.as_str(), tc.handler.as_str()), ("A", "B", "C"));
    assert_eq!(tc.exception_type, None);
    assert!(code.instructions().any(|i| i.operation
        == Operation::Line {
            label: "A".into(),
            line: 12
        }));
}

#[test]
fn test_literal_kinds() {
    let unit = parse(
        "static run()V\n\
         LDC 0xFF\n\
         LDC 1.5F\n\
         LDC 2.0\n\
         LDC 3L\n\
         LDC Ljava/lang/String;\n\
         RETURN",
    );
    use classfile_assembler::ast::ArgValue;
    let ldcs: Vec<_> = unit
        .code_or_empty()
        .instructions()
        .filter_map(|i| match &i.operation {
            Operation::Ldc(v) => Some(v.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        ldcs,
        [
            ArgValue::Int(255),
            ArgValue::Float(1.5),
            ArgValue::Double(2.0),
            ArgValue::Long(3),
            ArgValue::Type(JvmType::object("java/lang/String")),
        ]
    );
}

#[test]
fn test_positions_track_lines() {
    let unit = parse("static run()V\nNOP\n\nRETURN");
    let lines: Vec<_> = unit
        .code_or_empty()
        .instructions()
        .map(|i| i.position.line)
        .collect();
    assert_eq!(lines, [2, 4]);
}

// --- Annotations ---

#[test]
fn test_annotation_arguments() {
    let unit = parse(
        "VISIBLE_ANNOTATION a/Marker(count=3, tags=[\"x\", \"y\"], kind=enum(a/Kind FAST), inner=annotation(a/Inner()))\n\
         f I",
    );
    let anno = &unit.field().unwrap().meta.annotations[0];
    assert!(anno.visible);
    assert_eq!(anno.anno_type, "a/Marker");
    assert_eq!(anno.arg("count"), Some(&AnnoArg::Int(3)));
    assert_eq!(
        anno.arg("tags"),
        Some(&AnnoArg::List(vec![
            AnnoArg::String("x".into()),
            AnnoArg::String("y".into())
        ]))
    );
    assert_eq!(
        anno.arg("kind"),
        Some(&AnnoArg::Enum {
            enum_type: "a/Kind".into(),
            name: "FAST".into()
        })
    );
    assert!(matches!(anno.arg("inner"), Some(AnnoArg::Annotation(inner)) if inner.anno_type == "a/Inner"));
}

// --- Directive syntax ---

#[test]
fn test_directive_method() {
    let unit = text::parse(
        "method public run (I a)V\n\
           iload a\n\
           invokestatic java/util/List.of ()Ljava/util/List; itf\n\
           pop\n\
           return\n\
         end",
        Syntax::Directive,
    )
    .unwrap();
    let method = unit.method().unwrap();
    assert_eq!(method.desc(), "(I)V");
    assert_eq!(unit.code_or_empty().instructions().count(), 4);
}

#[test]
fn test_directive_field_value() {
    let unit =
        text::parse("field public static NAME Ljava/lang/String; \"x\"", Syntax::Directive)
            .unwrap();
    let field = unit.field().unwrap();
    assert_eq!(
        field.const_val.as_ref().map(|c| &c.value),
        Some(&ConstValue::String("x".into()))
    );
}

#[test]
fn test_directive_switches() {
    let unit = text::parse(
        "method static run (I k)V\n\
           iload k\n\
           lookupswitch case 1 A case 2 B default B\n\
         A:\n\
         B:\n\
           return\n\
         end",
        Syntax::Directive,
    )
    .unwrap();
    let op = unit
        .code_or_empty()
        .instructions()
        .nth(1)
        .map(|i| i.operation.clone());
    assert!(matches!(op, Some(Operation::LookupSwitch { entries, .. }) if entries.len() == 2));
}

#[test]
fn test_directive_unmatched_text_coalesces() {
    let unit = text::parse(
        "method static m ()V\n@@@ garbage1 @@@ garbage2\nend",
        Syntax::Directive,
    )
    .unwrap();
    let unmatched: Vec<_> = unit.code_or_empty().unmatched().cloned().collect();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].text, "@@@ garbage1 @@@ garbage2");
}

#[test]
fn test_directive_label_splits_unmatched_text() {
    let unit = text::parse(
        "method static m ()V\n@@@ garbage1\nA:\n@@@ garbage2\nend",
        Syntax::Directive,
    )
    .unwrap();
    assert_eq!(unit.code_or_empty().unmatched().count(), 2);
    assert_eq!(unit.code_or_empty().label_names(), ["A"]);
}
