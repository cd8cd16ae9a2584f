use super::*;

use classfile_assembler::annotation;
use classfile_assembler::ast::{AnnoArg, Annotation, HandleInfo};
use classfile_assembler::descriptor::JvmType;
use classfile_assembler::disassemble::disassemble_field;
use classfile_assembler::opcode::HandleTag;
use classfile_assembler::tree::{AnnotationNode, AnnotationValue};

const MARKED_FIELD: &str = "VISIBLE_ANNOTATION a/Marker(\
    count=3, \
    ratio=0.5, \
    name=\"n\", \
    type=Ljava/lang/String;, \
    kinds=[enum(a/Kind FAST), enum(a/Kind SLOW)], \
    inner=annotation(a/Inner(deep=annotation(a/Deep(x=1L)))), \
    factory=handle(H_INVOKESTATIC a/F.make ()La/F;))\n\
    INVISIBLE_ANNOTATION a/Hidden()\n\
    marked I";

#[test]
fn test_text_to_tree() {
    let unit = parse(MARKED_FIELD);
    let field = compile::compile_field(&unit).unwrap();
    assert_eq!(field.visible_annotations.len(), 1);
    assert_eq!(field.invisible_annotations[0].desc, "La/Hidden;");

    let marker = &field.visible_annotations[0];
    assert_eq!(marker.desc, "La/Marker;");
    assert_eq!(marker.value("ratio"), Some(&AnnotationValue::Double(0.5)));
    assert_eq!(
        marker.value("type"),
        Some(&AnnotationValue::Type(JvmType::object("java/lang/String")))
    );
    assert_eq!(
        marker.value("kinds"),
        Some(&AnnotationValue::Array(vec![
            AnnotationValue::Enum {
                desc: "La/Kind;".into(),
                value: "FAST".into()
            },
            AnnotationValue::Enum {
                desc: "La/Kind;".into(),
                value: "SLOW".into()
            },
        ]))
    );
    match marker.value("inner") {
        Some(AnnotationValue::Annotation(inner)) => {
            assert_eq!(inner.desc, "La/Inner;");
            assert!(matches!(
                inner.value("deep"),
                Some(AnnotationValue::Annotation(deep)) if deep.value("x") == Some(&AnnotationValue::Long(1))
            ));
        }
        other => panic!("expected nested annotation, got {:?}", other),
    }
    assert!(matches!(
        marker.value("factory"),
        Some(AnnotationValue::Handle(h)) if h.owner == "a/F" && h.tag == HandleTag::InvokeStatic
    ));
}

#[test]
fn test_tree_to_text_and_back() {
    let field = compile::compile_field(&parse(MARKED_FIELD)).unwrap();
    for syntax in [Syntax::Keyword, Syntax::Directive] {
        let printed = print(&disassemble_field(&field), syntax);
        let reparsed = text::parse(&printed, syntax)
            .unwrap_or_else(|err| panic!("{}\n---\n{}", err, printed));
        assert_eq!(compile::compile_field(&reparsed).unwrap(), field, "{}", printed);
    }
}

#[test]
fn test_nested_annotations_take_outer_visibility() {
    let mut node = AnnotationNode::new("La/Outer;");
    node.values.push((
        "inner".into(),
        AnnotationValue::Annotation(AnnotationNode::new("La/Inner;")),
    ));
    let anno = annotation::from_low_level(&node, false);
    assert_eq!(anno.anno_type, "a/Outer");
    assert!(matches!(
        anno.arg("inner"),
        Some(AnnoArg::Annotation(inner)) if !inner.visible && inner.anno_type == "a/Inner"
    ));
}

#[test]
fn test_partition_and_merge() {
    let shown = Annotation::new(true, "a/Shown");
    let hidden = Annotation::new(false, "a/Hidden");
    let (visible, invisible) = annotation::partition([&hidden, &shown]);
    assert_eq!(visible[0].desc, "La/Shown;");
    assert_eq!(invisible[0].desc, "La/Hidden;");

    let merged = annotation::merge(&visible, &invisible);
    assert_eq!(merged, [shown, hidden]);
}

#[test]
fn test_handle_argument_codec() {
    let mut anno = Annotation::new(true, "a/H");
    anno.set_arg(
        "target",
        AnnoArg::Handle(HandleInfo::new(
            HandleTag::InvokeInterface,
            "a/Api",
            "call",
            "()V",
        )),
    );
    let node = annotation::to_low_level(&anno);
    match node.value("target") {
        Some(AnnotationValue::Handle(handle)) => assert!(handle.itf),
        other => panic!("expected handle, got {:?}", other),
    }
    assert_eq!(annotation::from_low_level(&node, true), anno);
}

#[test]
fn test_set_arg_replaces_in_place() {
    let mut anno = Annotation::new(true, "a/A");
    anno.set_arg("first", AnnoArg::Int(1));
    anno.set_arg("second", AnnoArg::Int(2));
    anno.set_arg("first", AnnoArg::Int(3));
    let names: Vec<_> = anno.args.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
    assert_eq!(anno.arg("first"), Some(&AnnoArg::Int(3)));
}

#[test]
fn test_bad_descriptor_in_annotation() {
    let err = text::parse("VISIBLE_ANNOTATION a/A(t=Qbad)\nf I", Syntax::Keyword).unwrap_err();
    assert_eq!(err.message, "Invalid descriptor: 'Qbad'");
}
