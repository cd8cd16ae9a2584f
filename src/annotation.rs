//! Conversion between AST annotations and their tree form.
//!
//! The AST names annotation and enum types by internal name, the tree by
//! descriptor. Everything else maps one to one.

use crate::ast::{AnnoArg, Annotation, HandleInfo, Position};
use crate::tree::{AnnotationNode, AnnotationValue};

pub fn to_low_level(annotation: &Annotation) -> AnnotationNode {
    AnnotationNode {
        desc: to_desc(&annotation.anno_type),
        values: annotation
            .args
            .iter()
            .map(|(name, arg)| (name.clone(), arg_to_value(arg)))
            .collect(),
    }
}

pub fn from_low_level(node: &AnnotationNode, visible: bool) -> Annotation {
    Annotation {
        visible,
        anno_type: from_desc(&node.desc).to_string(),
        args: node
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value_to_arg(value, visible)))
            .collect(),
        position: Position::default(),
    }
}

/// Splits annotations into the visible and invisible tree lists.
pub fn partition<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
) -> (Vec<AnnotationNode>, Vec<AnnotationNode>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for annotation in annotations {
        if annotation.visible {
            visible.push(to_low_level(annotation));
        } else {
            invisible.push(to_low_level(annotation));
        }
    }
    (visible, invisible)
}

/// Inverse of [`partition`], visible annotations first.
pub fn merge(visible: &[AnnotationNode], invisible: &[AnnotationNode]) -> Vec<Annotation> {
    visible
        .iter()
        .map(|node| from_low_level(node, true))
        .chain(invisible.iter().map(|node| from_low_level(node, false)))
        .collect()
}

fn arg_to_value(arg: &AnnoArg) -> AnnotationValue {
    match arg {
        AnnoArg::Int(v) => AnnotationValue::Int(*v),
        AnnoArg::Long(v) => AnnotationValue::Long(*v),
        AnnoArg::Float(v) => AnnotationValue::Float(*v),
        AnnoArg::Double(v) => AnnotationValue::Double(*v),
        AnnoArg::String(v) => AnnotationValue::String(v.clone()),
        AnnoArg::Type(t) => AnnotationValue::Type(t.clone()),
        AnnoArg::Handle(h) => AnnotationValue::Handle(h.to_handle()),
        AnnoArg::Annotation(nested) => AnnotationValue::Annotation(to_low_level(nested)),
        AnnoArg::List(items) => AnnotationValue::Array(items.iter().map(arg_to_value).collect()),
        AnnoArg::Enum { enum_type, name } => AnnotationValue::Enum {
            desc: to_desc(enum_type),
            value: name.clone(),
        },
    }
}

fn value_to_arg(value: &AnnotationValue, visible: bool) -> AnnoArg {
    match value {
        AnnotationValue::Int(v) => AnnoArg::Int(*v),
        AnnotationValue::Long(v) => AnnoArg::Long(*v),
        AnnotationValue::Float(v) => AnnoArg::Float(*v),
        AnnotationValue::Double(v) => AnnoArg::Double(*v),
        AnnotationValue::String(v) => AnnoArg::String(v.clone()),
        AnnotationValue::Type(t) => AnnoArg::Type(t.clone()),
        AnnotationValue::Handle(h) => AnnoArg::Handle(HandleInfo::from_handle(h)),
        AnnotationValue::Annotation(nested) => {
            AnnoArg::Annotation(from_low_level(nested, visible))
        }
        AnnotationValue::Array(items) => {
            AnnoArg::List(items.iter().map(|v| value_to_arg(v, visible)).collect())
        }
        AnnotationValue::Enum { desc, value } => AnnoArg::Enum {
            enum_type: from_desc(desc).to_string(),
            name: value.clone(),
        },
    }
}

fn to_desc(internal: &str) -> String {
    format!("L{};", internal)
}

fn from_desc(desc: &str) -> &str {
    desc.strip_prefix('L')
        .and_then(|d| d.strip_suffix(';'))
        .unwrap_or(desc)
}
