use crate::descriptor::JvmType;

use super::Handle;

/// A runtime annotation as stored on a class, field, method or record component.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationNode {
    /// Descriptor of the annotation type, `Lcom/example/Anno;`.
    pub desc: String,
    /// Element name and value pairs, in declaration order.
    pub values: Vec<(String, AnnotationValue)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Type(JvmType),
    Handle(Handle),
    /// Enum constant, as the pair (enum descriptor, constant name).
    Enum { desc: String, value: String },
    Annotation(AnnotationNode),
    Array(Vec<AnnotationValue>),
}

impl AnnotationNode {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            values: Vec::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}
