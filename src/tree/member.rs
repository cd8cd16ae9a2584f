use crate::types::AccessFlags;

use super::{AnnotationNode, Constant, Insn, LabelId};

#[derive(Clone, Debug, PartialEq)]
pub struct TryCatchBlock {
    pub start: LabelId,
    pub end: LabelId,
    pub handler: LabelId,
    /// `None` catches everything (`finally` blocks).
    pub exception_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalVariable {
    pub name: String,
    pub desc: String,
    pub signature: Option<String>,
    pub start: LabelId,
    pub end: LabelId,
    pub index: u16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodNode {
    pub access: AccessFlags,
    pub name: String,
    pub desc: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
    pub instructions: Vec<Insn>,
    pub try_catch_blocks: Vec<TryCatchBlock>,
    pub local_variables: Vec<LocalVariable>,
    pub max_stack: u16,
    pub max_locals: u16,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
}

impl MethodNode {
    pub fn new(access: AccessFlags, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            desc: desc.into(),
            ..Default::default()
        }
    }

    /// Position of a label within the instruction list.
    pub fn label_position(&self, label: LabelId) -> Option<usize> {
        self.instructions
            .iter()
            .position(|insn| matches!(insn, Insn::Label(id) if *id == label))
    }

    /// A label id not used anywhere in this method yet.
    pub fn fresh_label(&self) -> LabelId {
        let mut max = None;
        for insn in &self.instructions {
            if let Insn::Label(id) = insn {
                max = max.max(Some(id.0));
            }
            for id in insn.label_refs() {
                max = max.max(Some(id.0));
            }
        }
        LabelId(max.map_or(0, |m| m + 1))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldNode {
    pub access: AccessFlags,
    pub name: String,
    pub desc: String,
    pub signature: Option<String>,
    /// `ConstantValue` attribute, only int, float, long, double and string are legal.
    pub value: Option<Constant>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
}

impl FieldNode {
    pub fn new(access: AccessFlags, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            desc: desc.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InnerClassNode {
    pub name: String,
    pub outer_name: Option<String>,
    pub inner_name: Option<String>,
    pub access: AccessFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleRequireNode {
    pub module: String,
    pub access: AccessFlags,
    pub version: Option<String>,
}

/// Shared shape of `exports` and `opens` directives.
#[derive(Clone, Debug, PartialEq)]
pub struct ModulePackageNode {
    pub package: String,
    pub access: AccessFlags,
    pub modules: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleProvideNode {
    pub service: String,
    pub providers: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleNode {
    pub name: String,
    pub access: AccessFlags,
    pub version: Option<String>,
    pub main_class: Option<String>,
    pub packages: Vec<String>,
    pub requires: Vec<ModuleRequireNode>,
    pub exports: Vec<ModulePackageNode>,
    pub opens: Vec<ModulePackageNode>,
    pub uses: Vec<String>,
    pub provides: Vec<ModuleProvideNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordComponentNode {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassNode {
    pub version: u32,
    pub access: AccessFlags,
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub source_file: Option<String>,
    pub inner_classes: Vec<InnerClassNode>,
    pub nest_host: Option<String>,
    pub nest_members: Vec<String>,
    pub permitted_subclasses: Vec<String>,
    pub module: Option<ModuleNode>,
    /// `None` unless the class is a record.
    pub record_components: Option<Vec<RecordComponentNode>>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
}
