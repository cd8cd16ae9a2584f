use crate::descriptor;
use crate::tree::ModuleNode;
use crate::types::AccessFlags;

use super::{Annotation, Code, Position, Signature, ThrownException};

#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Class(ClassDefinition),
    Field(FieldDefinition),
    Method(MethodDefinition),
}

/// Attributes any definition may carry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefinitionMeta {
    pub signature: Option<Signature>,
    pub thrown: Vec<ThrownException>,
    pub annotations: Vec<Annotation>,
    pub deprecated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodParameter {
    pub desc: String,
    pub name: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefinition {
    pub modifiers: AccessFlags,
    pub name: String,
    pub params: Vec<MethodParameter>,
    pub return_type: String,
    pub meta: DefinitionMeta,
    pub position: Position,
}

/// Constant value of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstVal {
    pub value: ConstValue,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub modifiers: AccessFlags,
    pub name: String,
    pub desc: String,
    pub const_val: Option<ConstVal>,
    pub meta: DefinitionMeta,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InnerClass {
    pub modifiers: AccessFlags,
    pub name: String,
    pub outer_name: Option<String>,
    pub inner_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordComponent {
    pub name: String,
    pub desc: String,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
}

/// A method of a disassembled class, with its body.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassMethod {
    pub definition: MethodDefinition,
    pub code: Code,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassDefinition {
    pub modifiers: AccessFlags,
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub version: u32,
    pub source_file: Option<String>,
    pub inner_classes: Vec<InnerClass>,
    pub nest_host: Option<String>,
    pub nest_members: Vec<String>,
    pub permitted_subclasses: Vec<String>,
    pub module: Option<ModuleNode>,
    pub record: Option<Vec<RecordComponent>>,
    pub fields: Vec<FieldDefinition>,
    pub methods: Vec<ClassMethod>,
    pub meta: DefinitionMeta,
    pub position: Position,
}

impl MethodDefinition {
    pub fn new(
        modifiers: AccessFlags,
        name: impl Into<String>,
        params: Vec<MethodParameter>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            modifiers,
            name: name.into(),
            params,
            return_type: return_type.into(),
            meta: DefinitionMeta::default(),
            position: Position::default(),
        }
    }

    /// The method descriptor assembled from the parameter list.
    pub fn desc(&self) -> String {
        let mut desc = String::from("(");
        for param in &self.params {
            desc.push_str(&param.desc);
        }
        desc.push(')');
        desc.push_str(&self.return_type);
        desc
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    /// Whether the method must have a body.
    pub fn has_code(&self) -> bool {
        !(self.modifiers.is_abstract() || self.modifiers.is_native())
    }
}

impl MethodParameter {
    pub fn new(desc: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            name: name.into(),
            position: Position::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        descriptor::parse_field_descriptor(&self.desc).is_some()
    }
}

impl FieldDefinition {
    pub fn new(modifiers: AccessFlags, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            modifiers,
            name: name.into(),
            desc: desc.into(),
            const_val: None,
            meta: DefinitionMeta::default(),
            position: Position::default(),
        }
    }
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Class(class) => &class.name,
            Definition::Field(field) => &field.name,
            Definition::Method(method) => &method.name,
        }
    }

    pub fn modifiers(&self) -> AccessFlags {
        match self {
            Definition::Class(class) => class.modifiers,
            Definition::Field(field) => field.modifiers,
            Definition::Method(method) => method.modifiers,
        }
    }

    pub fn meta(&self) -> &DefinitionMeta {
        match self {
            Definition::Class(class) => &class.meta,
            Definition::Field(field) => &field.meta,
            Definition::Method(method) => &method.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut DefinitionMeta {
        match self {
            Definition::Class(class) => &mut class.meta,
            Definition::Field(field) => &mut field.meta,
            Definition::Method(method) => &mut method.meta,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Definition::Class(class) => class.position,
            Definition::Field(field) => field.position,
            Definition::Method(method) => method.position,
        }
    }
}
