use crate::descriptor::JvmType;
use crate::opcode::HandleTag;
use crate::tree::{Constant, Handle};

use super::Position;

/// Method handle reference as written in assembly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandleInfo {
    pub tag: HandleTag,
    pub owner: String,
    pub name: String,
    pub desc: String,
}

impl HandleInfo {
    pub fn new(
        tag: HandleTag,
        owner: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            tag,
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
        }
    }

    pub fn to_handle(&self) -> Handle {
        Handle {
            tag: self.tag,
            owner: self.owner.clone(),
            name: self.name.clone(),
            desc: self.desc.clone(),
            itf: self.tag == HandleTag::InvokeInterface,
        }
    }

    pub fn from_handle(handle: &Handle) -> Self {
        Self::new(handle.tag, &handle.owner, &handle.name, &handle.desc)
    }
}

/// A constant operand of `ldc` or of a bootstrap method.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Type(JvmType),
    Handle(HandleInfo),
}

impl ArgValue {
    pub fn to_constant(&self) -> Constant {
        match self {
            ArgValue::Int(v) => Constant::Int(*v),
            ArgValue::Long(v) => Constant::Long(*v),
            ArgValue::Float(v) => Constant::Float(*v),
            ArgValue::Double(v) => Constant::Double(*v),
            ArgValue::String(v) => Constant::String(v.clone()),
            ArgValue::Type(t) => Constant::Type(t.clone()),
            ArgValue::Handle(h) => Constant::Handle(h.to_handle()),
        }
    }

    pub fn from_constant(constant: &Constant) -> Self {
        match constant {
            Constant::Int(v) => ArgValue::Int(*v),
            Constant::Long(v) => ArgValue::Long(*v),
            Constant::Float(v) => ArgValue::Float(*v),
            Constant::Double(v) => ArgValue::Double(*v),
            Constant::String(v) => ArgValue::String(v.clone()),
            Constant::Type(t) => ArgValue::Type(t.clone()),
            Constant::Handle(h) => ArgValue::Handle(HandleInfo::from_handle(h)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub visible: bool,
    /// Internal name of the annotation type.
    pub anno_type: String,
    /// Arguments in declaration order; names are unique.
    pub args: Vec<(String, AnnoArg)>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnnoArg {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Type(JvmType),
    Handle(HandleInfo),
    Annotation(Annotation),
    List(Vec<AnnoArg>),
    Enum { enum_type: String, name: String },
}

impl Annotation {
    pub fn new(visible: bool, anno_type: impl Into<String>) -> Self {
        Self {
            visible,
            anno_type: anno_type.into(),
            args: Vec::new(),
            position: Position::default(),
        }
    }

    pub fn arg(&self, name: &str) -> Option<&AnnoArg> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, arg)| arg)
    }

    /// Sets an argument, replacing an existing one of the same name in place.
    pub fn set_arg(&mut self, name: impl Into<String>, value: AnnoArg) {
        let name = name.into();
        match self.args.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.args.push((name, value)),
        }
    }
}
