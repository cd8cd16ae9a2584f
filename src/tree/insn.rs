use std::fmt;

use crate::descriptor::JvmType;
use crate::opcode::{HandleTag, Opcode};

/// Opaque label identity, unique within one method.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A method handle constant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub tag: HandleTag,
    pub owner: String,
    pub name: String,
    pub desc: String,
    pub itf: bool,
}

/// Loadable constant, used by `ldc` and as bootstrap method arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    Type(JvmType),
    Handle(Handle),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Insn {
    Insn(Opcode),
    /// `bipush`, `sipush` and `newarray`.
    Int { op: Opcode, operand: i32 },
    Var { op: Opcode, var: u16 },
    Type { op: Opcode, desc: String },
    Field {
        op: Opcode,
        owner: String,
        name: String,
        desc: String,
    },
    Method {
        op: Opcode,
        owner: String,
        name: String,
        desc: String,
        itf: bool,
    },
    InvokeDynamic {
        name: String,
        desc: String,
        bsm: Handle,
        args: Vec<Constant>,
    },
    Jump { op: Opcode, label: LabelId },
    Label(LabelId),
    Ldc(Constant),
    Iinc { var: u16, incr: i32 },
    TableSwitch {
        min: i32,
        max: i32,
        dflt: LabelId,
        labels: Vec<LabelId>,
    },
    LookupSwitch {
        dflt: LabelId,
        keys: Vec<i32>,
        labels: Vec<LabelId>,
    },
    MultiANewArray { desc: String, dims: u8 },
    LineNumber { line: u32, start: LabelId },
}

impl Insn {
    /// The opcode, or `None` for labels and line markers.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Insn::Insn(op)
            | Insn::Int { op, .. }
            | Insn::Var { op, .. }
            | Insn::Type { op, .. }
            | Insn::Field { op, .. }
            | Insn::Method { op, .. }
            | Insn::Jump { op, .. } => Some(*op),
            Insn::InvokeDynamic { .. } => Some(Opcode::Invokedynamic),
            Insn::Ldc(_) => Some(Opcode::Ldc),
            Insn::Iinc { .. } => Some(Opcode::Iinc),
            Insn::TableSwitch { .. } => Some(Opcode::Tableswitch),
            Insn::LookupSwitch { .. } => Some(Opcode::Lookupswitch),
            Insn::MultiANewArray { .. } => Some(Opcode::Multianewarray),
            Insn::Label(_) | Insn::LineNumber { .. } => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Insn::Label(_))
    }

    /// Every label this instruction refers to, excluding its own identity.
    pub fn label_refs(&self) -> Vec<LabelId> {
        match self {
            Insn::Jump { label, .. } => vec![*label],
            Insn::LineNumber { start, .. } => vec![*start],
            Insn::TableSwitch { dflt, labels, .. } | Insn::LookupSwitch { dflt, labels, .. } => {
                let mut refs = labels.clone();
                refs.push(*dflt);
                refs
            }
            _ => Vec::new(),
        }
    }
}
