use crate::descriptor::JvmType;
use crate::opcode::{Opcode, VarOp};

use super::{ArgValue, HandleInfo, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchEntry {
    pub key: i32,
    pub label: String,
}

/// What an instruction does, with operands still in symbolic form.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Insn(Opcode),
    /// `bipush` and `sipush`.
    Int { op: Opcode, value: i32 },
    /// `newarray` with its primitive element type.
    NewArray(JvmType),
    Var { op: Opcode, name: String },
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
        bsm: HandleInfo,
        args: Vec<ArgValue>,
    },
    Ldc(ArgValue),
    Jump { op: Opcode, label: String },
    Iinc { name: String, increment: i32 },
    MultiANewArray { desc: String, dims: u8 },
    LookupSwitch {
        entries: Vec<SwitchEntry>,
        default: String,
    },
    TableSwitch {
        min: i32,
        max: i32,
        labels: Vec<String>,
        default: String,
    },
    Line { label: String, line: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub operation: Operation,
    pub position: Position,
}

/// A symbolic reference to a local variable made by an instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableReference<'a> {
    pub name: &'a str,
    /// Type implied by the opcode.
    pub desc: JvmType,
    pub op: VarOp,
}

impl Instruction {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            position: Position::default(),
        }
    }

    pub fn at(operation: Operation, position: Position) -> Self {
        Self {
            operation,
            position,
        }
    }

    /// `None` for line number markers, which have no opcode.
    pub fn opcode(&self) -> Option<Opcode> {
        match &self.operation {
            Operation::Insn(op)
            | Operation::Int { op, .. }
            | Operation::Var { op, .. }
            | Operation::Type { op, .. }
            | Operation::Field { op, .. }
            | Operation::Method { op, .. }
            | Operation::Jump { op, .. } => Some(*op),
            Operation::NewArray(_) => Some(Opcode::Newarray),
            Operation::InvokeDynamic { .. } => Some(Opcode::Invokedynamic),
            Operation::Ldc(_) => Some(Opcode::Ldc),
            Operation::Iinc { .. } => Some(Opcode::Iinc),
            Operation::MultiANewArray { .. } => Some(Opcode::Multianewarray),
            Operation::LookupSwitch { .. } => Some(Opcode::Lookupswitch),
            Operation::TableSwitch { .. } => Some(Opcode::Tableswitch),
            Operation::Line { .. } => None,
        }
    }

    pub fn variable_reference(&self) -> Option<VariableReference<'_>> {
        match &self.operation {
            Operation::Var { op, name } => Some(VariableReference {
                name,
                desc: JvmType::from_var_opcode(*op)?,
                op: op.var_op()?,
            }),
            Operation::Iinc { name, .. } => Some(VariableReference {
                name,
                desc: JvmType::Int,
                op: VarOp::Update,
            }),
            _ => None,
        }
    }

    /// Label names this instruction refers to.
    pub fn label_refs(&self) -> Vec<&str> {
        match &self.operation {
            Operation::Jump { label, .. } | Operation::Line { label, .. } => vec![label.as_str()],
            Operation::LookupSwitch { entries, default } => entries
                .iter()
                .map(|e| e.label.as_str())
                .chain(std::iter::once(default.as_str()))
                .collect(),
            Operation::TableSwitch {
                labels, default, ..
            } => labels
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(default.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
