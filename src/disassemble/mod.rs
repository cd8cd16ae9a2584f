//! Tree to AST disassembly.
//!
//! Labels get base-26 names in order of appearance and variable slots get
//! names from debug info or their types, see [`naming`].

pub mod naming;

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::annotation;
use crate::ast::{
    ArgValue, ClassDefinition, ClassMethod, Code, CodeEntry, ConstVal, ConstValue, Definition,
    FieldDefinition, HandleInfo, InnerClass, Instruction, MethodDefinition, MethodParameter,
    Operation, Position, RecordComponent, Signature, SwitchEntry, ThrownException, TryCatch, Unit,
};
use crate::compile::Variables;
use crate::descriptor::{self, JvmType};
use crate::opcode::Opcode;
use crate::tree::{ClassNode, Constant, FieldNode, Insn, LabelId, MethodNode};
use crate::types::{AccessFlags, FlagTarget};

use naming::{generate_name, Site, SlotReplay, VariableNamer};

#[derive(Debug, Error, PartialEq)]
pub enum DisassembleError {
    #[error("Invalid method descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Unmapped label instance to name! ({0})")]
    UnmappedLabel(LabelId),
    #[error("Invalid newarray type: {0}")]
    InvalidArrayType(i32),
    #[error("Opcode {0:?} does not take a variable")]
    NotAVariable(Opcode),
}

pub type Result<T> = std::result::Result<T, DisassembleError>;

#[derive(Clone, Debug, Default)]
pub struct DisassembleOptions {
    /// Prepended to every generated label name.
    pub label_prefix: String,
}

pub fn disassemble_field(field: &FieldNode) -> Unit {
    Unit::new(Definition::Field(field_definition(field)))
}

pub fn disassemble_method(method: &MethodNode, options: &DisassembleOptions) -> Result<Unit> {
    MethodDisassembler::new(method, options).disassemble()
}

/// Disassembles one method, optionally seeded with known variable names.
pub struct MethodDisassembler<'m> {
    method: &'m MethodNode,
    prefix: &'m str,
    namer: VariableNamer<'m>,
    slots: SlotReplay,
    labels: HashMap<LabelId, String>,
    label_count: usize,
}

impl<'m> MethodDisassembler<'m> {
    pub fn new(method: &'m MethodNode, options: &'m DisassembleOptions) -> Self {
        MethodDisassembler {
            method,
            prefix: &options.label_prefix,
            namer: VariableNamer::new(method),
            slots: SlotReplay::default(),
            labels: HashMap::new(),
            label_count: 0,
        }
    }

    /// Reuses the names of a previous compile for the same slots.
    pub fn prepopulate(mut self, variables: &Variables) -> Self {
        self.namer.prepopulate(variables);
        self
    }

    pub fn disassemble(mut self) -> Result<Unit> {
        let (definition, code) = self.visit()?;
        Ok(Unit::with_code(Definition::Method(definition), code))
    }

    fn next_label_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, generate_name(self.label_count));
        self.label_count += 1;
        name
    }

    fn visit(&mut self) -> Result<(MethodDefinition, Code)> {
        let method = self.method;
        debug!("disassembling method {}{}", method.name, method.desc);

        // Labels, with a leading one when a variable is touched before any label
        let mut fallback = None;
        for insn in &method.instructions {
            match insn {
                Insn::Label(id) if !self.labels.contains_key(id) => {
                    let name = self.next_label_name();
                    self.labels.insert(*id, name);
                }
                Insn::Var { .. } if self.label_count == 0 => {
                    fallback = Some(self.next_label_name());
                }
                _ => {}
            }
        }
        if !method.instructions.is_empty() && self.label_count == 0 {
            fallback = Some(self.next_label_name());
        }

        let Some((params, ret)) = descriptor::parse_method_descriptor(&method.desc) else {
            return Err(DisassembleError::InvalidDescriptor(method.desc.clone()));
        };
        let mut arg_index: u16 = if method.access.is_static() { 0 } else { 1 };
        if arg_index == 1 {
            self.slots.declare("this", 0, 1);
        }
        let mut parameters = Vec::with_capacity(params.len());
        for ty in &params {
            let name = self.namer.name(Site::Param, ty, arg_index);
            self.namer.add_param(arg_index, &name);
            self.slots.declare(&name, arg_index, ty.size());
            parameters.push(MethodParameter::new(ty.descriptor(), name));
            arg_index = arg_index.saturating_add(ty.size());
        }

        let mut definition = MethodDefinition::new(
            method.access.applicable(FlagTarget::Method),
            &method.name,
            parameters,
            ret.descriptor(),
        );
        let meta = &mut definition.meta;
        meta.deprecated = method.access.contains(AccessFlags::DEPRECATED);
        meta.signature = distinct_signature(&method.signature, &method.desc);
        meta.thrown = method
            .exceptions
            .iter()
            .map(|ex| ThrownException {
                exception_type: ex.clone(),
                position: Position::default(),
            })
            .collect();
        meta.annotations =
            annotation::merge(&method.visible_annotations, &method.invisible_annotations);

        let mut code = Code::new();
        for block in &method.try_catch_blocks {
            code.push(CodeEntry::TryCatch(TryCatch {
                start: self.label_name(block.start)?,
                end: self.label_name(block.end)?,
                handler: self.label_name(block.handler)?,
                exception_type: block.exception_type.clone(),
                position: Position::default(),
            }));
        }
        if let Some(name) = fallback {
            code.add_label(name);
        }
        for (pos, insn) in method.instructions.iter().enumerate() {
            match insn {
                Insn::Label(id) => code.add_label(self.label_name(*id)?),
                other => {
                    let operation = self.operation(pos, other)?;
                    code.add_instruction(Instruction::new(operation));
                }
            }
        }
        if matches!(method.instructions.last(), Some(last) if !last.is_label()) {
            let name = self.next_label_name();
            code.add_label(name);
        }
        Ok((definition, code))
    }

    fn label_name(&self, id: LabelId) -> Result<String> {
        self.labels
            .get(&id)
            .cloned()
            .ok_or(DisassembleError::UnmappedLabel(id))
    }

    fn operation(&mut self, pos: usize, insn: &Insn) -> Result<Operation> {
        Ok(match insn {
            Insn::Insn(op) => Operation::Insn(*op),
            Insn::Int {
                op: Opcode::Newarray,
                operand,
            } => Operation::NewArray(
                descriptor::newarray_type(*operand)
                    .ok_or(DisassembleError::InvalidArrayType(*operand))?,
            ),
            Insn::Int { op, operand } => Operation::Int {
                op: *op,
                value: *operand,
            },
            Insn::Var { op, var } => {
                let ty = JvmType::from_var_opcode(*op).ok_or(DisassembleError::NotAVariable(*op))?;
                let name = self.namer.name(Site::At(pos), &ty, *var);
                Operation::Var {
                    op: *op,
                    name: self.slots.resolve(name, *var, ty.size()),
                }
            }
            Insn::Iinc { var, incr } => {
                let name = self.namer.name(Site::At(pos), &JvmType::Int, *var);
                Operation::Iinc {
                    name: self.slots.resolve(name, *var, 1),
                    increment: *incr,
                }
            }
            Insn::Type { op, desc } => Operation::Type {
                op: *op,
                desc: desc.clone(),
            },
            Insn::Field {
                op,
                owner,
                name,
                desc,
            } => Operation::Field {
                op: *op,
                owner: owner.clone(),
                name: name.clone(),
                desc: desc.clone(),
            },
            Insn::Method {
                op,
                owner,
                name,
                desc,
                itf,
            } => Operation::Method {
                op: *op,
                owner: owner.clone(),
                name: name.clone(),
                desc: desc.clone(),
                itf: *itf,
            },
            Insn::InvokeDynamic {
                name,
                desc,
                bsm,
                args,
            } => Operation::InvokeDynamic {
                name: name.clone(),
                desc: desc.clone(),
                bsm: HandleInfo::from_handle(bsm),
                args: args.iter().map(ArgValue::from_constant).collect(),
            },
            Insn::Ldc(constant) => Operation::Ldc(ArgValue::from_constant(constant)),
            Insn::Jump { op, label } => Operation::Jump {
                op: *op,
                label: self.label_name(*label)?,
            },
            Insn::TableSwitch {
                min,
                max,
                dflt,
                labels,
            } => Operation::TableSwitch {
                min: *min,
                max: *max,
                labels: labels
                    .iter()
                    .map(|id| self.label_name(*id))
                    .collect::<Result<_>>()?,
                default: self.label_name(*dflt)?,
            },
            Insn::LookupSwitch { dflt, keys, labels } => Operation::LookupSwitch {
                entries: keys
                    .iter()
                    .zip(labels)
                    .map(|(key, id)| {
                        Ok(SwitchEntry {
                            key: *key,
                            label: self.label_name(*id)?,
                        })
                    })
                    .collect::<Result<_>>()?,
                default: self.label_name(*dflt)?,
            },
            Insn::MultiANewArray { desc, dims } => Operation::MultiANewArray {
                desc: desc.clone(),
                dims: *dims,
            },
            Insn::LineNumber { line, start } => Operation::Line {
                label: self.label_name(*start)?,
                line: *line,
            },
            Insn::Label(id) => return Err(DisassembleError::UnmappedLabel(*id)),
        })
    }
}

fn distinct_signature(signature: &Option<String>, desc: &str) -> Option<Signature> {
    signature
        .as_ref()
        .filter(|sig| sig.as_str() != desc)
        .map(|sig| Signature {
            value: sig.clone(),
            position: Position::default(),
        })
}

fn field_definition(field: &FieldNode) -> FieldDefinition {
    debug!("disassembling field {} {}", field.name, field.desc);
    let mut definition = FieldDefinition::new(
        field.access.applicable(FlagTarget::Field),
        &field.name,
        &field.desc,
    );
    definition.meta.deprecated = field.access.contains(AccessFlags::DEPRECATED);
    definition.meta.signature = distinct_signature(&field.signature, &field.desc);
    definition.const_val = field.value.as_ref().and_then(|value| {
        let value = match value {
            Constant::Int(v) => ConstValue::Int(*v),
            Constant::Long(v) => ConstValue::Long(*v),
            Constant::Float(v) => ConstValue::Float(*v),
            Constant::Double(v) => ConstValue::Double(*v),
            Constant::String(v) => ConstValue::String(v.clone()),
            Constant::Type(_) | Constant::Handle(_) => return None,
        };
        Some(ConstVal {
            value,
            position: Position::default(),
        })
    });
    definition.meta.annotations =
        annotation::merge(&field.visible_annotations, &field.invisible_annotations);
    definition
}

/// Disassembles a whole class, members included.
pub fn disassemble_class(class: &ClassNode, options: &DisassembleOptions) -> Result<Unit> {
    debug!("disassembling class {}", class.name);
    let mut definition = ClassDefinition {
        modifiers: class.access.applicable(FlagTarget::Class),
        name: class.name.clone(),
        super_name: class.super_name.clone(),
        interfaces: class.interfaces.clone(),
        version: class.version,
        source_file: class.source_file.clone(),
        nest_host: class.nest_host.clone(),
        nest_members: class.nest_members.clone(),
        permitted_subclasses: class.permitted_subclasses.clone(),
        module: class.module.clone(),
        ..ClassDefinition::default()
    };
    definition.meta.signature = class.signature.as_ref().map(|sig| Signature {
        value: sig.clone(),
        position: Position::default(),
    });
    definition.meta.deprecated = class.access.contains(AccessFlags::DEPRECATED);
    definition.meta.annotations =
        annotation::merge(&class.visible_annotations, &class.invisible_annotations);

    definition.inner_classes = class
        .inner_classes
        .iter()
        .map(|inner| InnerClass {
            modifiers: inner.access.applicable(FlagTarget::InnerClass),
            name: inner.name.clone(),
            outer_name: inner.outer_name.clone(),
            inner_name: inner.inner_name.clone(),
        })
        .collect();
    definition.record = class.record_components.as_ref().map(|components| {
        components
            .iter()
            .map(|component| RecordComponent {
                name: component.name.clone(),
                desc: component.descriptor.clone(),
                signature: component.signature.clone(),
                annotations: annotation::merge(
                    &component.visible_annotations,
                    &component.invisible_annotations,
                ),
            })
            .collect()
    });

    for method in &class.methods {
        let (method_definition, code) = MethodDisassembler::new(method, options).visit()?;
        definition.methods.push(ClassMethod {
            definition: method_definition,
            code,
        });
    }
    definition.fields = class.fields.iter().map(field_definition).collect();
    Ok(Unit::new(Definition::Class(definition)))
}
