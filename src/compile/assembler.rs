//! Method assembly, one stage per struct.
//!
//! ```text
//! MethodAssembler --materialize_labels--> LabelsMaterialized
//!     --allocate_variables--> VariablesAllocated
//!     --lower_instructions--> InstructionsLowered --build--> CompiledMethod
//! ```
//!
//! Each stage takes the previous one by value, so a method can't be built
//! from instructions that were never lowered.

use std::collections::HashMap;

use log::{debug, trace};

use crate::annotation;
use crate::ast::{
    Code, CodeEntry, Expression, Instruction, MethodDefinition, Operation, Position, Unit,
};
use crate::descriptor;
use crate::opcode::Opcode;
use crate::tree::{Insn, LabelId, MethodNode, TryCatchBlock};
use crate::types::AccessFlags;

use super::locals;
use super::{
    Collaborators, CompileError, CompileOptions, ExpressionContext, Result, Variables,
};

/// Entry stage: a method unit and its settings, nothing resolved yet.
pub struct MethodAssembler<'a> {
    definition: &'a MethodDefinition,
    code: &'a Code,
    options: &'a CompileOptions,
    collaborators: Collaborators<'a>,
}

pub struct LabelsMaterialized<'a> {
    base: MethodAssembler<'a>,
    labels: HashMap<String, LabelId>,
}

pub struct VariablesAllocated<'a> {
    base: MethodAssembler<'a>,
    labels: HashMap<String, LabelId>,
    variables: Variables,
}

pub struct InstructionsLowered<'a> {
    base: MethodAssembler<'a>,
    labels: HashMap<String, LabelId>,
    variables: Variables,
    instructions: Vec<Insn>,
    /// Code entry index that produced each instruction.
    origins: Vec<usize>,
    extra_try_catches: Vec<TryCatchBlock>,
}

/// A generated method plus the map back to the AST it came from.
#[derive(Debug)]
pub struct CompiledMethod {
    pub method: MethodNode,
    pub variables: Variables,
    code: Code,
    origins: Vec<usize>,
}

impl CompiledMethod {
    /// The code entry that generated instruction `index`.
    pub fn source_of(&self, index: usize) -> Option<&CodeEntry> {
        self.origins
            .get(index)
            .and_then(|entry| self.code.entries().get(*entry))
    }

    /// Line of the code entry that generated instruction `index`.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.source_of(index).map(|entry| entry.position().line)
    }
}

static EMPTY_CODE: Code = Code::EMPTY;

impl<'a> MethodAssembler<'a> {
    pub fn new(
        unit: &'a Unit,
        options: &'a CompileOptions,
        collaborators: Collaborators<'a>,
    ) -> Result<Self> {
        let Some(definition) = unit.method() else {
            return Err(CompileError::structural(
                "Unit does not define a method",
                unit.definition.position(),
            ));
        };
        let code = unit.code.as_ref().unwrap_or(&EMPTY_CODE);
        let has_instructions = code.instructions().next().is_some()
            || code
                .entries()
                .iter()
                .any(|e| matches!(e, CodeEntry::Expression(_)));
        if definition.has_code() && !has_instructions {
            return Err(CompileError::structural(
                format!("Method '{}' must have code", definition.name),
                definition.position,
            ));
        }
        if !definition.has_code() && has_instructions {
            return Err(CompileError::structural(
                format!(
                    "Method '{}' is abstract or native and cannot have code",
                    definition.name
                ),
                definition.position,
            ));
        }
        debug!("assembling method {}{}", definition.name, definition.desc());
        Ok(MethodAssembler {
            definition,
            code,
            options,
            collaborators,
        })
    }

    /// Creates one label per declared label name.
    pub fn materialize_labels(self) -> Result<LabelsMaterialized<'a>> {
        let mut labels = HashMap::new();
        for entry in self.code.entries() {
            if let CodeEntry::Label(label) = entry {
                let id = LabelId(labels.len() as u32);
                if labels.insert(label.name.clone(), id).is_some() {
                    return Err(CompileError::resolution(
                        format!("Label '{}' is declared more than once", label.name),
                        label.position,
                    ));
                }
            }
        }
        trace!("materialized {} labels", labels.len());
        Ok(LabelsMaterialized { base: self, labels })
    }
}

impl<'a> LabelsMaterialized<'a> {
    pub fn labels(&self) -> &HashMap<String, LabelId> {
        &self.labels
    }

    /// Binds `this`, the parameters and every referenced name to slots.
    pub fn allocate_variables(self) -> Result<VariablesAllocated<'a>> {
        let base = &self.base;
        let mut variables = Variables::new();
        variables.visit_implicit_this(&base.options.self_type, base.definition)?;
        variables.visit_params(base.definition)?;
        variables.visit_code(base.code)?;
        trace!(
            "allocated {} variables over {} slots",
            variables.len(),
            variables.used_cap()
        );
        Ok(VariablesAllocated {
            base: self.base,
            labels: self.labels,
            variables,
        })
    }
}

impl<'a> VariablesAllocated<'a> {
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn lower_instructions(self) -> Result<InstructionsLowered<'a>> {
        let mut lowered = InstructionsLowered {
            base: self.base,
            labels: self.labels,
            variables: self.variables,
            instructions: Vec::new(),
            origins: Vec::new(),
            extra_try_catches: Vec::new(),
        };
        let code = lowered.base.code;
        let mut next_label = lowered.labels.len() as u32;
        for (index, entry) in code.entries().iter().enumerate() {
            match entry {
                CodeEntry::Label(label) => {
                    let id = lowered.label(&label.name, label.position)?;
                    lowered.push(Insn::Label(id), index);
                }
                CodeEntry::Instruction(insn) => {
                    let low = lowered.lower(insn)?;
                    lowered.push(low, index);
                }
                CodeEntry::Expression(expression) => {
                    let (insns, blocks) = lowered.compile_expression(expression)?;
                    let shift = next_label;
                    let mut used = 0;
                    for insn in insns {
                        let insn = shift_labels(insn, shift);
                        if let Insn::Label(id) = insn {
                            used = used.max(id.0 - shift + 1);
                        }
                        lowered.push(insn, index);
                    }
                    for block in blocks {
                        lowered.extra_try_catches.push(TryCatchBlock {
                            start: LabelId(block.start.0 + shift),
                            end: LabelId(block.end.0 + shift),
                            handler: LabelId(block.handler.0 + shift),
                            exception_type: block.exception_type,
                        });
                    }
                    next_label += used;
                }
                _ => {}
            }
        }
        trace!("lowered {} instructions", lowered.instructions.len());
        Ok(lowered)
    }
}

impl<'a> InstructionsLowered<'a> {
    pub fn instructions(&self) -> &[Insn] {
        &self.instructions
    }

    fn push(&mut self, insn: Insn, origin: usize) {
        self.instructions.push(insn);
        self.origins.push(origin);
    }

    fn label(&self, name: &str, position: Position) -> Result<LabelId> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::missing_label(name, position))
    }

    fn slot(&self, name: &str, position: Position) -> Result<u16> {
        self.variables.index_of(name).ok_or_else(|| {
            CompileError::resolution(
                format!("No identifier mapping to variable slot for '{}'", name),
                position,
            )
        })
    }

    fn lower(&self, insn: &Instruction) -> Result<Insn> {
        let position = insn.position;
        Ok(match &insn.operation {
            Operation::Insn(op) => Insn::Insn(*op),
            Operation::Int { op, value } => Insn::Int {
                op: *op,
                operand: *value,
            },
            Operation::NewArray(ty) => {
                let Some(code) = descriptor::newarray_code(ty) else {
                    return Err(CompileError::structural(
                        format!("Illegal newarray type: {}", ty),
                        position,
                    ));
                };
                Insn::Int {
                    op: Opcode::Newarray,
                    operand: code,
                }
            }
            Operation::Var { op, name } => Insn::Var {
                op: *op,
                var: self.slot(name, position)?,
            },
            Operation::Iinc { name, increment } => Insn::Iinc {
                var: self.slot(name, position)?,
                incr: *increment,
            },
            Operation::Type { op, desc } => Insn::Type {
                op: *op,
                desc: desc.clone(),
            },
            Operation::Field {
                op,
                owner,
                name,
                desc,
            } => Insn::Field {
                op: *op,
                owner: owner.clone(),
                name: name.clone(),
                desc: desc.clone(),
            },
            Operation::Method {
                op,
                owner,
                name,
                desc,
                itf,
            } => Insn::Method {
                op: *op,
                owner: owner.clone(),
                name: name.clone(),
                desc: desc.clone(),
                itf: *itf,
            },
            Operation::InvokeDynamic {
                name,
                desc,
                bsm,
                args,
            } => Insn::InvokeDynamic {
                name: name.clone(),
                desc: desc.clone(),
                bsm: bsm.to_handle(),
                args: args.iter().map(|arg| arg.to_constant()).collect(),
            },
            Operation::Ldc(value) => Insn::Ldc(value.to_constant()),
            Operation::Jump { op, label } => Insn::Jump {
                op: *op,
                label: self.label(label, position)?,
            },
            Operation::MultiANewArray { desc, dims } => Insn::MultiANewArray {
                desc: desc.clone(),
                dims: *dims,
            },
            Operation::LookupSwitch { entries, default } => {
                let mut keys = Vec::with_capacity(entries.len());
                let mut labels = Vec::with_capacity(entries.len());
                for entry in entries {
                    keys.push(entry.key);
                    labels.push(self.label(&entry.label, position)?);
                }
                Insn::LookupSwitch {
                    dflt: self.label(default, position)?,
                    keys,
                    labels,
                }
            }
            Operation::TableSwitch {
                min,
                max,
                labels,
                default,
            } => Insn::TableSwitch {
                min: *min,
                max: *max,
                labels: labels
                    .iter()
                    .map(|name| self.label(name, position))
                    .collect::<Result<_>>()?,
                dflt: self.label(default, position)?,
            },
            Operation::Line { label, line } => Insn::LineNumber {
                line: *line,
                start: self.label(label, position)?,
            },
        })
    }

    fn compile_expression(
        &self,
        expression: &Expression,
    ) -> Result<(Vec<Insn>, Vec<TryCatchBlock>)> {
        let base = &self.base;
        let position = expression.position;
        let Some(classes) = base.collaborators.classes else {
            return Err(CompileError::structural(
                "Expression not supported, translator not given class supplier!",
                position,
            ));
        };
        let Some(compiler) = base.collaborators.expressions else {
            return Err(CompileError::structural(
                "Expression not supported, no expression compiler given!",
                position,
            ));
        };
        let desc = base.definition.desc();
        let context = ExpressionContext {
            self_type: &base.options.self_type,
            method_name: &base.definition.name,
            method_desc: &desc,
            class_bytes: classes.class_bytes(&base.options.self_type),
            variables: &self.variables,
        };
        compiler
            .compile(&expression.code, &context)
            .map_err(|source| CompileError::Expression {
                message: "Failed to compile expression".into(),
                position,
                source,
            })
    }

    /// Resolves try/catch ranges and assembles the final method.
    pub fn build(self) -> Result<CompiledMethod> {
        let base = &self.base;
        let definition = base.definition;
        let code = base.code;

        let mut try_catch_blocks = Vec::new();
        for tc in code.try_catches() {
            try_catch_blocks.push(TryCatchBlock {
                start: self.label(&tc.start, tc.position)?,
                end: self.label(&tc.end, tc.position)?,
                handler: self.label(&tc.handler, tc.position)?,
                exception_type: tc.exception_type.clone(),
            });
        }
        try_catch_blocks.extend(self.extra_try_catches.iter().cloned());

        let meta = &definition.meta;
        let signature = code
            .signature()
            .or(meta.signature.as_ref())
            .map(|s| s.value.clone());
        let exceptions = meta
            .thrown
            .iter()
            .chain(code.thrown_exceptions())
            .map(|t| t.exception_type.clone())
            .collect();
        let (visible_annotations, invisible_annotations) =
            annotation::partition(meta.annotations.iter().chain(code.annotations()));

        let local_variables = if base.options.emit_local_variables && definition.has_code() {
            locals::build_table(
                &self.variables,
                code,
                &self.labels,
                base.options.variable_range,
                base.collaborators.oracle,
                definition.position,
            )?
        } else {
            Vec::new()
        };

        let mut access = definition.modifiers;
        if meta.deprecated {
            access |= AccessFlags::DEPRECATED;
        }
        let method = MethodNode {
            access,
            name: definition.name.clone(),
            desc: definition.desc(),
            signature,
            exceptions,
            instructions: self.instructions,
            try_catch_blocks,
            local_variables,
            max_stack: base.options.max_stack,
            max_locals: self.variables.used_cap(),
            visible_annotations,
            invisible_annotations,
        };
        debug!(
            "assembled {}{}: {} instructions",
            method.name,
            method.desc,
            method.instructions.len()
        );
        Ok(CompiledMethod {
            method,
            variables: self.variables,
            code: code.clone(),
            origins: self.origins,
        })
    }
}

/// Renumbers every label of an expression fragment by `shift`.
fn shift_labels(insn: Insn, shift: u32) -> Insn {
    let moved = |id: LabelId| LabelId(id.0 + shift);
    match insn {
        Insn::Label(id) => Insn::Label(moved(id)),
        Insn::Jump { op, label } => Insn::Jump {
            op,
            label: moved(label),
        },
        Insn::LineNumber { line, start } => Insn::LineNumber {
            line,
            start: moved(start),
        },
        Insn::TableSwitch {
            min,
            max,
            dflt,
            labels,
        } => Insn::TableSwitch {
            min,
            max,
            dflt: moved(dflt),
            labels: labels.into_iter().map(moved).collect(),
        },
        Insn::LookupSwitch { dflt, keys, labels } => Insn::LookupSwitch {
            dflt: moved(dflt),
            keys,
            labels: labels.into_iter().map(moved).collect(),
        },
        other => other,
    }
}
