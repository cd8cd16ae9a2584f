use std::collections::{BTreeMap, HashMap, HashSet};

use log::trace;

use crate::ast::{Code, CodeEntry, MethodDefinition, Position};
use crate::descriptor::{self, JvmType, OBJECT};
use crate::opcode::VarOp;

use super::{CompileError, Result};

/// Where a variable usage came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VariableSource {
    pub position: Position,
    /// Index of the code entry, `None` for `this` and parameters.
    pub entry: Option<usize>,
}

impl VariableSource {
    pub fn declaration(position: Position) -> Self {
        VariableSource {
            position,
            entry: None,
        }
    }

    pub fn entry(position: Position, entry: usize) -> Self {
        VariableSource {
            position,
            entry: Some(entry),
        }
    }
}

/// The slot a purely numeric variable name refers to, as in `ILOAD 3`.
pub fn raw_slot(name: &str) -> Option<u16> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// What kind of usage is being recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UsageKind {
    /// `this` or a parameter, whose type is spelled out.
    Declared,
    Instruction(VarOp),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableInfo {
    index: u16,
    name: String,
    usages: Vec<JvmType>,
    last_type: Option<JvmType>,
    sources: Vec<VariableSource>,
    wide: bool,
}

impl VariableInfo {
    pub fn new(index: u16) -> Self {
        VariableInfo {
            index,
            name: String::new(),
            usages: Vec::new(),
            last_type: None,
            sources: Vec::new(),
            wide: false,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct recorded types, in the order they were first seen.
    pub fn usages(&self) -> &[JvmType] {
        &self.usages
    }

    /// Most recently recorded type. A slot with no recorded type holds an object.
    pub fn last_used_type(&self) -> JvmType {
        self.last_type
            .clone()
            .unwrap_or_else(|| JvmType::object(OBJECT))
    }

    pub fn sources(&self) -> &[VariableSource] {
        &self.sources
    }

    pub fn first_source(&self) -> Option<&VariableSource> {
        self.sources.first()
    }

    pub fn last_source(&self) -> Option<&VariableSource> {
        self.sources.last()
    }

    /// Whether the slot ever held a long or double.
    pub fn uses_wide(&self) -> bool {
        self.wide
    }

    fn add_type(&mut self, ty: JvmType) {
        if !self.usages.contains(&ty) {
            self.usages.push(ty.clone());
        }
        self.last_type = Some(ty);
    }
}

/// Slot allocation for one method.
///
/// Names are bound to slots in order of appearance. A long or double in slot
/// `i` reserves slot `i + 1` until slot `i` is reassigned a narrow value.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    infos: BTreeMap<u16, VariableInfo>,
    appearance: Vec<u16>,
    names: HashMap<String, u16>,
    wide_slots: HashSet<u16>,
    next_slot: u16,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Variables::default();
    }

    /// Binds `this` to slot 0 unless the method is static.
    pub fn visit_implicit_this(
        &mut self,
        self_type: &str,
        definition: &MethodDefinition,
    ) -> Result<()> {
        if !definition.is_static() {
            self.add_usage(
                0,
                "this",
                JvmType::object(self_type),
                UsageKind::Declared,
                VariableSource::declaration(definition.position),
            )?;
        }
        Ok(())
    }

    pub fn visit_params(&mut self, definition: &MethodDefinition) -> Result<()> {
        for param in &definition.params {
            let Some(ty) = descriptor::parse_field_descriptor(&param.desc) else {
                return Err(CompileError::structural(
                    format!(
                        "Illegal parameter descriptor for '{}': {}",
                        param.name.escape_default(),
                        param.desc.escape_default()
                    ),
                    definition.position,
                ));
            };
            self.add_usage(
                self.next_slot,
                &param.name,
                ty,
                UsageKind::Declared,
                VariableSource::declaration(param.position),
            )?;
        }
        Ok(())
    }

    /// Records every variable reference in `code`, checking type consistency.
    pub fn visit_code(&mut self, code: &Code) -> Result<()> {
        for (entry_index, entry) in code.entries().iter().enumerate() {
            let CodeEntry::Instruction(insn) = entry else {
                continue;
            };
            let Some(reference) = insn.variable_reference() else {
                continue;
            };
            let source = VariableSource::entry(insn.position, entry_index);
            let kind = UsageKind::Instruction(reference.op);
            let current = reference.desc;
            let raw = raw_slot(reference.name);
            let bound = self
                .by_name(reference.name)
                .or_else(|| raw.and_then(|index| self.info(index)));
            let Some(info) = bound else {
                let index = raw.unwrap_or(self.next_slot);
                self.add_usage(index, reference.name, current, kind, source)?;
                continue;
            };
            let index = info.index();
            let last = info.last_used_type();
            match reference.op {
                VarOp::Assign => {}
                VarOp::Update => {
                    if !last.sort().is_int_family() {
                        return Err(CompileError::type_consistency(
                            format!(
                                "Tried to update 'int' at '{}', but type was: {}",
                                reference.name,
                                last.descriptor()
                            ),
                            insn.position,
                        ));
                    }
                }
                VarOp::Load => {
                    let (cur, prior) = (current.sort(), last.sort());
                    let compatible = cur == prior
                        || (cur.is_int_family() && prior.is_int_family())
                        || (cur.is_reference() && prior.is_reference());
                    if !compatible {
                        return Err(CompileError::type_consistency(
                            format!(
                                "Incompatible variable type usage [{}:{}] '{}' with prior '{}' value",
                                index,
                                info.name(),
                                cur.name(),
                                prior.name()
                            ),
                            insn.position,
                        ));
                    }
                }
            }
            self.add_usage(index, reference.name, current, kind, source)?;
        }
        Ok(())
    }

    /// Records one usage of slot `index` under `name`.
    pub fn add_usage(
        &mut self,
        index: u16,
        name: &str,
        ty: JvmType,
        kind: UsageKind,
        source: VariableSource,
    ) -> Result<()> {
        if index > 0 && self.wide_slots.contains(&(index - 1)) {
            return Err(CompileError::wide_slot(source.position));
        }
        let size = ty.size().max(1);
        let end = index.checked_add(size).ok_or_else(|| {
            CompileError::structural("Too many local variable slots", source.position)
        })?;
        if !self.infos.contains_key(&index) {
            self.appearance.push(index);
        }
        let info = self
            .infos
            .entry(index)
            .or_insert_with(|| VariableInfo::new(index));
        info.sources.push(source);
        // A slot keeps its readable name when it is also referenced by number.
        if info.name.is_empty() || raw_slot(name).is_none() {
            info.name = name.to_string();
        }

        let assignment = kind == UsageKind::Instruction(VarOp::Assign);
        let record = info.usages.is_empty() || ty.is_primitive() || assignment;
        // An opcode only says "some object"; keep that out once a better reference is known.
        let vague = ty.is_object() && kind != UsageKind::Declared;
        let holds_reference = info
            .last_type
            .as_ref()
            .is_some_and(|last| last.sort().is_reference());
        if record && !(vague && holds_reference) {
            info.add_type(ty.clone());
        }

        if ty.is_wide() {
            info.wide = true;
            self.wide_slots.insert(index);
        } else if assignment {
            self.wide_slots.remove(&index);
        }
        self.names.insert(name.to_string(), index);
        self.next_slot = self.next_slot.max(end);
        trace!("variable {}:{} <- {}", index, name, ty);
        Ok(())
    }

    pub fn info(&self, index: u16) -> Option<&VariableInfo> {
        self.infos.get(&index)
    }

    pub fn by_name(&self, name: &str) -> Option<&VariableInfo> {
        self.names.get(name).and_then(|index| self.infos.get(index))
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.names.get(name).copied()
    }

    /// Number of slots in use, the method's `max_locals`.
    pub fn used_cap(&self) -> u16 {
        self.next_slot
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Variables by ascending slot index.
    pub fn iter(&self) -> impl Iterator<Item = &VariableInfo> {
        self.infos.values()
    }

    pub fn in_appearance_order(&self) -> impl Iterator<Item = &VariableInfo> {
        self.appearance.iter().filter_map(|index| self.infos.get(index))
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = &'a VariableInfo;
    type IntoIter = std::collections::btree_map::Values<'a, u16, VariableInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.infos.values()
    }
}
