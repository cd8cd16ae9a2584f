//! Readable names for numbered local variable slots.

use std::collections::{BTreeMap, HashMap};

use crate::compile::{raw_slot, Variables};
use crate::descriptor::{self, JvmType, Sort};
use crate::tree::{Insn, LocalVariable, MethodNode};

const MAX_NAME_LEN: usize = 35;

/// Where a variable is being named from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Site {
    /// A method parameter. Debug info ranges don't apply.
    Param,
    /// The instruction at this index of the method's instruction list.
    At(usize),
}

/// Base-26 label name: `A`..`Z`, `AA`, `AB`, ...
pub fn generate_name(index: usize) -> String {
    let mut out = Vec::new();
    let mut n = index;
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Names slots for one method. Results are cached per (slot, normalized sort)
/// so the same variable keeps its name across the whole listing.
pub struct VariableNamer<'m> {
    method: &'m MethodNode,
    is_static: bool,
    /// Slot -> instruction index -> normalized sort used there.
    positional_sorts: HashMap<u16, BTreeMap<usize, Sort>>,
    names: HashMap<(u16, Sort), String>,
    params: HashMap<u16, String>,
    /// Instruction index of every label, for debug info ranges.
    label_positions: HashMap<crate::tree::LabelId, usize>,
}

impl<'m> VariableNamer<'m> {
    pub fn new(method: &'m MethodNode) -> Self {
        let mut positional_sorts: HashMap<u16, BTreeMap<usize, Sort>> = HashMap::new();
        let mut label_positions = HashMap::new();
        for (pos, insn) in method.instructions.iter().enumerate() {
            match insn {
                Insn::Var { op, var } => {
                    if let Some(ty) = JvmType::from_var_opcode(*op) {
                        positional_sorts
                            .entry(*var)
                            .or_default()
                            .insert(pos, ty.sort().normalized());
                    }
                }
                Insn::Label(id) => {
                    label_positions.entry(*id).or_insert(pos);
                }
                _ => {}
            }
        }
        VariableNamer {
            method,
            is_static: method.access.is_static(),
            positional_sorts,
            names: HashMap::new(),
            params: HashMap::new(),
            label_positions,
        }
    }

    /// Seeds the cache with names a previous compile settled on.
    pub fn prepopulate(&mut self, variables: &Variables) {
        for info in variables {
            let sort = info.last_used_type().sort().normalized();
            self.names
                .insert((info.index(), sort), info.name().to_string());
        }
    }

    pub fn add_param(&mut self, index: u16, name: &str) {
        self.params.insert(index, name.to_string());
    }

    pub fn name(&mut self, site: Site, ty: &JvmType, index: u16) -> String {
        if index == 0 && !self.is_static {
            return "this".to_string();
        }
        if let Some(param) = self.params.get(&index) {
            return param.clone();
        }
        let key = (index, ty.sort().normalized());
        let mut name = self.names.get(&key).cloned();
        if name.is_none() {
            name = self
                .method
                .local_variables
                .iter()
                .filter(|local| self.is_matching(local, site, ty, index))
                .find(|local| !self.names.values().any(|taken| *taken == local.name))
                .map(|local| local.name.clone());
        }
        let name = match name {
            Some(name) if is_ok_name(&name) => name,
            _ => {
                let derived = derive_name(ty, index);
                if is_ok_name(&derived) {
                    derived
                } else {
                    format!("v{}", index)
                }
            }
        };
        self.names.insert(key, name.clone());
        name
    }

    fn is_matching(&self, local: &LocalVariable, site: Site, ty: &JvmType, index: u16) -> bool {
        if local.index != index {
            return false;
        }
        let Some(local_type) = descriptor::parse_field_descriptor(&local.desc) else {
            return false;
        };
        let local_sort = local_type.sort().normalized();
        if local_sort.is_primitive() != ty.sort().normalized().is_primitive() {
            return false;
        }
        let Site::At(pos) = site else {
            return true;
        };
        // javac starts a variable's range one instruction after the store that defines it
        let Some(&start) = self.label_positions.get(&local.start) else {
            return false;
        };
        if pos + 1 < start {
            return false;
        }
        match self.label_positions.get(&local.end) {
            Some(&end) if pos <= end => {}
            _ => return false,
        }
        self.is_same_sort_or_undefined(index, pos, local_sort)
    }

    fn is_same_sort_or_undefined(&self, index: u16, pos: usize, sort: Sort) -> bool {
        self.positional_sorts
            .get(&index)
            .and_then(|sorts| sorts.range(..=pos).next_back())
            .map_or(true, |(_, found)| *found == sort)
    }
}

/// Follows the assembler's slot allocation over the names handed out, so a
/// listing compiles back to the slots it was read from. A name the assembler
/// would bind elsewhere, as when one slot is reused for a different sort, is
/// replaced by the bare slot number.
#[derive(Debug, Default)]
pub struct SlotReplay {
    bound: HashMap<String, u16>,
    next: u16,
}

impl SlotReplay {
    /// `this` and parameters, which always sit in their declared slots.
    pub fn declare(&mut self, name: &str, index: u16, size: u16) {
        self.bound.insert(name.to_string(), index);
        self.next = self.next.max(index.saturating_add(size.max(1)));
    }

    pub fn resolve(&mut self, name: String, index: u16, size: u16) -> String {
        let slot = raw_slot(&name)
            .or_else(|| self.bound.get(&name).copied())
            .unwrap_or(self.next);
        self.next = self.next.max(index.saturating_add(size.max(1)));
        if slot == index {
            self.bound.insert(name.clone(), index);
            name
        } else {
            index.to_string()
        }
    }
}

/// A name from the type: `java/lang/String` in slot 2 is `string2`.
fn derive_name(ty: &JvmType, index: u16) -> String {
    let mut ty = ty.element_type().clone();
    if ty.sort() < Sort::Int {
        ty = JvmType::Int;
    }
    let internal = ty.internal_name();
    let mut simple = match internal.rfind('/') {
        Some(split) if split > 0 => &internal[split + 1..],
        _ => internal.as_str(),
    };
    if let Some(split) = simple.find('$').filter(|split| *split > 0) {
        simple = &simple[split + 1..];
    }
    let simple = simple.replace(';', "");
    let mut chars = simple.chars();
    let lowered: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}", lowered, index)
}

pub fn is_ok_name(name: &str) -> bool {
    name.chars().count() <= MAX_NAME_LEN
        && !name.is_empty()
        && !name.contains('-')
        && !name.starts_with("object")
        && name.chars().all(|c| c.is_ascii_graphic() && c != '\\' && c != '"')
        && !is_decimal(name)
}

fn is_decimal(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_digit()) && name.chars().all(|c| c.is_ascii_digit() || c == '.')
}
