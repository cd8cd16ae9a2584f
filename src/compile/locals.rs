//! Local variable table generation.

use std::collections::HashMap;

use log::debug;

use crate::ast::{Code, CodeEntry, Position};
use crate::descriptor::{JvmType, OBJECT};
use crate::tree::{LabelId, LocalVariable};

use super::{
    raw_slot, CompileError, InheritanceOracle, Result, VariableInfo, VariableRange, Variables,
};

/// Label declarations of a method body, in code order.
struct LabelIndex<'c> {
    /// (entry index, label name)
    declared: Vec<(usize, &'c str)>,
}

impl<'c> LabelIndex<'c> {
    fn new(code: &'c Code) -> Self {
        let declared = code
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                CodeEntry::Label(label) => Some((index, label.name.as_str())),
                _ => None,
            })
            .collect();
        LabelIndex { declared }
    }

    fn first(&self) -> Option<&'c str> {
        self.declared.first().map(|(_, name)| *name)
    }

    fn last(&self) -> Option<&'c str> {
        self.declared.last().map(|(_, name)| *name)
    }

    fn at_or_before(&self, entry: usize) -> Option<&'c str> {
        self.declared
            .iter()
            .rev()
            .find(|(index, _)| *index <= entry)
            .map(|(_, name)| *name)
    }

    fn at_or_after(&self, entry: usize) -> Option<&'c str> {
        self.declared
            .iter()
            .find(|(index, _)| *index >= entry)
            .map(|(_, name)| *name)
    }
}

pub(crate) fn build_table(
    variables: &Variables,
    code: &Code,
    labels: &HashMap<String, LabelId>,
    range: VariableRange,
    oracle: Option<&dyn InheritanceOracle>,
    position: Position,
) -> Result<Vec<LocalVariable>> {
    let index = LabelIndex::new(code);
    if index.declared.is_empty() {
        if range == VariableRange::NearestLabels && !variables.is_empty() {
            return Err(CompileError::structural(
                "Cannot compute variable ranges, the method declares no labels",
                position,
            ));
        }
        debug!("no labels to anchor local variables to, skipping the table");
        return Ok(Vec::new());
    }

    let mut table = Vec::with_capacity(variables.len());
    for info in variables {
        // Slots only ever referenced by number have no name to record.
        if raw_slot(info.name()).is_some() {
            continue;
        }
        let referenced_first = info.first_source().and_then(|s| s.entry.map(|e| (e, s.position)));
        let (start, end) = match (range, referenced_first) {
            (VariableRange::NearestLabels, Some(first)) => nearest_labels(&index, info, first)?,
            // `this` and parameters span the whole method.
            _ => match (index.first(), index.last()) {
                (Some(start), Some(end)) => (start, end),
                _ => continue,
            },
        };
        let lookup = |name: &str| {
            labels
                .get(name)
                .copied()
                .ok_or_else(|| CompileError::missing_label(name, position))
        };
        table.push(LocalVariable {
            name: info.name().to_string(),
            desc: common_type(info, oracle).descriptor(),
            signature: None,
            start: lookup(start)?,
            end: lookup(end)?,
            index: info.index(),
        });
    }
    Ok(table)
}

/// The label above a variable's first reference and the first label after its last one.
fn nearest_labels<'c>(
    index: &LabelIndex<'c>,
    info: &VariableInfo,
    first: (usize, Position),
) -> Result<(&'c str, &'c str)> {
    let last = info
        .sources()
        .iter()
        .filter_map(|s| s.entry.map(|entry| (entry, s.position)))
        .max_by_key(|(entry, _)| *entry)
        .unwrap_or(first);
    let start = index.at_or_before(first.0).ok_or_else(|| {
        CompileError::structural(
            format!("Failed to find start label for variable: {}", info.name()),
            first.1,
        )
    })?;
    let end = index.at_or_after(last.0).ok_or_else(|| {
        CompileError::structural(
            format!("Failed to find end label for variable: {}", info.name()),
            last.1,
        )
    })?;
    Ok((start, end))
}

/// The one type that describes every recorded usage of a variable.
///
/// Primitives widen to the largest sort seen. Objects are folded through the
/// oracle, or collapse to `java/lang/Object` without one. A slot that held
/// both kinds keeps its last type.
pub(crate) fn common_type(info: &VariableInfo, oracle: Option<&dyn InheritanceOracle>) -> JvmType {
    let usages = info.usages();
    let Some(first) = usages.first() else {
        return JvmType::object(OBJECT);
    };
    if usages.iter().all(JvmType::is_primitive) {
        return usages
            .iter()
            .max_by_key(|ty| ty.sort())
            .cloned()
            .unwrap_or_else(|| first.clone());
    }
    if !usages.iter().all(|ty| ty.sort().is_reference()) {
        return info.last_used_type();
    }
    usages[1..]
        .iter()
        .fold(first.clone(), |acc, ty| common_reference(&acc, ty, oracle))
}

fn common_reference(a: &JvmType, b: &JvmType, oracle: Option<&dyn InheritanceOracle>) -> JvmType {
    if a == b {
        return a.clone();
    }
    match (a, b, oracle) {
        (JvmType::Object(x), JvmType::Object(y), Some(oracle)) => {
            JvmType::object(oracle.common_supertype(x, y))
        }
        _ => JvmType::object(OBJECT),
    }
}
