use log::debug;

use crate::annotation;
use crate::ast::{ConstValue, Unit};
use crate::descriptor;
use crate::tree::{Constant, FieldNode};
use crate::types::AccessFlags;

use super::{CompileError, Result};

/// Builds a field from a field unit. Code entries may add a signature, a
/// constant value and annotations on top of the definition's own.
pub fn assemble(unit: &Unit) -> Result<FieldNode> {
    let Some(definition) = unit.field() else {
        return Err(CompileError::structural(
            "Unit does not define a field",
            unit.definition.position(),
        ));
    };
    if !descriptor::is_valid_desc(&definition.desc) || definition.desc.starts_with('(') {
        return Err(CompileError::structural(
            format!(
                "Illegal field descriptor for '{}': {}",
                definition.name.escape_default(),
                definition.desc.escape_default()
            ),
            definition.position,
        ));
    }
    let code = unit.code_or_empty();
    let meta = &definition.meta;

    let mut field = FieldNode::new(definition.modifiers, &definition.name, &definition.desc);
    if meta.deprecated {
        field.access |= AccessFlags::DEPRECATED;
    }
    field.signature = code
        .signature()
        .or(meta.signature.as_ref())
        .map(|s| s.value.clone());
    field.value = code
        .const_val()
        .or(definition.const_val.as_ref())
        .map(|c| const_to_constant(&c.value));
    let (visible, invisible) =
        annotation::partition(meta.annotations.iter().chain(code.annotations()));
    field.visible_annotations = visible;
    field.invisible_annotations = invisible;
    debug!("assembled field {} {}", field.name, field.desc);
    Ok(field)
}

pub(crate) fn const_to_constant(value: &ConstValue) -> Constant {
    match value {
        ConstValue::Int(v) => Constant::Int(*v),
        ConstValue::Long(v) => Constant::Long(*v),
        ConstValue::Float(v) => Constant::Float(*v),
        ConstValue::Double(v) => Constant::Double(*v),
        ConstValue::String(v) => Constant::String(v.clone()),
    }
}
