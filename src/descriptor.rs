//! JVM type descriptors, sorts and the small amount of type algebra the
//! assembler needs (slot widths, normalized sorts, opcode implied types).

use std::fmt;

use crate::opcode::Opcode;

pub const OBJECT: &str = "java/lang/Object";
pub const OBJECT_DESC: &str = "Ljava/lang/Object;";

/// A JVM type parsed from a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JvmType {
    Void,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
    Array(Box<JvmType>),
    Object(String),
    Method {
        params: Vec<JvmType>,
        ret: Box<JvmType>,
    },
}

/// Coarse classification of a type.
///
/// The declaration order matters: every sort up to and including [`Sort::Int`]
/// is an int-family sort, and every sort up to [`Sort::Double`] is primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    Void,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
    Array,
    Object,
    Method,
}

impl Sort {
    /// Collapses sub-int primitives to `Int` and arrays to `Object`.
    pub fn normalized(self) -> Sort {
        match self {
            Sort::Array => Sort::Object,
            Sort::Boolean | Sort::Char | Sort::Byte | Sort::Short => Sort::Int,
            other => other,
        }
    }

    pub fn is_primitive(self) -> bool {
        self <= Sort::Double
    }

    pub fn is_int_family(self) -> bool {
        self <= Sort::Int
    }

    pub fn is_reference(self) -> bool {
        matches!(self, Sort::Array | Sort::Object)
    }

    pub fn name(self) -> &'static str {
        match self {
            Sort::Void => "void",
            Sort::Boolean => "boolean",
            Sort::Char => "char",
            Sort::Byte => "byte",
            Sort::Short => "short",
            Sort::Int => "int",
            Sort::Float => "float",
            Sort::Long => "long",
            Sort::Double => "double",
            Sort::Array => "array",
            Sort::Object => "object",
            Sort::Method => "method",
        }
    }
}

impl JvmType {
    pub fn object(name: impl Into<String>) -> JvmType {
        JvmType::Object(name.into())
    }

    /// Type for an internal name, which may also be an array descriptor (`[I`).
    pub fn from_internal_name(name: &str) -> Option<JvmType> {
        if name.starts_with('[') {
            parse_field_descriptor(name)
        } else if name.is_empty() {
            None
        } else {
            Some(JvmType::Object(name.to_string()))
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            JvmType::Void => Sort::Void,
            JvmType::Boolean => Sort::Boolean,
            JvmType::Char => Sort::Char,
            JvmType::Byte => Sort::Byte,
            JvmType::Short => Sort::Short,
            JvmType::Int => Sort::Int,
            JvmType::Float => Sort::Float,
            JvmType::Long => Sort::Long,
            JvmType::Double => Sort::Double,
            JvmType::Array(_) => Sort::Array,
            JvmType::Object(_) => Sort::Object,
            JvmType::Method { .. } => Sort::Method,
        }
    }

    /// Number of local variable slots a value of this type occupies.
    pub fn size(&self) -> u16 {
        match self {
            JvmType::Void => 0,
            JvmType::Long | JvmType::Double => 2,
            _ => 1,
        }
    }

    pub fn is_wide(&self) -> bool {
        self.size() == 2
    }

    pub fn is_primitive(&self) -> bool {
        self.sort().is_primitive()
    }

    pub fn descriptor(&self) -> String {
        match self {
            JvmType::Void => "V".into(),
            JvmType::Boolean => "Z".into(),
            JvmType::Char => "C".into(),
            JvmType::Byte => "B".into(),
            JvmType::Short => "S".into(),
            JvmType::Int => "I".into(),
            JvmType::Float => "F".into(),
            JvmType::Long => "J".into(),
            JvmType::Double => "D".into(),
            JvmType::Array(inner) => format!("[{}", inner.descriptor()),
            JvmType::Object(name) => format!("L{};", name),
            JvmType::Method { params, ret } => {
                let mut out = String::from("(");
                for param in params {
                    out.push_str(&param.descriptor());
                }
                out.push(')');
                out.push_str(&ret.descriptor());
                out
            }
        }
    }

    /// Internal name of an object type; the descriptor for anything else.
    pub fn internal_name(&self) -> String {
        match self {
            JvmType::Object(name) => name.clone(),
            other => other.descriptor(),
        }
    }

    /// Innermost component of an array type, or the type itself.
    pub fn element_type(&self) -> &JvmType {
        match self {
            JvmType::Array(inner) => inner.element_type(),
            other => other,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            JvmType::Array(inner) => 1 + inner.dimensions(),
            _ => 0,
        }
    }

    /// Type implied by a local variable instruction.
    ///
    /// Object-typed opcodes can't tell what class they operate on, so they
    /// imply `java/lang/Object`.
    pub fn from_var_opcode(op: Opcode) -> Option<JvmType> {
        match op {
            Opcode::Iinc | Opcode::Iload | Opcode::Istore => Some(JvmType::Int),
            Opcode::Aload | Opcode::Astore | Opcode::Ret => Some(JvmType::object(OBJECT)),
            Opcode::Fload | Opcode::Fstore => Some(JvmType::Float),
            Opcode::Dload | Opcode::Dstore => Some(JvmType::Double),
            Opcode::Lload | Opcode::Lstore => Some(JvmType::Long),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JvmType::Object(name) if name == OBJECT)
    }
}

impl fmt::Display for JvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Parse a single type descriptor starting at position `pos` in `desc`.
/// Returns (JvmType, next_position).
pub fn parse_type_at(desc: &str, pos: usize) -> Option<(JvmType, usize)> {
    let bytes = desc.as_bytes();
    if pos >= bytes.len() {
        return None;
    }
    match bytes[pos] {
        b'B' => Some((JvmType::Byte, pos + 1)),
        b'C' => Some((JvmType::Char, pos + 1)),
        b'D' => Some((JvmType::Double, pos + 1)),
        b'F' => Some((JvmType::Float, pos + 1)),
        b'I' => Some((JvmType::Int, pos + 1)),
        b'J' => Some((JvmType::Long, pos + 1)),
        b'S' => Some((JvmType::Short, pos + 1)),
        b'Z' => Some((JvmType::Boolean, pos + 1)),
        b'V' => Some((JvmType::Void, pos + 1)),
        b'L' => {
            let semi = desc[pos + 1..].find(';')?;
            let class_name = &desc[pos + 1..pos + 1 + semi];
            if class_name.is_empty() {
                return None;
            }
            Some((JvmType::Object(class_name.to_string()), pos + 1 + semi + 1))
        }
        b'[' => {
            let (inner, next) = parse_type_at(desc, pos + 1)?;
            if inner == JvmType::Void {
                return None;
            }
            Some((JvmType::Array(Box::new(inner)), next))
        }
        _ => None,
    }
}

/// Parse a complete field descriptor (no trailing text, no `V`).
pub fn parse_field_descriptor(desc: &str) -> Option<JvmType> {
    let (ty, next) = parse_type_at(desc, 0)?;
    if next != desc.len() || ty == JvmType::Void {
        return None;
    }
    Some(ty)
}

/// Parse a method descriptor, e.g. "(II)V" -> ([Int, Int], Void)
pub fn parse_method_descriptor(desc: &str) -> Option<(Vec<JvmType>, JvmType)> {
    if !desc.starts_with('(') {
        return None;
    }
    let close = desc.find(')')?;
    let mut params = Vec::new();
    let mut pos = 1;
    while pos < close {
        let (ty, next) = parse_type_at(desc, pos)?;
        if ty == JvmType::Void {
            return None;
        }
        params.push(ty);
        pos = next;
    }
    if pos != close {
        return None;
    }
    let (ret, next) = parse_type_at(desc, close + 1)?;
    if next != desc.len() {
        return None;
    }
    Some((params, ret))
}

/// Parse either a field or a method descriptor.
pub fn parse_descriptor(desc: &str) -> Option<JvmType> {
    if desc.starts_with('(') {
        let (params, ret) = parse_method_descriptor(desc)?;
        Some(JvmType::Method {
            params,
            ret: Box::new(ret),
        })
    } else {
        parse_field_descriptor(desc)
    }
}

pub fn is_valid_desc(desc: &str) -> bool {
    parse_descriptor(desc).is_some()
}

/// Convert a newarray type code to JvmType.
pub fn newarray_type(atype: i32) -> Option<JvmType> {
    match atype {
        4 => Some(JvmType::Boolean),
        5 => Some(JvmType::Char),
        6 => Some(JvmType::Float),
        7 => Some(JvmType::Double),
        8 => Some(JvmType::Byte),
        9 => Some(JvmType::Short),
        10 => Some(JvmType::Int),
        11 => Some(JvmType::Long),
        _ => None,
    }
}

/// Inverse of [`newarray_type`].
pub fn newarray_code(ty: &JvmType) -> Option<i32> {
    match ty {
        JvmType::Boolean => Some(4),
        JvmType::Char => Some(5),
        JvmType::Float => Some(6),
        JvmType::Double => Some(7),
        JvmType::Byte => Some(8),
        JvmType::Short => Some(9),
        JvmType::Int => Some(10),
        JvmType::Long => Some(11),
        _ => None,
    }
}

/// Primitive type by its source-level keyword (`int`, `boolean`, ...).
pub fn primitive_by_name(name: &str) -> Option<JvmType> {
    match name {
        "boolean" => Some(JvmType::Boolean),
        "char" => Some(JvmType::Char),
        "float" => Some(JvmType::Float),
        "double" => Some(JvmType::Double),
        "byte" => Some(JvmType::Byte),
        "short" => Some(JvmType::Short),
        "int" => Some(JvmType::Int),
        "long" => Some(JvmType::Long),
        _ => None,
    }
}
