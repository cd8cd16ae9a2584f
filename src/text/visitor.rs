//! Parse tree to AST. One visitor serves both grammars.

use log::{debug, warn};

use crate::ast::*;
use crate::descriptor::{self, JvmType};
use crate::opcode::{HandleTag, Opcode};
use crate::types::{AccessFlags, FlagTarget};

use super::literal::{parse_number, Number};
use super::node::{
    AnnoArgNode, AnnotationNode, ArgNode, HandleNode, Literal, Node, Operands, ParamNode, Spanned,
};
use super::ParseError;

type Result<T> = std::result::Result<T, ParseError>;

pub(crate) fn visit(nodes: Vec<Node>, source: &[char]) -> Result<Unit> {
    let mut visitor = Visitor {
        source,
        meta: DefinitionMeta::default(),
        pending_value: None,
        definition: None,
        code: Code::new(),
        merge_unmatched: false,
    };
    for node in nodes {
        visitor.node(node)?;
    }
    let Some(definition) = visitor.definition else {
        return Err(ParseError::new(
            "No definition found!",
            Position::new(1, 1, 0, source.len()),
        ));
    };
    debug!(
        "parsed '{}' with {} code entries",
        definition.name(),
        visitor.code.entries().len()
    );
    Ok(Unit::with_code(definition, visitor.code))
}

struct Visitor<'s> {
    source: &'s [char],
    /// Meta seen before the definition.
    meta: DefinitionMeta,
    pending_value: Option<ConstVal>,
    definition: Option<Definition>,
    code: Code,
    /// Whether the last entry is unmatched text the next unmatched word joins.
    merge_unmatched: bool,
}

impl Visitor<'_> {
    fn node(&mut self, node: Node) -> Result<()> {
        if let Node::Unmatched(word) = node {
            self.unmatched(word);
            return Ok(());
        }
        self.merge_unmatched = false;
        match node {
            Node::Signature(sig) => {
                let signature = Signature {
                    value: sig.value,
                    position: sig.position,
                };
                match &mut self.definition {
                    None => self.meta.signature = Some(signature),
                    Some(_) => self.code.push(CodeEntry::Signature(signature)),
                }
            }
            Node::Throws(thrown) => {
                let thrown = ThrownException {
                    exception_type: thrown.value,
                    position: thrown.position,
                };
                match &mut self.definition {
                    None => self.meta.thrown.push(thrown),
                    Some(_) => self.code.push(CodeEntry::ThrownException(thrown)),
                }
            }
            Node::Value(value) => {
                let value = const_val(&value)?;
                match &mut self.definition {
                    None => self.pending_value = Some(value),
                    Some(_) => self.code.push(CodeEntry::ConstVal(value)),
                }
            }
            Node::Deprecated(_) => match &mut self.definition {
                None => self.meta.deprecated = true,
                Some(definition) => definition.meta_mut().deprecated = true,
            },
            Node::Annotation(node) => {
                let annotation = annotation(node)?;
                match &mut self.definition {
                    None => self.meta.annotations.push(annotation),
                    Some(_) => self.code.push(CodeEntry::Annotation(annotation)),
                }
            }
            Node::Method {
                modifiers,
                name,
                params,
                return_type,
                position,
            } => {
                let Some(return_type) = return_type else {
                    return Err(ParseError::new("Could not locate return type", position));
                };
                let mut method = MethodDefinition::new(
                    flags(&modifiers, FlagTarget::Method)?,
                    name,
                    params.into_iter().map(parameter).collect(),
                    return_type,
                );
                method.meta = std::mem::take(&mut self.meta);
                method.position = position;
                self.define(Definition::Method(method), position)?;
            }
            Node::Field {
                modifiers,
                name,
                desc,
                value,
                position,
            } => {
                let mut field =
                    FieldDefinition::new(flags(&modifiers, FlagTarget::Field)?, name, desc);
                field.const_val = match value {
                    Some(value) => Some(const_val(&value)?),
                    None => self.pending_value.take(),
                };
                field.meta = std::mem::take(&mut self.meta);
                field.position = position;
                self.define(Definition::Field(field), position)?;
            }
            Node::Label(label) => self.code.push(CodeEntry::Label(Label {
                name: label.value,
                position: label.position,
            })),
            Node::TryCatch {
                start,
                end,
                handler,
                exception_type,
                position,
            } => self.code.push(CodeEntry::TryCatch(TryCatch {
                start,
                end,
                handler,
                exception_type,
                position,
            })),
            Node::Line {
                label,
                line,
                position,
            } => {
                let number = int(&line)?;
                let line = u32::try_from(number).map_err(|_| {
                    ParseError::new(format!("Invalid line number: {}", number), line.position)
                })?;
                self.code.add_instruction(Instruction::at(
                    Operation::Line { label, line },
                    position,
                ));
            }
            Node::Expression(expr) => self.code.push(CodeEntry::Expression(Expression {
                code: expr.value,
                position: expr.position,
            })),
            Node::Instruction {
                opcode,
                operands,
                position,
            } => {
                let operation = operation(opcode, operands, position)?;
                self.code
                    .add_instruction(Instruction::at(operation, position));
            }
            Node::Comment(comment) => self.code.push(CodeEntry::Comment(Comment {
                text: comment.value,
                position: comment.position,
            })),
            Node::Unmatched(_) => {}
        }
        Ok(())
    }

    fn define(&mut self, definition: Definition, position: Position) -> Result<()> {
        if self.definition.is_some() {
            return Err(ParseError::new("Only one definition is allowed", position));
        }
        self.definition = Some(definition);
        Ok(())
    }

    /// Joins a word onto a directly preceding unmatched span, whitespace
    /// included, or starts a new one.
    fn unmatched(&mut self, word: Spanned<String>) {
        if self.merge_unmatched {
            if let Some(CodeEntry::Unmatched(last)) = self.code.entries_mut().last_mut() {
                last.position = last.position.merge(word.position);
                let end = last.position.end.min(self.source.len());
                last.text = self.source[last.position.start..end].iter().collect();
                return;
            }
        }
        warn!("unmatched text at {}: '{}'", word.position, word.value);
        self.code.push(CodeEntry::Unmatched(Unmatched {
            text: word.value,
            position: word.position,
        }));
        self.merge_unmatched = true;
    }
}

fn flags(modifiers: &[Spanned<String>], target: FlagTarget) -> Result<AccessFlags> {
    modifiers.iter().try_fold(AccessFlags::empty(), |acc, modifier| {
        AccessFlags::from_keyword(target, &modifier.value)
            .map(|flag| acc | flag)
            .ok_or_else(|| {
                ParseError::new(
                    format!("Modifier '{}' does not apply here", modifier.value),
                    modifier.position,
                )
            })
    })
}

fn parameter(param: ParamNode) -> MethodParameter {
    MethodParameter {
        desc: param.desc,
        name: param.name,
        position: param.position,
    }
}

fn number(literal: &Spanned<Literal>) -> Result<Number> {
    match &literal.value {
        Literal::Number(text) => {
            parse_number(text).map_err(|message| ParseError::new(message, literal.position))
        }
        Literal::Char(c) => Ok(Number::Int(*c as i32)),
        Literal::String(text) => Err(ParseError::new(
            format!("Expected number, found string \"{}\"", text.escape_default()),
            literal.position,
        )),
    }
}

fn int(literal: &Spanned<Literal>) -> Result<i32> {
    match number(literal)? {
        Number::Int(value) => Ok(value),
        _ => {
            let text = match &literal.value {
                Literal::Number(text) => text.clone(),
                other => format!("{:?}", other),
            };
            Err(ParseError::new(
                format!("Could not parse int from: '{}'", text),
                literal.position,
            ))
        }
    }
}

fn const_val(literal: &Spanned<Literal>) -> Result<ConstVal> {
    let value = match &literal.value {
        Literal::String(text) => ConstValue::String(text.clone()),
        _ => match number(literal)? {
            Number::Int(v) => ConstValue::Int(v),
            Number::Long(v) => ConstValue::Long(v),
            Number::Float(v) => ConstValue::Float(v),
            Number::Double(v) => ConstValue::Double(v),
        },
    };
    Ok(ConstVal {
        value,
        position: literal.position,
    })
}

fn type_value(desc: &Spanned<String>) -> Result<JvmType> {
    descriptor::parse_descriptor(&desc.value).ok_or_else(|| {
        ParseError::new(format!("Invalid descriptor: '{}'", desc.value), desc.position)
    })
}

/// Splits `owner.name` at the last dot.
fn split_member(member: &Spanned<String>) -> Result<(String, String)> {
    match member.value.rsplit_once('.') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(ParseError::new(
            format!("Expected owner.name, found '{}'", member.value),
            member.position,
        )),
    }
}

fn handle(node: &HandleNode) -> Result<HandleInfo> {
    let tag = HandleTag::from_name(&node.tag.value).ok_or_else(|| {
        ParseError::new(
            format!("Unknown handle tag '{}'", node.tag.value),
            node.tag.position,
        )
    })?;
    let (owner, name) = split_member(&node.member)?;
    Ok(HandleInfo::new(tag, owner, name, node.desc.clone()))
}

fn arg_value(node: &ArgNode) -> Result<ArgValue> {
    match node {
        ArgNode::Literal(literal) => Ok(match &literal.value {
            Literal::String(text) => ArgValue::String(text.clone()),
            _ => match number(literal)? {
                Number::Int(v) => ArgValue::Int(v),
                Number::Long(v) => ArgValue::Long(v),
                Number::Float(v) => ArgValue::Float(v),
                Number::Double(v) => ArgValue::Double(v),
            },
        }),
        ArgNode::Type(desc) => type_value(desc).map(ArgValue::Type),
        ArgNode::Handle(node) => handle(node).map(ArgValue::Handle),
    }
}

fn annotation(node: AnnotationNode) -> Result<Annotation> {
    let mut annotation = Annotation::new(node.visible, node.anno_type);
    annotation.position = node.position;
    for (name, arg) in node.args {
        let Some(name) = name else {
            return Err(ParseError::new(
                "Annotation argument did not contain name!",
                node.position,
            ));
        };
        annotation.set_arg(name, annotation_arg(arg)?);
    }
    Ok(annotation)
}

fn annotation_arg(node: AnnoArgNode) -> Result<AnnoArg> {
    Ok(match node {
        AnnoArgNode::Literal(literal) => match &literal.value {
            Literal::String(text) => AnnoArg::String(text.clone()),
            _ => match number(&literal)? {
                Number::Int(v) => AnnoArg::Int(v),
                Number::Long(v) => AnnoArg::Long(v),
                Number::Float(v) => AnnoArg::Float(v),
                Number::Double(v) => AnnoArg::Double(v),
            },
        },
        AnnoArgNode::Type(desc) => AnnoArg::Type(type_value(&desc)?),
        AnnoArgNode::Handle(node) => AnnoArg::Handle(handle(&node)?),
        AnnoArgNode::Enum { enum_type, name } => AnnoArg::Enum { enum_type, name },
        AnnoArgNode::Annotation(nested) => AnnoArg::Annotation(annotation(nested)?),
        AnnoArgNode::List(values) => AnnoArg::List(
            values
                .into_iter()
                .map(annotation_arg)
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn newarray_type(word: &Spanned<String>) -> Result<JvmType> {
    let text = word.value.as_str();
    let ty = descriptor::parse_field_descriptor(text)
        .or_else(|| descriptor::primitive_by_name(text))
        .or_else(|| text.parse::<i32>().ok().and_then(descriptor::newarray_type));
    ty.ok_or_else(|| ParseError::new(format!("Unknown array type: '{}'", text), word.position))
}

fn operation(opcode: Opcode, operands: Operands, position: Position) -> Result<Operation> {
    let operation = match operands {
        Operands::None => Operation::Insn(opcode),
        Operands::Int(value) => Operation::Int {
            op: opcode,
            value: int(&value)?,
        },
        Operands::NewArray(word) => Operation::NewArray(newarray_type(&word)?),
        Operands::Var(name) => Operation::Var { op: opcode, name },
        Operands::Type(desc) => Operation::Type { op: opcode, desc },
        Operands::Field { member, desc } => {
            let (owner, name) = split_member(&member)?;
            Operation::Field {
                op: opcode,
                owner,
                name,
                desc,
            }
        }
        Operands::Method { member, desc, itf } => {
            let (owner, name) = split_member(&member)?;
            Operation::Method {
                op: opcode,
                owner,
                name,
                desc,
                itf,
            }
        }
        Operands::InvokeDynamic {
            name,
            desc,
            bsm,
            args,
        } => Operation::InvokeDynamic {
            name,
            desc,
            bsm: handle(&bsm)?,
            args: args.iter().map(arg_value).collect::<Result<Vec<_>>>()?,
        },
        Operands::Ldc(arg) => Operation::Ldc(arg_value(&arg)?),
        Operands::Jump(label) => Operation::Jump { op: opcode, label },
        Operands::Iinc { var, increment } => Operation::Iinc {
            name: var,
            increment: int(&increment)?,
        },
        Operands::MultiANewArray { desc, dims } => {
            let count = int(&dims)?;
            let dims = u8::try_from(count).map_err(|_| {
                ParseError::new(format!("Invalid array dimensions: {}", count), position)
            })?;
            Operation::MultiANewArray { desc, dims }
        }
        Operands::TableSwitch {
            min,
            max,
            labels,
            default,
        } => {
            let (min, max) = (int(&min)?, int(&max)?);
            let cases = i64::from(max) - i64::from(min) + 1;
            if cases < 1 || cases != labels.len() as i64 {
                return Err(ParseError::new(
                    format!(
                        "Table switch range {}:{} needs {} offsets, found {}",
                        min,
                        max,
                        cases.max(0),
                        labels.len()
                    ),
                    position,
                ));
            }
            Operation::TableSwitch {
                min,
                max,
                labels,
                default,
            }
        }
        Operands::LookupSwitch { entries, default } => Operation::LookupSwitch {
            entries: entries
                .iter()
                .map(|(key, label)| {
                    Ok(SwitchEntry {
                        key: int(key)?,
                        label: label.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            default,
        },
    };
    Ok(operation)
}
