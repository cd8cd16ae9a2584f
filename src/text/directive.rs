//! Lower-case directive syntax: `method ... end` blocks, `catch`/`line`
//! directives, and operands spelled as plain word sequences.

use crate::opcode::{InsnKind, Opcode};

use super::keyword::interface_suffix;
use super::node::{AnnoArgNode, AnnotationNode, ArgNode, Node, Operands, Spanned};
use super::rules;
use super::scanner::{Mark, Scanner};
use super::ParseError;

pub(crate) fn parse(s: &mut Scanner) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();
    let mut defined = false;
    let mut open_method = None;
    loop {
        s.skip_whitespace();
        let mark = s.mark();
        if let Some(text) = s.comment() {
            nodes.push(Node::Comment(Spanned::new(text, s.since(mark))));
            continue;
        }
        if s.at_end() {
            break;
        }
        let word = s.peek_word();
        let lower = word.to_ascii_lowercase();
        match lower.as_str() {
            "method" if !defined => {
                s.word();
                nodes.push(method(s, mark)?);
                defined = true;
                open_method = Some(s.since(mark));
            }
            "field" if !defined => {
                s.word();
                nodes.push(field(s, mark)?);
                defined = true;
            }
            "end" if open_method.is_some() => {
                s.word();
                open_method = None;
            }
            _ => {
                if let Some(node) = construct(s, &lower)? {
                    nodes.push(node);
                } else if let Some(name) = rules::label_decl(&word) {
                    s.word();
                    nodes.push(Node::Label(Spanned::new(name.to_string(), s.since(mark))));
                } else if let Some(opcode) = Opcode::from_name(&word) {
                    s.word();
                    let operands = operands(s, opcode)?;
                    nodes.push(Node::Instruction {
                        opcode,
                        operands,
                        position: s.since(mark),
                    });
                } else {
                    s.word();
                    nodes.push(Node::Unmatched(Spanned::new(word, s.since(mark))));
                }
            }
        }
    }
    if let Some(position) = open_method {
        return Err(ParseError::new("Method body is missing 'end'", position));
    }
    Ok(nodes)
}

fn method(s: &mut Scanner, mark: Mark) -> Result<Node, ParseError> {
    s.skip_trivia();
    let modifiers = rules::modifiers(s);
    let name = s.read_until(|c| c == '(');
    if name.is_empty() {
        return Err(s.error_since(mark, "Missing method name"));
    }
    s.skip_whitespace();
    if s.peek() != Some('(') {
        return Err(s.error("Expected '(' after method name"));
    }
    let (params, return_type) = rules::method_signature(s)?;
    Ok(Node::Method {
        modifiers,
        name,
        params,
        return_type,
        position: s.since(mark),
    })
}

fn field(s: &mut Scanner, mark: Mark) -> Result<Node, ParseError> {
    s.skip_trivia();
    let modifiers = rules::modifiers(s);
    let name = s.required_word("field name")?;
    s.skip_trivia();
    let desc = s.descriptor().filter(|desc| !desc.starts_with('('));
    let Some(desc) = desc else {
        let found = s.peek_word();
        return Err(s.error(format!("Invalid field descriptor: '{}'", found)));
    };
    let after_desc = s.mark();
    let value = if rules::at_literal(s) {
        Some(rules::literal(s)?)
    } else {
        s.reset(after_desc);
        None
    };
    Ok(Node::Field {
        modifiers,
        name,
        desc,
        value,
        position: s.since(mark),
    })
}

/// Directives other than the definition itself. `word` is lower-cased.
fn construct(s: &mut Scanner, word: &str) -> Result<Option<Node>, ParseError> {
    let mark = s.mark();
    let node = match word {
        "signature" => {
            s.word();
            let value = s.required_word("signature")?;
            Node::Signature(Spanned::new(value, s.since(mark)))
        }
        "throws" => {
            s.word();
            let value = s.required_word("exception type")?;
            Node::Throws(Spanned::new(value, s.since(mark)))
        }
        "value" => {
            s.word();
            Node::Value(rules::literal(s)?)
        }
        "deprecated" => {
            s.word();
            Node::Deprecated(s.since(mark))
        }
        "annotation" | "invisible-annotation" => {
            s.word();
            let mut annotation = annotation(s, word == "annotation")?;
            annotation.position = s.since(mark);
            Node::Annotation(annotation)
        }
        "catch" => {
            s.word();
            let caught = s.required_word("exception type")?;
            let start = s.required_word("try start label")?;
            let end = s.required_word("try end label")?;
            let handler = s.required_word("handler label")?;
            Node::TryCatch {
                start,
                end,
                handler,
                exception_type: (caught != "*").then_some(caught),
                position: s.since(mark),
            }
        }
        "line" => {
            s.word();
            let label = s.required_word("line label")?;
            let line = rules::literal(s)?;
            Node::Line {
                label,
                line,
                position: s.since(mark),
            }
        }
        "expr" => {
            s.word();
            let text = s.text_until_word("end")?;
            Node::Expression(Spanned::new(text, s.since(mark)))
        }
        _ => return Ok(None),
    };
    Ok(Some(node))
}

fn operands(s: &mut Scanner, opcode: Opcode) -> Result<Operands, ParseError> {
    let operands = match opcode.kind() {
        InsnKind::Insn => Operands::None,
        InsnKind::Int => Operands::Int(rules::literal(s)?),
        InsnKind::NewArray => {
            s.skip_trivia();
            let mark = s.mark();
            let word = s.required_word("array type")?;
            Operands::NewArray(Spanned::new(word, s.since(mark)))
        }
        InsnKind::Var => Operands::Var(s.required_word("variable name")?),
        InsnKind::Type => Operands::Type(s.required_word("type")?),
        InsnKind::Field => {
            let member = rules::member(s)?;
            let desc = rules::member_desc(s)?;
            Operands::Field { member, desc }
        }
        InsnKind::Method => {
            let member = rules::member(s)?;
            let desc = rules::member_desc(s)?;
            Operands::Method {
                member,
                desc,
                itf: interface_suffix(s, opcode),
            }
        }
        InsnKind::InvokeDynamic => {
            let name = s.required_word("name")?;
            let desc = rules::member_desc(s)?;
            s.skip_trivia();
            if !s.eat_keyword("handle") {
                return Err(s.error("Expected bootstrap handle"));
            }
            let bsm = rules::handle_body(s)?;
            s.skip_trivia();
            if !s.eat_keyword("args") {
                return Err(s.error("Expected bootstrap args"));
            }
            let mut args = Vec::new();
            while !at_end_keyword(s)? {
                args.push(constant(s)?);
            }
            Operands::InvokeDynamic {
                name,
                desc,
                bsm,
                args,
            }
        }
        InsnKind::Jump => Operands::Jump(s.required_word("jump label")?),
        InsnKind::Ldc => Operands::Ldc(constant(s)?),
        InsnKind::Iinc => {
            let var = s.required_word("variable name")?;
            let increment = rules::literal(s)?;
            Operands::Iinc { var, increment }
        }
        InsnKind::MultiANewArray => {
            let desc = s.required_word("array descriptor")?;
            let dims = rules::literal(s)?;
            Operands::MultiANewArray { desc, dims }
        }
        InsnKind::TableSwitch => {
            let min = rules::literal(s)?;
            let max = rules::literal(s)?;
            let mut labels = Vec::new();
            loop {
                let label = s.required_word("switch label")?;
                if label.eq_ignore_ascii_case("default") {
                    break;
                }
                labels.push(label);
            }
            let default = s.required_word("default label")?;
            Operands::TableSwitch {
                min,
                max,
                labels,
                default,
            }
        }
        InsnKind::LookupSwitch => {
            let mut entries = Vec::new();
            loop {
                let keyword = s.required_word("case or default")?;
                if keyword.eq_ignore_ascii_case("default") {
                    break;
                }
                if !keyword.eq_ignore_ascii_case("case") {
                    return Err(s.error(format!("Expected case or default, found '{}'", keyword)));
                }
                let key = rules::literal(s)?;
                entries.push((key, s.required_word("case label")?));
            }
            let default = s.required_word("default label")?;
            Operands::LookupSwitch { entries, default }
        }
    };
    Ok(operands)
}

/// Consumes a closing `end` if it is next. Running out of input first is an
/// error.
fn at_end_keyword(s: &mut Scanner) -> Result<bool, ParseError> {
    s.skip_trivia();
    if s.at_end() {
        return Err(s.error("Missing 'end'"));
    }
    Ok(s.eat_keyword("end"))
}

/// `ldc` operand or bootstrap argument.
fn constant(s: &mut Scanner) -> Result<ArgNode, ParseError> {
    if rules::at_literal(s) {
        return Ok(ArgNode::Literal(rules::literal(s)?));
    }
    let mark = s.mark();
    let keyword = s.word();
    match keyword.to_ascii_lowercase().as_str() {
        "type" => Ok(ArgNode::Type(rules::type_constant(s)?)),
        "handle" => Ok(ArgNode::Handle(rules::handle_body(s)?)),
        _ => Err(s.error_since(mark, format!("Expected constant, found '{}'", keyword))),
    }
}

/// `<type> (<name> <arg>)* end`, positioned after the annotation keyword.
fn annotation(s: &mut Scanner, visible: bool) -> Result<AnnotationNode, ParseError> {
    let mark = s.mark();
    let anno_type = s.required_word("annotation type")?;
    let mut args = Vec::new();
    while !at_end_keyword(s)? {
        let name = s.word();
        args.push((Some(name), annotation_arg(s, visible)?));
    }
    Ok(AnnotationNode {
        visible,
        anno_type,
        args,
        position: s.since(mark),
    })
}

fn annotation_arg(s: &mut Scanner, visible: bool) -> Result<AnnoArgNode, ParseError> {
    if rules::at_literal(s) {
        return Ok(AnnoArgNode::Literal(rules::literal(s)?));
    }
    let mark = s.mark();
    let keyword = s.word();
    let arg = match keyword.to_ascii_lowercase().as_str() {
        "type" => AnnoArgNode::Type(rules::type_constant(s)?),
        "handle" => AnnoArgNode::Handle(rules::handle_body(s)?),
        "annotation-enum" => {
            let enum_type = s.required_word("enum type")?;
            let name = s.required_word("enum constant name")?;
            AnnoArgNode::Enum { enum_type, name }
        }
        "annotation" => AnnoArgNode::Annotation(annotation(s, visible)?),
        "args" => {
            let mut values = Vec::new();
            while !at_end_keyword(s)? {
                values.push(annotation_arg(s, visible)?);
            }
            AnnoArgNode::List(values)
        }
        _ => {
            return Err(s.error_since(
                mark,
                format!("Unknown annotation argument: '{}'", keyword),
            ))
        }
    };
    Ok(arg)
}
