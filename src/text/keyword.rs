//! Upper-case keyword syntax: `INVOKEVIRTUAL a/B.m()V`, operands grouped as
//! `range(0:2)`, `mapping(1=A)` and friends.

use crate::opcode::{InsnKind, Opcode};

use super::node::{AnnoArgNode, AnnotationNode, ArgNode, HandleNode, Node, Operands, Spanned};
use super::rules;
use super::scanner::Scanner;
use super::ParseError;

pub(crate) fn parse(s: &mut Scanner) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();
    let mut defined = false;
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
        if let Some(node) = construct(s, &word)? {
            nodes.push(node);
            continue;
        }
        if !defined {
            if let Some(node) = definition(s)? {
                nodes.push(node);
                defined = true;
                continue;
            }
        }
        if let Some(name) = rules::label_decl(&word) {
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
    Ok(nodes)
}

/// Upper-case keywords that introduce meta data or code constructs.
fn construct(s: &mut Scanner, word: &str) -> Result<Option<Node>, ParseError> {
    let mark = s.mark();
    let node = match word.to_ascii_uppercase().as_str() {
        "SIGNATURE" => {
            s.word();
            let value = s.required_word("signature")?;
            Node::Signature(Spanned::new(value, s.since(mark)))
        }
        "THROWS" => {
            s.word();
            let value = s.required_word("exception type")?;
            Node::Throws(Spanned::new(value, s.since(mark)))
        }
        "VALUE" => {
            s.word();
            Node::Value(rules::literal(s)?)
        }
        "DEPRECATED" => {
            s.word();
            Node::Deprecated(s.since(mark))
        }
        "VISIBLE_ANNOTATION" | "INVISIBLE_ANNOTATION" => {
            let visible = word.eq_ignore_ascii_case("VISIBLE_ANNOTATION");
            s.word();
            s.skip_trivia();
            let mut annotation = annotation(s, visible)?;
            annotation.position = s.since(mark);
            Node::Annotation(annotation)
        }
        "TRY" => {
            s.word();
            let start = s.required_word("try start label")?;
            let end = s.required_word("try end label")?;
            s.skip_trivia();
            if !s.eat_keyword("CATCH") {
                return Err(s.error("Expected CATCH"));
            }
            s.expect('(')?;
            s.skip_trivia();
            let caught = s.read_until(|c| c == ')');
            s.expect(')')?;
            let handler = s.required_word("handler label")?;
            Node::TryCatch {
                start,
                end,
                handler,
                exception_type: (caught != "*").then_some(caught),
                position: s.since(mark),
            }
        }
        "LINE" => {
            s.word();
            let label = s.required_word("line label")?;
            let line = rules::literal(s)?;
            Node::Line {
                label,
                line,
                position: s.since(mark),
            }
        }
        "EXPR" => {
            s.word();
            let text = s.text_until_word("END")?;
            Node::Expression(Spanned::new(text, s.since(mark)))
        }
        _ => return Ok(None),
    };
    Ok(Some(node))
}

/// `<modifiers> <name>(<params>)<ret>` or `<modifiers> <name> <desc>`.
///
/// Backs off and returns `None` when the text doesn't have that shape.
fn definition(s: &mut Scanner) -> Result<Option<Node>, ParseError> {
    let mark = s.mark();
    let modifiers = rules::modifiers(s);
    let name = s.read_until(|c| c == '(');
    if name.is_empty() || rules::label_decl(&name).is_some() {
        s.reset(mark);
        return Ok(None);
    }
    if s.peek() == Some('(') {
        let (params, return_type) = rules::method_signature(s)?;
        return Ok(Some(Node::Method {
            modifiers,
            name,
            params,
            return_type,
            position: s.since(mark),
        }));
    }
    s.skip_whitespace();
    match s.descriptor() {
        Some(desc) if !desc.starts_with('(') && s.peek().map_or(true, char::is_whitespace) => {
            Ok(Some(Node::Field {
                modifiers,
                name,
                desc,
                value: None,
                position: s.since(mark),
            }))
        }
        _ => {
            s.reset(mark);
            Ok(None)
        }
    }
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
            let bsm = handle(s)?;
            s.skip_trivia();
            if !s.eat_keyword("args") {
                return Err(s.error("Expected args(...)"));
            }
            s.expect('(')?;
            let mut args = Vec::new();
            loop {
                s.skip_trivia();
                if s.eat(')') {
                    break;
                }
                args.push(constant(s)?);
                s.skip_trivia();
                s.eat(',');
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
            group(s, "range")?;
            let min = rules::literal(s)?;
            s.skip_trivia();
            s.expect(':')?;
            let max = rules::literal(s)?;
            s.skip_trivia();
            s.expect(')')?;
            group(s, "offsets")?;
            let labels = label_list(s)?;
            let default = default_label(s)?;
            Operands::TableSwitch {
                min,
                max,
                labels,
                default,
            }
        }
        InsnKind::LookupSwitch => {
            group(s, "mapping")?;
            let mut entries = Vec::new();
            loop {
                s.skip_trivia();
                if s.eat(')') {
                    break;
                }
                let key = rules::literal(s)?;
                s.skip_trivia();
                s.expect('=')?;
                entries.push((key, rules::label_ref(s)?));
                s.skip_trivia();
                s.eat(',');
            }
            let default = default_label(s)?;
            Operands::LookupSwitch { entries, default }
        }
    };
    Ok(operands)
}

/// `INVOKESTATIC a/I.m()V itf` marks an interface owner for opcodes where
/// the opcode alone doesn't say so.
pub(crate) fn interface_suffix(s: &mut Scanner, opcode: Opcode) -> bool {
    let mark = s.mark();
    s.skip_whitespace();
    if s.eat_keyword("itf") {
        return true;
    }
    s.reset(mark);
    opcode == Opcode::Invokeinterface
}

/// `<keyword>(`
fn group(s: &mut Scanner, keyword: &str) -> Result<(), ParseError> {
    s.skip_trivia();
    if !s.eat_keyword(keyword) {
        return Err(s.error(format!("Expected {}(...)", keyword)));
    }
    s.expect('(')
}

fn label_list(s: &mut Scanner) -> Result<Vec<String>, ParseError> {
    let mut labels = Vec::new();
    loop {
        s.skip_trivia();
        if s.eat(')') {
            return Ok(labels);
        }
        labels.push(rules::label_ref(s)?);
        s.skip_trivia();
        s.eat(',');
    }
}

fn default_label(s: &mut Scanner) -> Result<String, ParseError> {
    group(s, "default")?;
    let label = rules::label_ref(s)?;
    s.skip_trivia();
    s.expect(')')?;
    Ok(label)
}

fn handle(s: &mut Scanner) -> Result<HandleNode, ParseError> {
    if !s.eat_keyword("handle") {
        return Err(s.error("Expected handle(...)"));
    }
    s.expect('(')?;
    let handle = rules::handle_body(s)?;
    s.skip_trivia();
    s.expect(')')?;
    Ok(handle)
}

/// `ldc` operand or bootstrap argument.
fn constant(s: &mut Scanner) -> Result<ArgNode, ParseError> {
    if rules::at_literal(s) {
        return Ok(ArgNode::Literal(rules::literal(s)?));
    }
    if s.peek_word().to_ascii_lowercase().starts_with("handle(") {
        return Ok(ArgNode::Handle(handle(s)?));
    }
    Ok(ArgNode::Type(rules::type_constant(s)?))
}

/// `<type>(<name>=<arg>, ...)`, positioned after the annotation keyword.
fn annotation(s: &mut Scanner, visible: bool) -> Result<AnnotationNode, ParseError> {
    let mark = s.mark();
    let anno_type = s.read_until(|c| c == '(');
    if anno_type.is_empty() {
        return Err(s.error("Missing annotation type"));
    }
    s.expect('(')?;
    let mut args = Vec::new();
    loop {
        s.skip_trivia();
        if s.eat(')') {
            break;
        }
        if s.at_end() {
            return Err(s.error_since(mark, "Unterminated annotation"));
        }
        args.push((arg_name(s), annotation_arg(s, visible)?));
        s.skip_trivia();
        s.eat(',');
    }
    Ok(AnnotationNode {
        visible,
        anno_type,
        args,
        position: s.since(mark),
    })
}

fn arg_name(s: &mut Scanner) -> Option<String> {
    let mark = s.mark();
    let name = s.read_until(|c| matches!(c, '=' | ',' | ')' | '(' | '"' | '\'' | '['));
    s.skip_whitespace();
    if !name.is_empty() && s.eat('=') {
        Some(name)
    } else {
        s.reset(mark);
        None
    }
}

fn annotation_arg(s: &mut Scanner, visible: bool) -> Result<AnnoArgNode, ParseError> {
    s.skip_trivia();
    if s.eat('[') {
        let mut values = Vec::new();
        loop {
            s.skip_trivia();
            if s.eat(']') {
                return Ok(AnnoArgNode::List(values));
            }
            if s.at_end() {
                return Err(s.error("Unterminated annotation list"));
            }
            values.push(annotation_arg(s, visible)?);
            s.skip_trivia();
            s.eat(',');
        }
    }
    if rules::at_literal(s) {
        return Ok(AnnoArgNode::Literal(rules::literal(s)?));
    }
    let head = s.peek_word().to_ascii_lowercase();
    if head.starts_with("handle(") {
        return Ok(AnnoArgNode::Handle(handle(s)?));
    }
    if head.starts_with("enum(") {
        s.eat_keyword("enum");
        s.expect('(')?;
        let enum_type = s.required_word("enum type")?;
        s.skip_trivia();
        let name = s.read_until(|c| c == ')');
        if name.is_empty() {
            return Err(s.error("Missing enum constant name"));
        }
        s.expect(')')?;
        return Ok(AnnoArgNode::Enum { enum_type, name });
    }
    if head.starts_with("annotation(") {
        s.eat_keyword("annotation");
        s.expect('(')?;
        s.skip_trivia();
        let nested = annotation(s, visible)?;
        s.skip_trivia();
        s.expect(')')?;
        return Ok(AnnoArgNode::Annotation(nested));
    }
    Ok(AnnoArgNode::Type(rules::type_constant(s)?))
}
