//! Unit to text, in either syntax. Parsing the output gives back the same
//! unit up to positions.

use std::fmt::Write;

use crate::ast::*;
use crate::types::{AccessFlags, FlagTarget};

use super::literal::{format_double, format_float, quote};
use super::{PrintOptions, Syntax};

pub(crate) fn print(unit: &Unit, options: &PrintOptions) -> String {
    let mut printer = Printer {
        out: String::new(),
        options,
        keyword: options.syntax == Syntax::Keyword,
    };
    match &unit.definition {
        Definition::Method(method) => printer.method(method, &unit.code_or_empty()),
        Definition::Field(field) => printer.field(field, &unit.code_or_empty()),
        Definition::Class(class) => printer.class(class),
    }
    printer.out
}

struct Printer<'o> {
    out: String,
    options: &'o PrintOptions,
    keyword: bool,
}

impl Printer<'_> {
    fn line(&mut self, indented: bool, text: &str) {
        if indented {
            self.out.push_str(&self.options.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Mnemonic or keyword in the case the syntax uses.
    fn word(&self, lower: &str) -> String {
        if self.keyword {
            lower.to_ascii_uppercase()
        } else {
            lower.to_string()
        }
    }

    fn meta(&mut self, meta: &DefinitionMeta) {
        if let Some(signature) = &meta.signature {
            self.line(false, &format!("{} {}", self.word("signature"), signature.value));
        }
        for thrown in &meta.thrown {
            self.line(false, &format!("{} {}", self.word("throws"), thrown.exception_type));
        }
        if meta.deprecated {
            self.line(false, &self.word("deprecated"));
        }
        for annotation in &meta.annotations {
            let text = self.annotation(annotation);
            self.line(false, &text);
        }
    }

    fn method(&mut self, method: &MethodDefinition, code: &Code) {
        self.meta(&method.meta);
        let params = method
            .params
            .iter()
            .map(|p| format!("{} {}", p.desc, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let header = format!(
            "{}{}({}){}",
            modifiers(method.modifiers, FlagTarget::Method),
            method.name,
            params,
            method.return_type
        );
        if self.keyword {
            self.line(false, &header);
            self.code(code);
        } else {
            self.line(false, &format!("method {}", header.replacen('(', " (", 1)));
            self.code(code);
            self.line(false, "end");
        }
    }

    fn field(&mut self, field: &FieldDefinition, code: &Code) {
        self.meta(&field.meta);
        let header = format!(
            "{}{} {}",
            modifiers(field.modifiers, FlagTarget::Field),
            field.name,
            field.desc
        );
        if self.keyword {
            if let Some(value) = &field.const_val {
                self.line(false, &format!("VALUE {}", const_value(&value.value)));
            }
            self.line(false, &header);
        } else {
            match &field.const_val {
                Some(value) => {
                    self.line(false, &format!("field {} {}", header, const_value(&value.value)))
                }
                None => self.line(false, &format!("field {}", header)),
            }
        }
        self.code(code);
    }

    /// Classes print as a member listing headed by a comment; the result is
    /// for reading and does not parse as one unit.
    fn class(&mut self, class: &ClassDefinition) {
        let mut header = format!(
            "// {}class {}",
            modifiers(class.modifiers, FlagTarget::Class),
            class.name
        );
        if let Some(super_name) = &class.super_name {
            let _ = write!(header, " extends {}", super_name);
        }
        if !class.interfaces.is_empty() {
            let _ = write!(header, " implements {}", class.interfaces.join(", "));
        }
        self.line(false, &header);
        self.meta(&class.meta);
        for field in &class.fields {
            self.out.push('\n');
            self.field(field, &Code::EMPTY);
        }
        for method in &class.methods {
            self.out.push('\n');
            self.method(&method.definition, &method.code);
        }
    }

    fn code(&mut self, code: &Code) {
        for entry in code.entries() {
            match entry {
                CodeEntry::Instruction(insn) => {
                    let text = self.instruction(&insn.operation);
                    self.line(true, &text);
                }
                CodeEntry::Label(label) => self.line(false, &format!("{}:", label.name)),
                CodeEntry::TryCatch(tc) => {
                    let caught = tc.exception_type.as_deref().unwrap_or("*");
                    let text = if self.keyword {
                        format!(
                            "TRY {} {} CATCH({}) {}",
                            tc.start, tc.end, caught, tc.handler
                        )
                    } else {
                        format!("catch {} {} {} {}", caught, tc.start, tc.end, tc.handler)
                    };
                    self.line(true, &text);
                }
                CodeEntry::ThrownException(thrown) => {
                    let text = format!("{} {}", self.word("throws"), thrown.exception_type);
                    self.line(true, &text);
                }
                CodeEntry::Signature(signature) => {
                    let text = format!("{} {}", self.word("signature"), signature.value);
                    self.line(true, &text);
                }
                CodeEntry::ConstVal(value) => {
                    let text = format!("{} {}", self.word("value"), const_value(&value.value));
                    self.line(true, &text);
                }
                CodeEntry::Annotation(annotation) => {
                    let text = self.annotation(annotation);
                    self.line(true, &text);
                }
                CodeEntry::Comment(comment) => self.line(true, &comment.text),
                CodeEntry::Unmatched(unmatched) => self.line(true, &unmatched.text),
                CodeEntry::Expression(expr) => {
                    let text = format!("{} {} {}", self.word("expr"), expr.code, self.word("end"));
                    self.line(true, &text);
                }
            }
        }
    }

    fn instruction(&self, operation: &Operation) -> String {
        let mnemonic = |op: crate::opcode::Opcode| self.word(op.name());
        match operation {
            Operation::Insn(op) => mnemonic(*op),
            Operation::Int { op, value } => format!("{} {}", mnemonic(*op), value),
            Operation::NewArray(ty) => format!("{} {}", self.word("newarray"), ty.descriptor()),
            Operation::Var { op, name } => format!("{} {}", mnemonic(*op), name),
            Operation::Type { op, desc } => format!("{} {}", mnemonic(*op), desc),
            Operation::Field {
                op,
                owner,
                name,
                desc,
            } => format!("{} {}.{} {}", mnemonic(*op), owner, name, desc),
            Operation::Method {
                op,
                owner,
                name,
                desc,
                itf,
            } => {
                let suffix = if *itf && *op != crate::opcode::Opcode::Invokeinterface {
                    " itf"
                } else {
                    ""
                };
                format!("{} {}.{}{}{}", mnemonic(*op), owner, name, desc, suffix)
            }
            Operation::InvokeDynamic {
                name,
                desc,
                bsm,
                args,
            } => {
                let args: Vec<_> = args.iter().map(|a| self.arg_value(a)).collect();
                if self.keyword {
                    format!(
                        "INVOKEDYNAMIC {} {} {} args({})",
                        name,
                        desc,
                        self.handle(bsm),
                        args.join(", ")
                    )
                } else {
                    let mut text =
                        format!("invokedynamic {} {} {} args", name, desc, self.handle(bsm));
                    for arg in args {
                        text.push(' ');
                        text.push_str(&arg);
                    }
                    text.push_str(" end");
                    text
                }
            }
            Operation::Ldc(value) => format!("{} {}", self.word("ldc"), self.arg_value(value)),
            Operation::Jump { op, label } => format!("{} {}", mnemonic(*op), label),
            Operation::Iinc { name, increment } => {
                format!("{} {} {}", self.word("iinc"), name, increment)
            }
            Operation::MultiANewArray { desc, dims } => {
                format!("{} {} {}", self.word("multianewarray"), desc, dims)
            }
            Operation::LookupSwitch { entries, default } => {
                if self.keyword {
                    let mapping: Vec<_> = entries
                        .iter()
                        .map(|e| format!("{}={}", e.key, e.label))
                        .collect();
                    format!(
                        "LOOKUPSWITCH mapping({}) default({})",
                        mapping.join(", "),
                        default
                    )
                } else {
                    let mut text = String::from("lookupswitch");
                    for e in entries {
                        let _ = write!(text, " case {} {}", e.key, e.label);
                    }
                    let _ = write!(text, " default {}", default);
                    text
                }
            }
            Operation::TableSwitch {
                min,
                max,
                labels,
                default,
            } => {
                if self.keyword {
                    format!(
                        "TABLESWITCH range({}:{}) offsets({}) default({})",
                        min,
                        max,
                        labels.join(", "),
                        default
                    )
                } else {
                    let mut text = format!("tableswitch {} {}", min, max);
                    for label in labels {
                        text.push(' ');
                        text.push_str(label);
                    }
                    let _ = write!(text, " default {}", default);
                    text
                }
            }
            Operation::Line { label, line } => format!("{} {} {}", self.word("line"), label, line),
        }
    }

    fn handle(&self, handle: &HandleInfo) -> String {
        if self.keyword {
            format!(
                "handle({} {}.{} {})",
                handle.tag.name(),
                handle.owner,
                handle.name,
                handle.desc
            )
        } else {
            format!(
                "handle {} {}.{} {}",
                handle.tag.name(),
                handle.owner,
                handle.name,
                handle.desc
            )
        }
    }

    fn arg_value(&self, value: &ArgValue) -> String {
        match value {
            ArgValue::Int(v) => v.to_string(),
            ArgValue::Long(v) => format!("{}L", v),
            ArgValue::Float(v) => format_float(*v),
            ArgValue::Double(v) => format_double(*v),
            ArgValue::String(v) => quote(v),
            ArgValue::Type(ty) if self.keyword => ty.descriptor(),
            ArgValue::Type(ty) => format!("type {}", ty.descriptor()),
            ArgValue::Handle(handle) => self.handle(handle),
        }
    }

    fn annotation(&self, annotation: &Annotation) -> String {
        if self.keyword {
            let args: Vec<_> = annotation
                .args
                .iter()
                .map(|(name, arg)| format!("{}={}", name, self.anno_arg(arg)))
                .collect();
            let keyword = if annotation.visible {
                "VISIBLE_ANNOTATION"
            } else {
                "INVISIBLE_ANNOTATION"
            };
            format!("{} {}", keyword, self.annotation_body(annotation, &args))
        } else {
            let keyword = if annotation.visible {
                "annotation"
            } else {
                "invisible-annotation"
            };
            format!("{} {}", keyword, self.annotation_body(annotation, &[]))
        }
    }

    /// Type and arguments; the keyword form takes its pre-rendered `args`.
    fn annotation_body(&self, annotation: &Annotation, args: &[String]) -> String {
        if self.keyword {
            return format!("{}({})", annotation.anno_type, args.join(", "));
        }
        let mut text = annotation.anno_type.clone();
        for (name, arg) in &annotation.args {
            let _ = write!(text, " {} {}", name, self.anno_arg(arg));
        }
        text.push_str(" end");
        text
    }

    fn anno_arg(&self, arg: &AnnoArg) -> String {
        match arg {
            AnnoArg::Int(v) => v.to_string(),
            AnnoArg::Long(v) => format!("{}L", v),
            AnnoArg::Float(v) => format_float(*v),
            AnnoArg::Double(v) => format_double(*v),
            AnnoArg::String(v) => quote(v),
            AnnoArg::Type(ty) if self.keyword => ty.descriptor(),
            AnnoArg::Type(ty) => format!("type {}", ty.descriptor()),
            AnnoArg::Handle(handle) => self.handle(handle),
            AnnoArg::Enum { enum_type, name } if self.keyword => {
                format!("enum({} {})", enum_type, name)
            }
            AnnoArg::Enum { enum_type, name } => format!("annotation-enum {} {}", enum_type, name),
            AnnoArg::Annotation(nested) if self.keyword => {
                let args: Vec<_> = nested
                    .args
                    .iter()
                    .map(|(name, arg)| format!("{}={}", name, self.anno_arg(arg)))
                    .collect();
                format!("annotation({})", self.annotation_body(nested, &args))
            }
            AnnoArg::Annotation(nested) => {
                format!("annotation {}", self.annotation_body(nested, &[]))
            }
            AnnoArg::List(values) => {
                let values: Vec<_> = values.iter().map(|v| self.anno_arg(v)).collect();
                if self.keyword {
                    format!("[{}]", values.join(", "))
                } else if values.is_empty() {
                    "args end".to_string()
                } else {
                    format!("args {} end", values.join(" "))
                }
            }
        }
    }
}

fn modifiers(flags: AccessFlags, target: FlagTarget) -> String {
    flags
        .keywords(target)
        .into_iter()
        .map(|k| format!("{} ", k))
        .collect()
}

fn const_value(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(v) => v.to_string(),
        ConstValue::Long(v) => format!("{}L", v),
        ConstValue::Float(v) => format_float(*v),
        ConstValue::Double(v) => format_double(*v),
        ConstValue::String(v) => quote(v),
    }
}
