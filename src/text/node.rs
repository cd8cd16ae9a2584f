//! Parse tree produced by both grammars.
//!
//! Nodes keep literal text raw; turning it into numbers, flags and types is
//! left to the visitor so both grammars share one set of conversion errors.

use crate::ast::Position;
use crate::opcode::Opcode;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Spanned<T> {
    pub value: T,
    pub position: Position,
}

impl<T> Spanned<T> {
    pub fn new(value: T, position: Position) -> Self {
        Spanned { value, position }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Literal {
    /// Number text as written, sign and suffix included.
    Number(String),
    String(String),
    Char(char),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HandleNode {
    pub tag: Spanned<String>,
    /// `owner.name`, split by the visitor.
    pub member: Spanned<String>,
    pub desc: String,
}

/// Constant operand of `ldc` or a bootstrap argument.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ArgNode {
    Literal(Spanned<Literal>),
    Type(Spanned<String>),
    Handle(HandleNode),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum AnnoArgNode {
    Literal(Spanned<Literal>),
    Type(Spanned<String>),
    Handle(HandleNode),
    Enum { enum_type: String, name: String },
    Annotation(AnnotationNode),
    List(Vec<AnnoArgNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AnnotationNode {
    pub visible: bool,
    pub anno_type: String,
    /// Name is `None` when the grammar found an argument without one.
    pub args: Vec<(Option<String>, AnnoArgNode)>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ParamNode {
    pub desc: String,
    pub name: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Operands {
    None,
    Int(Spanned<Literal>),
    NewArray(Spanned<String>),
    Var(String),
    Type(String),
    Field {
        member: Spanned<String>,
        desc: String,
    },
    Method {
        member: Spanned<String>,
        desc: String,
        itf: bool,
    },
    InvokeDynamic {
        name: String,
        desc: String,
        bsm: HandleNode,
        args: Vec<ArgNode>,
    },
    Ldc(ArgNode),
    Jump(String),
    Iinc {
        var: String,
        increment: Spanned<Literal>,
    },
    MultiANewArray {
        desc: String,
        dims: Spanned<Literal>,
    },
    TableSwitch {
        min: Spanned<Literal>,
        max: Spanned<Literal>,
        labels: Vec<String>,
        default: String,
    },
    LookupSwitch {
        entries: Vec<(Spanned<Literal>, String)>,
        default: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Signature(Spanned<String>),
    Throws(Spanned<String>),
    Value(Spanned<Literal>),
    Deprecated(Position),
    Annotation(AnnotationNode),
    Method {
        modifiers: Vec<Spanned<String>>,
        name: String,
        params: Vec<ParamNode>,
        return_type: Option<String>,
        position: Position,
    },
    Field {
        modifiers: Vec<Spanned<String>>,
        name: String,
        desc: String,
        value: Option<Spanned<Literal>>,
        position: Position,
    },
    Label(Spanned<String>),
    TryCatch {
        start: String,
        end: String,
        handler: String,
        exception_type: Option<String>,
        position: Position,
    },
    Line {
        label: String,
        line: Spanned<Literal>,
        position: Position,
    },
    Expression(Spanned<String>),
    Instruction {
        opcode: Opcode,
        operands: Operands,
        position: Position,
    },
    Comment(Spanned<String>),
    Unmatched(Spanned<String>),
}
