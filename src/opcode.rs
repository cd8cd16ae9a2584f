//! The JVM instruction set as seen by the tree model.
//!
//! Short forms (`iload_0`, `ldc_w`, `goto_w`, `wide`, ...) are encoding details
//! and never appear here: `Iload` with operand 0 covers `iload_0`.

/// Operand shape of an instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsnKind {
    Insn,
    Int,
    NewArray,
    Var,
    Type,
    Field,
    Method,
    InvokeDynamic,
    Jump,
    Ldc,
    Iinc,
    TableSwitch,
    LookupSwitch,
    MultiANewArray,
}

macro_rules! opcodes {
    ($($variant:ident = $value:literal, $name:literal, $kind:ident;)*) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            pub fn value(self) -> u8 {
                match self {
                    $(Opcode::$variant => $value,)*
                }
            }

            /// Lower-case mnemonic, e.g. `invokevirtual`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }

            pub fn kind(self) -> InsnKind {
                match self {
                    $(Opcode::$variant => InsnKind::$kind,)*
                }
            }

            pub fn from_value(value: u8) -> Option<Opcode> {
                match value {
                    $($value => Some(Opcode::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    Nop = 0, "nop", Insn;
    Aconstnull = 1, "aconst_null", Insn;
    Iconstm1 = 2, "iconst_m1", Insn;
    Iconst0 = 3, "iconst_0", Insn;
    Iconst1 = 4, "iconst_1", Insn;
    Iconst2 = 5, "iconst_2", Insn;
    Iconst3 = 6, "iconst_3", Insn;
    Iconst4 = 7, "iconst_4", Insn;
    Iconst5 = 8, "iconst_5", Insn;
    Lconst0 = 9, "lconst_0", Insn;
    Lconst1 = 10, "lconst_1", Insn;
    Fconst0 = 11, "fconst_0", Insn;
    Fconst1 = 12, "fconst_1", Insn;
    Fconst2 = 13, "fconst_2", Insn;
    Dconst0 = 14, "dconst_0", Insn;
    Dconst1 = 15, "dconst_1", Insn;
    Bipush = 16, "bipush", Int;
    Sipush = 17, "sipush", Int;
    Ldc = 18, "ldc", Ldc;
    Iload = 21, "iload", Var;
    Lload = 22, "lload", Var;
    Fload = 23, "fload", Var;
    Dload = 24, "dload", Var;
    Aload = 25, "aload", Var;
    Iaload = 46, "iaload", Insn;
    Laload = 47, "laload", Insn;
    Faload = 48, "faload", Insn;
    Daload = 49, "daload", Insn;
    Aaload = 50, "aaload", Insn;
    Baload = 51, "baload", Insn;
    Caload = 52, "caload", Insn;
    Saload = 53, "saload", Insn;
    Istore = 54, "istore", Var;
    Lstore = 55, "lstore", Var;
    Fstore = 56, "fstore", Var;
    Dstore = 57, "dstore", Var;
    Astore = 58, "astore", Var;
    Iastore = 79, "iastore", Insn;
    Lastore = 80, "lastore", Insn;
    Fastore = 81, "fastore", Insn;
    Dastore = 82, "dastore", Insn;
    Aastore = 83, "aastore", Insn;
    Bastore = 84, "bastore", Insn;
    Castore = 85, "castore", Insn;
    Sastore = 86, "sastore", Insn;
    Pop = 87, "pop", Insn;
    Pop2 = 88, "pop2", Insn;
    Dup = 89, "dup", Insn;
    Dupx1 = 90, "dup_x1", Insn;
    Dupx2 = 91, "dup_x2", Insn;
    Dup2 = 92, "dup2", Insn;
    Dup2x1 = 93, "dup2_x1", Insn;
    Dup2x2 = 94, "dup2_x2", Insn;
    Swap = 95, "swap", Insn;
    Iadd = 96, "iadd", Insn;
    Ladd = 97, "ladd", Insn;
    Fadd = 98, "fadd", Insn;
    Dadd = 99, "dadd", Insn;
    Isub = 100, "isub", Insn;
    Lsub = 101, "lsub", Insn;
    Fsub = 102, "fsub", Insn;
    Dsub = 103, "dsub", Insn;
    Imul = 104, "imul", Insn;
    Lmul = 105, "lmul", Insn;
    Fmul = 106, "fmul", Insn;
    Dmul = 107, "dmul", Insn;
    Idiv = 108, "idiv", Insn;
    Ldiv = 109, "ldiv", Insn;
    Fdiv = 110, "fdiv", Insn;
    Ddiv = 111, "ddiv", Insn;
    Irem = 112, "irem", Insn;
    Lrem = 113, "lrem", Insn;
    Frem = 114, "frem", Insn;
    Drem = 115, "drem", Insn;
    Ineg = 116, "ineg", Insn;
    Lneg = 117, "lneg", Insn;
    Fneg = 118, "fneg", Insn;
    Dneg = 119, "dneg", Insn;
    Ishl = 120, "ishl", Insn;
    Lshl = 121, "lshl", Insn;
    Ishr = 122, "ishr", Insn;
    Lshr = 123, "lshr", Insn;
    Iushr = 124, "iushr", Insn;
    Lushr = 125, "lushr", Insn;
    Iand = 126, "iand", Insn;
    Land = 127, "land", Insn;
    Ior = 128, "ior", Insn;
    Lor = 129, "lor", Insn;
    Ixor = 130, "ixor", Insn;
    Lxor = 131, "lxor", Insn;
    Iinc = 132, "iinc", Iinc;
    I2l = 133, "i2l", Insn;
    I2f = 134, "i2f", Insn;
    I2d = 135, "i2d", Insn;
    L2i = 136, "l2i", Insn;
    L2f = 137, "l2f", Insn;
    L2d = 138, "l2d", Insn;
    F2i = 139, "f2i", Insn;
    F2l = 140, "f2l", Insn;
    F2d = 141, "f2d", Insn;
    D2i = 142, "d2i", Insn;
    D2l = 143, "d2l", Insn;
    D2f = 144, "d2f", Insn;
    I2b = 145, "i2b", Insn;
    I2c = 146, "i2c", Insn;
    I2s = 147, "i2s", Insn;
    Lcmp = 148, "lcmp", Insn;
    Fcmpl = 149, "fcmpl", Insn;
    Fcmpg = 150, "fcmpg", Insn;
    Dcmpl = 151, "dcmpl", Insn;
    Dcmpg = 152, "dcmpg", Insn;
    Ifeq = 153, "ifeq", Jump;
    Ifne = 154, "ifne", Jump;
    Iflt = 155, "iflt", Jump;
    Ifge = 156, "ifge", Jump;
    Ifgt = 157, "ifgt", Jump;
    Ifle = 158, "ifle", Jump;
    IfIcmpeq = 159, "if_icmpeq", Jump;
    IfIcmpne = 160, "if_icmpne", Jump;
    IfIcmplt = 161, "if_icmplt", Jump;
    IfIcmpge = 162, "if_icmpge", Jump;
    IfIcmpgt = 163, "if_icmpgt", Jump;
    IfIcmple = 164, "if_icmple", Jump;
    IfAcmpeq = 165, "if_acmpeq", Jump;
    IfAcmpne = 166, "if_acmpne", Jump;
    Goto = 167, "goto", Jump;
    Jsr = 168, "jsr", Jump;
    Ret = 169, "ret", Var;
    Tableswitch = 170, "tableswitch", TableSwitch;
    Lookupswitch = 171, "lookupswitch", LookupSwitch;
    Ireturn = 172, "ireturn", Insn;
    Lreturn = 173, "lreturn", Insn;
    Freturn = 174, "freturn", Insn;
    Dreturn = 175, "dreturn", Insn;
    Areturn = 176, "areturn", Insn;
    Return = 177, "return", Insn;
    Getstatic = 178, "getstatic", Field;
    Putstatic = 179, "putstatic", Field;
    Getfield = 180, "getfield", Field;
    Putfield = 181, "putfield", Field;
    Invokevirtual = 182, "invokevirtual", Method;
    Invokespecial = 183, "invokespecial", Method;
    Invokestatic = 184, "invokestatic", Method;
    Invokeinterface = 185, "invokeinterface", Method;
    Invokedynamic = 186, "invokedynamic", InvokeDynamic;
    New = 187, "new", Type;
    Newarray = 188, "newarray", NewArray;
    Anewarray = 189, "anewarray", Type;
    Arraylength = 190, "arraylength", Insn;
    Athrow = 191, "athrow", Insn;
    Checkcast = 192, "checkcast", Type;
    Instanceof = 193, "instanceof", Type;
    Monitorenter = 194, "monitorenter", Insn;
    Monitorexit = 195, "monitorexit", Insn;
    Multianewarray = 197, "multianewarray", MultiANewArray;
    Ifnull = 198, "ifnull", Jump;
    Ifnonnull = 199, "ifnonnull", Jump;
}

/// How an instruction touches the local variable it names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarOp {
    /// Stores a fresh value.
    Assign,
    /// Reads the current value.
    Load,
    /// Reads and writes in place (`iinc`).
    Update,
}

impl Opcode {
    /// Case-insensitive mnemonic lookup.
    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub fn var_op(self) -> Option<VarOp> {
        match self {
            Opcode::Istore | Opcode::Lstore | Opcode::Fstore | Opcode::Dstore | Opcode::Astore => {
                Some(VarOp::Assign)
            }
            Opcode::Iload
            | Opcode::Lload
            | Opcode::Fload
            | Opcode::Dload
            | Opcode::Aload
            | Opcode::Ret => Some(VarOp::Load),
            Opcode::Iinc => Some(VarOp::Update),
            _ => None,
        }
    }
}

/// Method handle reference kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandleTag {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

const HANDLE_TAGS: &[(HandleTag, &str)] = &[
    (HandleTag::GetField, "H_GETFIELD"),
    (HandleTag::GetStatic, "H_GETSTATIC"),
    (HandleTag::PutField, "H_PUTFIELD"),
    (HandleTag::PutStatic, "H_PUTSTATIC"),
    (HandleTag::InvokeVirtual, "H_INVOKEVIRTUAL"),
    (HandleTag::InvokeStatic, "H_INVOKESTATIC"),
    (HandleTag::InvokeSpecial, "H_INVOKESPECIAL"),
    (HandleTag::NewInvokeSpecial, "H_NEWINVOKESPECIAL"),
    (HandleTag::InvokeInterface, "H_INVOKEINTERFACE"),
];

impl HandleTag {
    pub fn name(self) -> &'static str {
        HANDLE_TAGS
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, name)| *name)
            .unwrap_or("H_INVALID")
    }

    pub fn from_name(name: &str) -> Option<HandleTag> {
        HANDLE_TAGS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(tag, _)| *tag)
    }

    /// Field handles carry a field descriptor, all others a method descriptor.
    pub fn is_field(self) -> bool {
        (self as u8) <= HandleTag::PutStatic as u8
    }
}
