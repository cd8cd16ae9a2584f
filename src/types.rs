use bitflags::bitflags;

/// Access flags of any class-file element.
///
/// Several bits are shared between element kinds (`0x0020` is `super` on a class,
/// `synchronized` on a method and `open` on a module), so the textual name of a
/// flag depends on the [`FlagTarget`] it is attached to.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct AccessFlags(u32);

bitflags! {
    impl AccessFlags: u32 {
        const PUBLIC = 0x0001;       // class, field, method
        const PRIVATE = 0x0002;      // class, field, method
        const PROTECTED = 0x0004;    // class, field, method
        const STATIC = 0x0008;       // field, method
        const FINAL = 0x0010;        // class, field, method, parameter
        const SUPER = 0x0020;        // class
        const SYNCHRONIZED = 0x0020; // method
        const OPEN = 0x0020;         // module
        const TRANSITIVE = 0x0020;   // module requires
        const VOLATILE = 0x0040;     // field
        const BRIDGE = 0x0040;       // method
        const STATIC_PHASE = 0x0040; // module requires
        const VARARGS = 0x0080;      // method
        const TRANSIENT = 0x0080;    // field
        const NATIVE = 0x0100;       // method
        const INTERFACE = 0x0200;    // class
        const ABSTRACT = 0x0400;     // class, method
        const STRICT = 0x0800;       // method
        const SYNTHETIC = 0x1000;    // class, field, method, parameter, module
        const ANNOTATION = 0x2000;   // class
        const ENUM = 0x4000;         // class, field
        const MANDATED = 0x8000;     // field, method, parameter, module
        const MODULE = 0x8000;       // class
        const RECORD = 0x10000;      // class (pseudo flag, not stored in the access word)
        const DEPRECATED = 0x20000;  // class, field, method (pseudo flag)
    }
}

/// The kind of element a set of [`AccessFlags`] is attached to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FlagTarget {
    Class,
    InnerClass,
    Field,
    Method,
    Module,
}

const CLASS_NAMES: &[(&str, AccessFlags)] = &[
    ("public", AccessFlags::PUBLIC),
    ("private", AccessFlags::PRIVATE),
    ("protected", AccessFlags::PROTECTED),
    ("final", AccessFlags::FINAL),
    ("super", AccessFlags::SUPER),
    ("interface", AccessFlags::INTERFACE),
    ("abstract", AccessFlags::ABSTRACT),
    ("synthetic", AccessFlags::SYNTHETIC),
    ("annotation", AccessFlags::ANNOTATION),
    ("enum", AccessFlags::ENUM),
    ("module", AccessFlags::MODULE),
];

const INNER_CLASS_NAMES: &[(&str, AccessFlags)] = &[
    ("public", AccessFlags::PUBLIC),
    ("private", AccessFlags::PRIVATE),
    ("protected", AccessFlags::PROTECTED),
    ("static", AccessFlags::STATIC),
    ("final", AccessFlags::FINAL),
    ("interface", AccessFlags::INTERFACE),
    ("abstract", AccessFlags::ABSTRACT),
    ("synthetic", AccessFlags::SYNTHETIC),
    ("annotation", AccessFlags::ANNOTATION),
    ("enum", AccessFlags::ENUM),
];

const FIELD_NAMES: &[(&str, AccessFlags)] = &[
    ("public", AccessFlags::PUBLIC),
    ("private", AccessFlags::PRIVATE),
    ("protected", AccessFlags::PROTECTED),
    ("static", AccessFlags::STATIC),
    ("final", AccessFlags::FINAL),
    ("volatile", AccessFlags::VOLATILE),
    ("transient", AccessFlags::TRANSIENT),
    ("synthetic", AccessFlags::SYNTHETIC),
    ("enum", AccessFlags::ENUM),
    ("mandated", AccessFlags::MANDATED),
];

const METHOD_NAMES: &[(&str, AccessFlags)] = &[
    ("public", AccessFlags::PUBLIC),
    ("private", AccessFlags::PRIVATE),
    ("protected", AccessFlags::PROTECTED),
    ("static", AccessFlags::STATIC),
    ("final", AccessFlags::FINAL),
    ("synchronized", AccessFlags::SYNCHRONIZED),
    ("bridge", AccessFlags::BRIDGE),
    ("varargs", AccessFlags::VARARGS),
    ("native", AccessFlags::NATIVE),
    ("abstract", AccessFlags::ABSTRACT),
    ("strictfp", AccessFlags::STRICT),
    ("synthetic", AccessFlags::SYNTHETIC),
    ("mandated", AccessFlags::MANDATED),
];

const MODULE_NAMES: &[(&str, AccessFlags)] = &[
    ("open", AccessFlags::OPEN),
    ("transitive", AccessFlags::TRANSITIVE),
    ("static-phase", AccessFlags::STATIC_PHASE),
    ("synthetic", AccessFlags::SYNTHETIC),
    ("mandated", AccessFlags::MANDATED),
];

impl FlagTarget {
    fn names(self) -> &'static [(&'static str, AccessFlags)] {
        match self {
            FlagTarget::Class => CLASS_NAMES,
            FlagTarget::InnerClass => INNER_CLASS_NAMES,
            FlagTarget::Field => FIELD_NAMES,
            FlagTarget::Method => METHOD_NAMES,
            FlagTarget::Module => MODULE_NAMES,
        }
    }
}

impl AccessFlags {
    /// Flag for a modifier keyword as written in assembly text.
    pub fn from_keyword(target: FlagTarget, name: &str) -> Option<AccessFlags> {
        target
            .names()
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    /// Keywords for every flag applicable to `target`, in canonical order.
    ///
    /// Pseudo flags (`DEPRECATED`, `RECORD`) are never named.
    pub fn keywords(self, target: FlagTarget) -> Vec<&'static str> {
        target
            .names()
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Only the flags that can be named for `target`.
    pub fn applicable(self, target: FlagTarget) -> AccessFlags {
        target
            .names()
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .fold(AccessFlags::empty(), |acc, (_, flag)| acc | *flag)
    }

    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_native(self) -> bool {
        self.contains(AccessFlags::NATIVE)
    }
}
