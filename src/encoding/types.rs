use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

/// Scalar types that are spelled with a single character in a type encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `c` - char
    Char,
    /// `C` - unsigned char
    UChar,
    /// `s` - short
    Short,
    /// `S` - unsigned short
    UShort,
    /// `i` - int
    Int,
    /// `I` - unsigned int
    UInt,
    /// `l` - long, sized by the ABI model
    Long,
    /// `L` - unsigned long, sized by the ABI model
    ULong,
    /// `q` - long long
    LongLong,
    /// `Q` - unsigned long long
    ULongLong,
    /// `t` - 128bit integer
    Int128,
    /// `T` - unsigned 128bit integer
    UInt128,
    /// `f` - float
    Float,
    /// `d` - double
    Double,
    /// `D` - long double, sized by the ABI model
    LongDouble,
    /// `B` - C99 _Bool
    Bool,
    /// `v` - void
    Void,
    /// `*` - char *
    CString,
    /// `%` - untyped pointer-sized atom
    Atom,
}

impl PrimitiveKind {
    /// The character used for this kind inside a type encoding
    #[must_use]
    pub fn code(self) -> char {
        match self {
            PrimitiveKind::Char => 'c',
            PrimitiveKind::UChar => 'C',
            PrimitiveKind::Short => 's',
            PrimitiveKind::UShort => 'S',
            PrimitiveKind::Int => 'i',
            PrimitiveKind::UInt => 'I',
            PrimitiveKind::Long => 'l',
            PrimitiveKind::ULong => 'L',
            PrimitiveKind::LongLong => 'q',
            PrimitiveKind::ULongLong => 'Q',
            PrimitiveKind::Int128 => 't',
            PrimitiveKind::UInt128 => 'T',
            PrimitiveKind::Float => 'f',
            PrimitiveKind::Double => 'd',
            PrimitiveKind::LongDouble => 'D',
            PrimitiveKind::Bool => 'B',
            PrimitiveKind::Void => 'v',
            PrimitiveKind::CString => '*',
            PrimitiveKind::Atom => '%',
        }
    }

    /// Map an encoding character back to its kind, `None` if it is not a primitive code
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'c' => PrimitiveKind::Char,
            b'C' => PrimitiveKind::UChar,
            b's' => PrimitiveKind::Short,
            b'S' => PrimitiveKind::UShort,
            b'i' => PrimitiveKind::Int,
            b'I' => PrimitiveKind::UInt,
            b'l' => PrimitiveKind::Long,
            b'L' => PrimitiveKind::ULong,
            b'q' => PrimitiveKind::LongLong,
            b'Q' => PrimitiveKind::ULongLong,
            b't' => PrimitiveKind::Int128,
            b'T' => PrimitiveKind::UInt128,
            b'f' => PrimitiveKind::Float,
            b'd' => PrimitiveKind::Double,
            b'D' => PrimitiveKind::LongDouble,
            b'B' => PrimitiveKind::Bool,
            b'v' => PrimitiveKind::Void,
            b'*' => PrimitiveKind::CString,
            b'%' => PrimitiveKind::Atom,
            _ => return None,
        })
    }

    /// Returns `true` for the signed and unsigned integer kinds (including `Bool`)
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::LongDouble
                | PrimitiveKind::Void
                | PrimitiveKind::CString
                | PrimitiveKind::Atom
        )
    }

    /// Returns `true` for the floating-point kinds
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::LongDouble
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method type qualifiers that may prefix a type in an encoding
    pub struct Qualifiers: u8 {
        /// `r` - const
        const CONST = 0x01;
        /// `n` - in
        const IN = 0x02;
        /// `N` - inout
        const INOUT = 0x04;
        /// `o` - out
        const OUT = 0x08;
        /// `O` - bycopy
        const BYCOPY = 0x10;
        /// `R` - byref
        const BYREF = 0x20;
        /// `V` - oneway
        const ONEWAY = 0x40;
    }
}

/// Qualifier flags in the order they are written back by the encoder
pub(crate) const QUALIFIER_CODES: [(Qualifiers, char); 7] = [
    (Qualifiers::CONST, 'r'),
    (Qualifiers::IN, 'n'),
    (Qualifiers::INOUT, 'N'),
    (Qualifiers::OUT, 'o'),
    (Qualifiers::BYCOPY, 'O'),
    (Qualifiers::BYREF, 'R'),
    (Qualifiers::ONEWAY, 'V'),
];

impl Qualifiers {
    /// Map a qualifier character to its flag, `None` if it is not a qualifier
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        QUALIFIER_CODES
            .iter()
            .find(|(_, c)| *c as u8 == code)
            .map(|(flag, _)| *flag)
    }
}

/// What an object reference (`@`) is known to point at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ObjectKind {
    #[default]
    /// Plain `@`, any object
    Any,
    /// `@"Name"`, an object statically typed to a class (and/or protocol list)
    Named(String),
    /// `@?`, a block object
    Block,
}

/// Tag and member list of a struct or union
///
/// The member list is fixed once constructed; its order determines field offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Aggregate {
    tag: Option<String>,
    fields: Vec<TypeNode>,
}

impl Aggregate {
    /// Create an aggregate from its tag and ordered members
    #[must_use]
    pub fn new(tag: Option<String>, fields: Vec<TypeNode>) -> Self {
        Aggregate { tag, fields }
    }

    /// The tag name, `None` for anonymous aggregates
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The members, in declaration order
    #[must_use]
    pub fn fields(&self) -> &[TypeNode] {
        &self.fields
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Represents a decoded type encoding
///
/// A tree is owned by whoever parsed it. There is no sharing between nodes, so trees are
/// always acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A scalar with a fixed single-character code
    Primitive(PrimitiveKind),
    /// `^type` - pointer to a type
    Pointer(Box<TypeNode>),
    /// `[Ntype]` - fixed size array
    ArrayOf(u64, Box<TypeNode>),
    /// `{tag=...}` - structure
    Struct(Aggregate),
    /// `(tag=...)` - union
    Union(Aggregate),
    /// `bN` - bitfield of N bits
    Bitfield(u32),
    /// `jtype` - complex number of a scalar type
    Complex(Box<TypeNode>),
    /// Type prefixed by one or more method qualifiers
    Qualified(Qualifiers, Box<TypeNode>),
    /// `@` - object
    ObjectReference(ObjectKind),
    /// `#` - class object
    ClassReference,
    /// `:` - selector
    SelectorReference,
    /// `?` - syntactically valid but opaque
    Unknown,
}

impl TypeNode {
    /// Strip any qualifiers and return the underlying type
    #[must_use]
    pub fn unqualified(&self) -> &TypeNode {
        let mut node = self;
        while let TypeNode::Qualified(_, inner) = node {
            node = inner;
        }
        node
    }

    /// All qualifiers applied to this node (empty if none)
    #[must_use]
    pub fn qualifiers(&self) -> Qualifiers {
        let mut flags = Qualifiers::empty();
        let mut node = self;
        while let TypeNode::Qualified(q, inner) = node {
            flags |= *q;
            node = inner;
        }
        flags
    }

    /// Returns `true` if the value is a pointer-sized reference (pointer, object, class, selector)
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self.unqualified(),
            TypeNode::Pointer(_)
                | TypeNode::ObjectReference(_)
                | TypeNode::ClassReference
                | TypeNode::SelectorReference
                | TypeNode::Primitive(PrimitiveKind::CString | PrimitiveKind::Atom)
        )
    }
}
