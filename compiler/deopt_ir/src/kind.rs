//! Representation kinds and constants.
//!
//! A [`ValueKind`] is the width/category used to interpret one debug-info
//! slot. Sub-word kinds (`Boolean`, `Byte`, `Short`, `Char`) only appear in
//! declared storage; on the interpreter's operand stack they widen to `Int`.
//!
//! Floating-point constants are stored as raw bits so that [`Constant`] keeps
//! `Eq` and `Hash`.

use std::fmt;

/// Width/category of a value slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    Object,
    Void,
    /// No value. Used for dead slots and for the upper half of two-slot values.
    Illegal,
}

impl ValueKind {
    /// The kind a value of this kind occupies on the operand stack.
    #[inline]
    pub fn stack_kind(self) -> Self {
        match self {
            Self::Boolean | Self::Byte | Self::Short | Self::Char => Self::Int,
            other => other,
        }
    }

    /// Whether a value of this kind occupies two interpreter slots.
    #[inline]
    pub fn needs_two_slots(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }

    /// Whether this is the object-reference kind.
    #[inline]
    pub fn is_object(self) -> bool {
        self == Self::Object
    }

    /// Whether this is a primitive numeric or boolean kind.
    #[inline]
    pub fn is_primitive(self) -> bool {
        self.bit_count() > 0
    }

    /// Bit width of a primitive kind, `0` for `Object`, `Void` and `Illegal`.
    pub fn bit_count(self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::Byte => 8,
            Self::Short | Self::Char => 16,
            Self::Int | Self::Float => 32,
            Self::Long | Self::Double => 64,
            Self::Object | Self::Void | Self::Illegal => 0,
        }
    }

    /// Single-character type descriptor, as used in method signatures.
    pub fn type_char(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Short => 'S',
            Self::Char => 'C',
            Self::Int => 'I',
            Self::Float => 'F',
            Self::Long => 'J',
            Self::Double => 'D',
            Self::Object => 'A',
            Self::Void => 'V',
            Self::Illegal => '-',
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Float => "float",
            Self::Long => "long",
            Self::Double => "double",
            Self::Object => "object",
            Self::Void => "void",
            Self::Illegal => "illegal",
        };
        f.write_str(name)
    }
}

/// Opaque handle to a heap object embedded as a constant (e.g. an interned
/// string or a class mirror). Resolved by the encoder, never dereferenced here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectHandle(u32);

impl ObjectHandle {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A compile-time constant value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i32),
    Long(i64),
    /// `f32` bits.
    Float(u32),
    /// `f64` bits.
    Double(u64),
    Null,
    Object(ObjectHandle),
    /// The "no value" marker. Also used inside escape-object field mappings
    /// as the continuation of a two-slot or sub-word write.
    Illegal,
}

impl Constant {
    /// Build a `Float` constant from an `f32`.
    pub fn float(value: f32) -> Self {
        Self::Float(value.to_bits())
    }

    /// Build a `Double` constant from an `f64`.
    pub fn double(value: f64) -> Self {
        Self::Double(value.to_bits())
    }

    /// Representation kind of this constant. Always a stack kind.
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Null | Self::Object(_) => ValueKind::Object,
            Self::Illegal => ValueKind::Illegal,
        }
    }

    /// The zero/default value of `kind`'s stack kind.
    pub fn default_for_kind(kind: ValueKind) -> Self {
        match kind.stack_kind() {
            ValueKind::Int => Self::Int(0),
            ValueKind::Long => Self::Long(0),
            ValueKind::Float => Self::Float(0),
            ValueKind::Double => Self::Double(0),
            ValueKind::Object => Self::Null,
            _ => Self::Illegal,
        }
    }

    #[inline]
    pub fn is_illegal(self) -> bool {
        self == Self::Illegal
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "int[{v}]"),
            Self::Long(v) => write!(f, "long[{v}]"),
            Self::Float(bits) => write!(f, "float[{}]", f32::from_bits(*bits)),
            Self::Double(bits) => write!(f, "double[{}]", f64::from_bits(*bits)),
            Self::Null => f.write_str("null"),
            Self::Object(h) => write!(f, "object[#{}]", h.raw()),
            Self::Illegal => f.write_str("illegal"),
        }
    }
}
