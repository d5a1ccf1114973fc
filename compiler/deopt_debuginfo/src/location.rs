//! Physical locations chosen by the register allocator.
//!
//! The builder never assigns locations; it asks a [`LocationMap`] for the
//! operand an earlier stage picked for each live value.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use deopt_ir::{Constant, ValueId, ValueKind};

/// A virtual register that a later stage will map to a machine location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    pub index: u32,
    pub kind: ValueKind,
}

/// A fixed machine register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterValue {
    pub number: u16,
    pub kind: ValueKind,
}

/// A spill slot in the compiled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackSlot {
    pub offset: i32,
    pub kind: ValueKind,
}

/// Operand assigned to a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    /// The value was rematerialized as a constant.
    Constant(Constant),
    Variable(Variable),
    Register(RegisterValue),
    StackSlot(StackSlot),
    Illegal,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{c}"),
            Self::Variable(v) => write!(f, "v{}|{}", v.index, v.kind.type_char()),
            Self::Register(r) => write!(f, "r{}|{}", r.number, r.kind.type_char()),
            Self::StackSlot(s) => write!(f, "stack:{}|{}", s.offset, s.kind.type_char()),
            Self::Illegal => f.write_str("-"),
        }
    }
}

/// Read-only view of the allocator's value-to-operand map.
pub trait LocationMap {
    /// The operand assigned to `value`, if any.
    fn operand(&self, value: ValueId) -> Option<Location>;
}

impl<S: BuildHasher> LocationMap for HashMap<ValueId, Location, S> {
    fn operand(&self, value: ValueId) -> Option<Location> {
        self.get(&value).copied()
    }
}

impl<M: LocationMap + ?Sized> LocationMap for &M {
    fn operand(&self, value: ValueId) -> Option<Location> {
        (**self).operand(value)
    }
}

#[cfg(test)]
mod tests;
