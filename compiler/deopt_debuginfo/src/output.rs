//! Debug-info descriptors handed to the metadata encoder.
//!
//! A [`DebugInfo`] owns everything it references. Virtual objects are
//! addressed by [`VirtualObjectIndex`] into `DebugInfo::virtual_objects`, so
//! objects that reference each other form an index graph rather than an
//! ownership cycle.

use std::fmt;

use deopt_ir::{Bci, Constant, MethodId, TypeId, ValueKind};

use crate::errors::{DebugInfoErrorKind, DebugInfoResult};
use crate::location::{RegisterValue, Variable};

/// Dense index of a virtual-object descriptor, in first-reference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VirtualObjectIndex(u32);

impl VirtualObjectIndex {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VirtualObjectIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vobject:{}", self.0)
    }
}

/// One debug-info slot value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugValue {
    Constant(Constant),
    Variable(Variable),
    Register(RegisterValue),
    VirtualObject(VirtualObjectIndex),
    /// Value not needed.
    Illegal,
}

impl fmt::Display for DebugValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{c}"),
            Self::Variable(v) => write!(f, "v{}|{}", v.index, v.kind.type_char()),
            Self::Register(r) => write!(f, "r{}|{}", r.number, r.kind.type_char()),
            Self::VirtualObject(index) => write!(f, "{index}"),
            Self::Illegal => f.write_str("-"),
        }
    }
}

/// Reconstruction recipe for one scalar-replaced object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualObjectDescriptor {
    pub index: VirtualObjectIndex,
    pub ty: TypeId,
    /// Stands for an auto-boxed primitive; the VM may reuse a cached box.
    pub auto_box: bool,
    entries: Option<Entries>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entries {
    values: Vec<DebugValue>,
    slot_kinds: Vec<ValueKind>,
}

impl VirtualObjectDescriptor {
    pub(crate) fn new(index: VirtualObjectIndex, ty: TypeId, auto_box: bool) -> Self {
        Self {
            index,
            ty,
            auto_box,
            entries: None,
        }
    }

    /// Whether the entries have been filled in.
    pub fn is_filled(&self) -> bool {
        self.entries.is_some()
    }

    /// Entry values. May be shorter than the declared entry count when a
    /// two-slot value covered two declared entries.
    pub fn values(&self) -> &[DebugValue] {
        self.entries.as_ref().map_or(&[], |e| &e.values)
    }

    /// Representation kinds parallel to [`values`](Self::values).
    pub fn slot_kinds(&self) -> &[ValueKind] {
        self.entries.as_ref().map_or(&[], |e| &e.slot_kinds)
    }

    /// Set the entries. Each descriptor is filled exactly once.
    pub(crate) fn set_entries(
        &mut self,
        values: Vec<DebugValue>,
        slot_kinds: Vec<ValueKind>,
    ) -> DebugInfoResult<()> {
        if self.entries.is_some() {
            return Err(DebugInfoErrorKind::DescriptorAlreadyFilled { index: self.index }.into());
        }
        debug_assert_eq!(values.len(), slot_kinds.len());
        self.entries = Some(Entries { values, slot_kinds });
        Ok(())
    }
}

/// One interpreter frame to rebuild, with a link to its caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub caller: Option<Box<FrameDescriptor>>,
    pub method: MethodId,
    pub bci: Bci,
    /// The exception on top of the stack must be rethrown on resume.
    pub rethrow_exception: bool,
    /// The frame is suspended inside the call at `bci`.
    pub during_call: bool,
    /// Locals, then stack, then locks.
    pub values: Vec<DebugValue>,
    /// Kinds for locals and stack only; locks are always object references.
    pub slot_kinds: Vec<ValueKind>,
    pub num_locals: usize,
    pub num_stack: usize,
    pub num_locks: usize,
}

impl FrameDescriptor {
    pub fn locals(&self) -> &[DebugValue] {
        &self.values[..self.num_locals]
    }

    pub fn stack(&self) -> &[DebugValue] {
        &self.values[self.num_locals..self.num_locals + self.num_stack]
    }

    pub fn locks(&self) -> &[DebugValue] {
        &self.values[self.num_locals + self.num_stack..]
    }

    pub fn local_kinds(&self) -> &[ValueKind] {
        &self.slot_kinds[..self.num_locals]
    }

    pub fn stack_kinds(&self) -> &[ValueKind] {
        &self.slot_kinds[self.num_locals..]
    }

    pub fn caller(&self) -> Option<&FrameDescriptor> {
        self.caller.as_deref()
    }

    /// This frame and its callers, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &FrameDescriptor> {
        std::iter::successors(Some(self), |frame| frame.caller())
    }

    /// Number of frames in the chain starting here.
    pub fn depth(&self) -> usize {
        self.frames().count()
    }
}

/// Label of the exception handler block for a state with an exception edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct BlockLabel(u32);

impl BlockLabel {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Deoptimization reason and speculation carried by an implicit
/// deoptimization point (e.g. an implicit null check).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImplicitDeopt {
    pub reason_and_action: Option<Constant>,
    pub speculation: Option<Constant>,
}

/// Complete debug info for one program point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugInfo {
    /// Innermost frame.
    pub frame: FrameDescriptor,
    /// Indexed by [`VirtualObjectIndex`].
    pub virtual_objects: Vec<VirtualObjectDescriptor>,
    pub exception_edge: Option<BlockLabel>,
    /// Present when a reason or speculation was supplied.
    pub implicit_deopt: Option<ImplicitDeopt>,
    /// Every frame level is valid for deoptimization.
    pub valid_for_deoptimization: bool,
}

impl DebugInfo {
    pub fn virtual_object(&self, index: VirtualObjectIndex) -> Option<&VirtualObjectDescriptor> {
        self.virtual_objects.get(index.index())
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
