//! Value graph.
//!
//! Every abstract program value a frame state can refer to lives in the
//! [`Graph`] arena and is addressed by a [`ValueId`]. Identity is the id:
//! two virtual objects with identical contents are still different objects.
//!
//! Frame states are stored in the same graph (see [`crate::frame_state`]).

use std::fmt;

use crate::frame_state::{FrameState, FrameStateId};
use crate::{Constant, TypeId, TypePool, ValueKind};

/// Index of a value node in a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
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

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A scalar-replaced allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VirtualObjectDef {
    /// Declared instance or array type.
    pub ty: TypeId,
    /// Declared length for arrays, `None` for instances.
    pub length: Option<u32>,
    /// Whether this object stands for an auto-boxed primitive.
    pub auto_box: bool,
}

impl VirtualObjectDef {
    /// Number of field or element slots.
    pub fn entry_count(&self, types: &TypePool) -> usize {
        match self.length {
            Some(length) => length as usize,
            None => types.fields(self.ty).len(),
        }
    }

    /// Declared storage kind of entry `index`, mapped through `storage`.
    ///
    /// Out-of-range instance entries report `Illegal`.
    pub fn entry_kind(
        &self,
        types: &TypePool,
        storage: impl Fn(TypeId) -> ValueKind,
        index: usize,
    ) -> ValueKind {
        if let Some(component) = types.component(self.ty) {
            return storage(component);
        }
        types
            .fields(self.ty)
            .get(index)
            .map_or(ValueKind::Illegal, |field| storage(field.ty))
    }

    /// Whether this is an array whose component is stored as bytes.
    pub fn is_byte_array(&self, types: &TypePool, storage: impl Fn(TypeId) -> ValueKind) -> bool {
        types
            .component(self.ty)
            .is_some_and(|component| storage(component) == ValueKind::Byte)
    }
}

/// What a value node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueOp {
    /// A folded constant.
    Constant(Constant),
    /// A bookkeeping wrapper that is semantically `original`.
    Proxy { original: ValueId },
    /// The identity of a scalar-replaced allocation.
    VirtualObject(VirtualObjectDef),
    /// Any other computed value; its physical location comes from the
    /// register allocator.
    Computed { kind: ValueKind },
}

/// A node in the value graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueNode {
    pub op: ValueOp,
}

/// Arena of value nodes and frame states for one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    values: Vec<ValueNode>,
    frame_states: Vec<FrameState>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "value indices never exceed u32"
    )]
    fn push(&mut self, op: ValueOp) -> ValueId {
        let id = ValueId::new(self.values.len() as u32);
        self.values.push(ValueNode { op });
        id
    }

    pub fn add_constant(&mut self, constant: Constant) -> ValueId {
        self.push(ValueOp::Constant(constant))
    }

    pub fn add_computed(&mut self, kind: ValueKind) -> ValueId {
        self.push(ValueOp::Computed { kind })
    }

    pub fn add_proxy(&mut self, original: ValueId) -> ValueId {
        self.push(ValueOp::Proxy { original })
    }

    /// Add a virtual instance of `ty`; its entry count is the field count.
    pub fn add_virtual_instance(&mut self, ty: TypeId) -> ValueId {
        self.push(ValueOp::VirtualObject(VirtualObjectDef {
            ty,
            length: None,
            auto_box: false,
        }))
    }

    /// Add a virtual array of `array_ty` with `length` elements.
    pub fn add_virtual_array(&mut self, array_ty: TypeId, length: u32) -> ValueId {
        self.push(ValueOp::VirtualObject(VirtualObjectDef {
            ty: array_ty,
            length: Some(length),
            auto_box: false,
        }))
    }

    /// Add a virtual box (e.g. `Integer`) of the boxing type `ty`.
    pub fn add_virtual_box(&mut self, ty: TypeId) -> ValueId {
        self.push(ValueOp::VirtualObject(VirtualObjectDef {
            ty,
            length: None,
            auto_box: true,
        }))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "frame state indices never exceed u32"
    )]
    pub fn add_frame_state(&mut self, state: FrameState) -> FrameStateId {
        let id = FrameStateId::new(self.frame_states.len() as u32);
        self.frame_states.push(state);
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this graph.
    #[inline]
    pub fn value(&self, id: ValueId) -> &ValueNode {
        &self.values[id.index()]
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this graph.
    #[inline]
    pub fn frame_state(&self, id: FrameStateId) -> &FrameState {
        &self.frame_states[id.index()]
    }

    /// The virtual-object definition behind `id`, if it is one.
    pub fn as_virtual_object(&self, id: ValueId) -> Option<&VirtualObjectDef> {
        match &self.value(id).op {
            ValueOp::VirtualObject(def) => Some(def),
            _ => None,
        }
    }

    /// The constant `id` denotes directly (proxies are not looked through).
    pub fn as_constant(&self, id: ValueId) -> Option<Constant> {
        match self.value(id).op {
            ValueOp::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Strip proxy wrappers.
    ///
    /// A proxy cycle cannot be built through this API; the walk is still
    /// bounded by the node count and stops at the last node visited.
    pub fn unproxify(&self, id: ValueId) -> ValueId {
        let mut current = id;
        for _ in 0..self.values.len() {
            match self.value(current).op {
                ValueOp::Proxy { original } => current = original,
                _ => break,
            }
        }
        current
    }

    /// Stack-width representation kind of `id`.
    pub fn stack_kind(&self, id: ValueId) -> ValueKind {
        match self.value(self.unproxify(id)).op {
            ValueOp::Constant(c) => c.kind(),
            ValueOp::VirtualObject(_) => ValueKind::Object,
            ValueOp::Computed { kind } => kind.stack_kind(),
            // Only reached for a proxy cycle.
            ValueOp::Proxy { .. } => ValueKind::Illegal,
        }
    }

    /// Whether `id` is the illegal-constant continuation marker.
    pub fn is_illegal_marker(&self, id: ValueId) -> bool {
        self.as_constant(id).is_some_and(Constant::is_illegal)
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
