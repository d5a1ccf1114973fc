//! Shared test utilities for the builder stages.
//!
//! A [`Fixture`] owns one compilation unit's worth of graph, types, methods
//! and allocator locations. Only compiled in test builds.

use deopt_ir::{
    Bci, Constant, FrameState, FrameStateId, Graph, MethodFlags, MethodId, MethodTable, TypePool,
    ValueId, ValueKind,
};
use rustc_hash::FxHashMap;

use crate::{DebugInfo, DebugInfoBuilder, DebugInfoConfig, DebugInfoResult, Location, Variable};

pub(crate) struct Fixture {
    pub types: TypePool,
    pub methods: MethodTable,
    pub graph: Graph,
    pub locations: FxHashMap<ValueId, Location>,
    /// Plain, unsynchronized method used by [`Fixture::state`].
    pub method: MethodId,
    /// The node whose state is being described.
    pub node: ValueId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut methods = MethodTable::new();
        let method = methods.add("Test", "run", MethodFlags::STATIC);
        let mut graph = Graph::new();
        let node = graph.add_computed(ValueKind::Void);
        Self {
            types: TypePool::new(),
            methods,
            graph,
            locations: FxHashMap::default(),
            method,
            node,
        }
    }

    pub fn constant(&mut self, constant: Constant) -> ValueId {
        self.graph.add_constant(constant)
    }

    /// A computed value living in a variable numbered after its id.
    pub fn computed(&mut self, kind: ValueKind) -> ValueId {
        let value = self.graph.add_computed(kind);
        self.locations.insert(
            value,
            Location::Variable(Variable {
                index: value.raw(),
                kind: kind.stack_kind(),
            }),
        );
        value
    }

    /// A fresh state of [`Fixture::method`].
    pub fn state(&self, bci: Bci) -> FrameState {
        FrameState::new(&self.methods, self.method, bci)
    }

    pub fn add_state(&mut self, state: FrameState) -> FrameStateId {
        self.graph.add_frame_state(state)
    }

    /// A builder with shape verification always on.
    pub fn builder(&self) -> DebugInfoBuilder<'_> {
        DebugInfoBuilder::new(&self.graph, &self.types, &self.methods, &self.locations)
            .with_config(DebugInfoConfig::default().with_verify_shapes(true))
    }

    pub fn build(&self, state: FrameStateId) -> DebugInfoResult<DebugInfo> {
        self.builder().build(self.node, state, None, None, None)
    }
}

/// Shorthand for a variable debug value as produced by [`Fixture::computed`].
pub(crate) fn var(value: ValueId, kind: ValueKind) -> crate::DebugValue {
    crate::DebugValue::Variable(Variable {
        index: value.raw(),
        kind,
    })
}
