//! Frame state → debug info.
//!
//! # Entry Point
//!
//! [`DebugInfoBuilder::build`] turns the innermost frame state of a
//! deoptimization point into a [`DebugInfo`].
//!
//! # Architecture
//!
//! One build runs these stages in order:
//!
//! 1. `escape`: walk the frame-state chain and record the winning escape
//!    state of every virtual object (innermost occurrence wins).
//! 2. `frame`: build one [`FrameDescriptor`](crate::FrameDescriptor) per
//!    inlining level, resolving every slot through `resolve`.
//! 3. `resolve`: map each abstract value to a [`DebugValue`](crate::DebugValue).
//!    The first reference to a virtual object registers it with the
//!    `registry` and returns its index immediately.
//! 4. `registry`: drain the pending virtual objects, filling their entries
//!    (which may register further objects), then run the shape check.
//!
//! The escape map and the registry are scratch state for exactly one build:
//! empty on entry, cleared on exit whether the build succeeded or not.

mod escape;
mod frame;
mod registry;
mod resolve;

use deopt_ir::{Constant, FrameStateId, Graph, MethodTable, TypePool, ValueId};

use crate::config::DebugInfoConfig;
use crate::counters::{CounterSink, DebugInfoCounters};
use crate::errors::{DebugInfoError, DebugInfoErrorKind, DebugInfoResult, ErrorContext, ResultExt};
use crate::location::LocationMap;
use crate::output::{BlockLabel, DebugInfo, ImplicitDeopt};
use crate::policy::{BackendPolicy, IntrinsicStorage};

use self::escape::ObjectStates;
use self::registry::VirtualObjectRegistry;

/// Builds [`DebugInfo`] for deoptimization points of one compilation.
///
/// Not reentrant and not shareable between threads: `build` takes
/// `&mut self`. Concurrent compilations use one builder each.
///
/// # Example
///
/// ```ignore
/// let mut builder = DebugInfoBuilder::new(&graph, &types, &methods, &locations)
///     .with_policy(&word_storage);
/// let info = builder.build(node, state, None, None, None)?;
/// ```
pub struct DebugInfoBuilder<'a, C = DebugInfoCounters> {
    graph: &'a Graph,
    types: &'a TypePool,
    methods: &'a MethodTable,
    locations: &'a dyn LocationMap,
    policy: &'a dyn BackendPolicy,
    config: DebugInfoConfig,
    counters: C,
    object_states: ObjectStates<'a>,
    registry: VirtualObjectRegistry,
}

impl<'a> DebugInfoBuilder<'a, DebugInfoCounters> {
    /// Create a builder with the intrinsic storage policy, default
    /// configuration and in-memory counters.
    pub fn new(
        graph: &'a Graph,
        types: &'a TypePool,
        methods: &'a MethodTable,
        locations: &'a dyn LocationMap,
    ) -> Self {
        Self {
            graph,
            types,
            methods,
            locations,
            policy: &IntrinsicStorage,
            config: DebugInfoConfig::default(),
            counters: DebugInfoCounters::default(),
            object_states: ObjectStates::default(),
            registry: VirtualObjectRegistry::default(),
        }
    }
}

impl<'a, C: CounterSink> DebugInfoBuilder<'a, C> {
    #[must_use]
    pub fn with_policy(mut self, policy: &'a dyn BackendPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: DebugInfoConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the counter sink.
    pub fn with_counters<D: CounterSink>(self, counters: D) -> DebugInfoBuilder<'a, D> {
        DebugInfoBuilder {
            graph: self.graph,
            types: self.types,
            methods: self.methods,
            locations: self.locations,
            policy: self.policy,
            config: self.config,
            counters,
            object_states: self.object_states,
            registry: self.registry,
        }
    }

    #[inline]
    pub fn config(&self) -> &DebugInfoConfig {
        &self.config
    }

    #[inline]
    pub fn counters(&self) -> &C {
        &self.counters
    }

    pub fn into_counters(self) -> C {
        self.counters
    }

    /// Build debug info for `node` whose innermost frame state is `state`.
    ///
    /// `exception_edge` is the handler block for states with an exception
    /// edge. A deoptimization reason or speculation turns the result into an
    /// implicit deoptimization point.
    pub fn build(
        &mut self,
        node: ValueId,
        state: FrameStateId,
        exception_edge: Option<BlockLabel>,
        deopt_reason_and_action: Option<Constant>,
        deopt_speculation: Option<Constant>,
    ) -> DebugInfoResult<DebugInfo> {
        debug_assert!(
            self.object_states.is_empty(),
            "escape states left over from a previous build"
        );
        debug_assert!(
            self.registry.is_empty(),
            "virtual objects left over from a previous build"
        );

        let implicit_deopt = (deopt_reason_and_action.is_some() || deopt_speculation.is_some())
            .then_some(ImplicitDeopt {
                reason_and_action: deopt_reason_and_action,
                speculation: deopt_speculation,
            });
        let result = self
            .build_info(node, state, exception_edge, implicit_deopt)
            .context(ErrorContext::Node(node));

        self.object_states.clear();
        self.registry.clear();
        result
    }

    fn build_info(
        &mut self,
        node: ValueId,
        state: FrameStateId,
        exception_edge: Option<BlockLabel>,
        implicit_deopt: Option<ImplicitDeopt>,
    ) -> DebugInfoResult<DebugInfo> {
        let valid_for_deoptimization = self.collect_object_states(state)?;

        self.policy
            .verify_frame_state(self.graph, node, state)
            .map_err(|reason| {
                DebugInfoError::new(DebugInfoErrorKind::PlatformCheck { reason })
                    .with_context(ErrorContext::FrameState(state))
            })?;

        let frame = self.compute_frame(state, 0)?;
        self.fill_pending_objects()?;
        let virtual_objects = self.registry.take_descriptors();

        tracing::debug!(
            %node,
            %state,
            frames = frame.depth(),
            virtual_objects = virtual_objects.len(),
            valid_for_deoptimization,
            "built debug info"
        );

        Ok(DebugInfo {
            frame,
            virtual_objects,
            exception_edge,
            implicit_deopt,
            valid_for_deoptimization,
        })
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
