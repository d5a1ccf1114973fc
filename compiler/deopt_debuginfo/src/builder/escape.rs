//! Escape-state collection.
//!
//! Walks the frame-state chain innermost to outermost and records, per
//! virtual object, the first escape state encountered. An inlined callee's
//! view of an object is always at least as recent as its caller's, so the
//! innermost record wins and outer ones are ignored.

use deopt_ir::{EscapeObjectState, FrameStateId, ValueId};
use rustc_hash::FxHashMap;

use super::DebugInfoBuilder;
use crate::counters::CounterSink;
use crate::errors::{DebugInfoError, DebugInfoErrorKind, DebugInfoResult, ErrorContext};

/// Winning escape state per virtual object, for one build.
#[derive(Debug, Default)]
pub(super) struct ObjectStates<'a> {
    states: FxHashMap<ValueId, &'a EscapeObjectState>,
}

impl<'a> ObjectStates<'a> {
    #[inline]
    pub(super) fn get(&self, object: ValueId) -> Option<&'a EscapeObjectState> {
        self.states.get(&object).copied()
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub(super) fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(super) fn clear(&mut self) {
        self.states.clear();
    }

    /// Record `state` unless an inner frame already named its object.
    fn record(&mut self, state: &'a EscapeObjectState) {
        self.states.entry(state.object()).or_insert(state);
    }
}

impl<C: CounterSink> DebugInfoBuilder<'_, C> {
    /// Collect escape states over the whole chain starting at `top`.
    ///
    /// Returns whether every frame level is valid for deoptimization.
    pub(super) fn collect_object_states(&mut self, top: FrameStateId) -> DebugInfoResult<bool> {
        let graph = self.graph;
        let limit = self.config.max_inlining_depth;
        let mut valid_for_deoptimization = true;

        for (depth, (id, state)) in graph.outer_chain(top).enumerate() {
            if depth >= limit {
                return Err(DebugInfoError::new(DebugInfoErrorKind::InliningTooDeep { limit })
                    .with_context(ErrorContext::FrameState(id)));
            }
            for mapping in &state.virtual_mappings {
                let object = mapping.object();
                if graph.as_virtual_object(object).is_none() {
                    return Err(
                        DebugInfoError::new(DebugInfoErrorKind::NotAVirtualObject { object })
                            .with_context(ErrorContext::FrameState(id)),
                    );
                }
                // A materialization to the object itself says nothing.
                if mapping.is_self_materialization() {
                    continue;
                }
                self.object_states.record(mapping);
            }
            valid_for_deoptimization &= state.valid_for_deoptimization;
        }

        Ok(valid_for_deoptimization)
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
