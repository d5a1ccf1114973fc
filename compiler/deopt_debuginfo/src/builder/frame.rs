//! Frame descriptor construction.
//!
//! One [`FrameDescriptor`] per inlining level, built recursively outward
//! along the frame-state chain. Each level's slots go into a single value
//! array (locals, then stack, then locks) with a kind array for locals and
//! stack.

use deopt_ir::{FrameState, FrameStateId, ValueId, ValueKind};
use deopt_stack::ensure_sufficient_stack;

use super::DebugInfoBuilder;
use crate::counters::CounterSink;
use crate::errors::{DebugInfoError, DebugInfoErrorKind, DebugInfoResult, ErrorContext, ResultExt};
use crate::output::{DebugValue, FrameDescriptor};

impl<C: CounterSink> DebugInfoBuilder<'_, C> {
    /// Build the descriptor for `id` and, recursively, its callers.
    ///
    /// `depth` is the number of frames already built below this one.
    pub(super) fn compute_frame(
        &mut self,
        id: FrameStateId,
        depth: usize,
    ) -> DebugInfoResult<FrameDescriptor> {
        ensure_sufficient_stack(|| self.compute_frame_for_state(id, depth))
            .context(ErrorContext::FrameState(id))
    }

    fn compute_frame_for_state(
        &mut self,
        id: FrameStateId,
        depth: usize,
    ) -> DebugInfoResult<FrameDescriptor> {
        let limit = self.config.max_inlining_depth;
        if depth >= limit {
            return Err(DebugInfoErrorKind::InliningTooDeep { limit }.into());
        }

        let graph = self.graph;
        let state = graph.frame_state(id);
        self.check_position(state)?;
        state.verify(graph).map_err(|defect| {
            DebugInfoError::new(DebugInfoErrorKind::MalformedFrameState { defect })
        })?;

        let num_locals = state.locals_size();
        let num_stack = state.stack_size();
        let num_locks = state.locks_size();
        let mut values = Vec::with_capacity(num_locals + num_stack + num_locks);
        let mut slot_kinds = Vec::with_capacity(num_locals + num_stack);

        self.compute_slots(&state.locals, &mut values, &mut slot_kinds)?;
        self.compute_slots(&state.stack, &mut values, &mut slot_kinds)?;
        self.compute_locks(state, &mut values)?;

        let caller = match state.outer {
            Some(outer) => Some(Box::new(self.compute_frame(outer, depth + 1)?)),
            None => None,
        };

        if !state.can_produce_bytecode_frame(self.methods) {
            // Usually a snippet or intrinsic state that reached the backend.
            let location = match state.code.and_then(|code| self.methods.method_for_code(code)) {
                Some(code_owner) => code_owner.stack_trace_element(state.bci),
                None => format!(
                    "{id} of {}",
                    self.methods.get(state.method).stack_trace_element(state.bci)
                ),
            };
            return Err(DebugInfoErrorKind::CannotProduceFrame { location }.into());
        }

        Ok(FrameDescriptor {
            caller,
            method: state.method,
            bci: state.bci,
            rethrow_exception: state.rethrow_exception,
            during_call: state.during_call,
            values,
            slot_kinds,
            num_locals,
            num_stack,
            num_locks,
        })
    }

    /// Position and monitor invariants.
    fn check_position(&self, state: &FrameState) -> DebugInfoResult<()> {
        let bci = state.bci;
        if bci.is_undefined() {
            return Err(DebugInfoErrorKind::UndefinedBci { bci }.into());
        }
        let locks = state.locks_size();
        if bci.is_call_boundary() && locks != 0 {
            return Err(DebugInfoErrorKind::LocksAtCallBoundary { bci, locks }.into());
        }
        // A synchronized method holds its monitor everywhere except at the
        // call boundaries of its own entry and exit.
        let method = self.methods.get(state.method);
        if method.is_synchronized()
            && !bci.is_call_boundary()
            && state.valid_for_deoptimization
            && locks == 0
        {
            return Err(DebugInfoErrorKind::MissingMonitor {
                method: format!("{}.{}", method.holder, method.name),
                bci,
            }
            .into());
        }
        Ok(())
    }

    fn compute_slots(
        &mut self,
        slots: &[Option<ValueId>],
        values: &mut Vec<DebugValue>,
        slot_kinds: &mut Vec<ValueKind>,
    ) -> DebugInfoResult<()> {
        for &slot in slots {
            values.push(self.resolve(slot)?);
            slot_kinds.push(self.slot_kind(slot));
        }
        Ok(())
    }

    /// Locks are object references and get no kind entry.
    fn compute_locks(
        &mut self,
        state: &FrameState,
        values: &mut Vec<DebugValue>,
    ) -> DebugInfoResult<()> {
        for (index, &lock) in state.locks.iter().enumerate() {
            let value = match self.policy.lock_value(self.graph, state, index) {
                Some(value) => value,
                None => self.resolve(lock)?,
            };
            values.push(value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
