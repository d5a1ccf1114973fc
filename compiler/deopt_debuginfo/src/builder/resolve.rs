//! Value resolution.
//!
//! Maps one abstract slot value to a [`DebugValue`]:
//!
//! - virtual object → its materialized value, or a descriptor index
//!   (registering the object on first reference);
//! - constant, possibly behind proxies → the constant itself;
//! - anything else → the operand the register allocator chose;
//! - empty slot → [`DebugValue::Illegal`].

use deopt_ir::{EscapeObjectState, ValueId, ValueKind};

use super::DebugInfoBuilder;
use crate::counters::{CounterSink, StateCounter};
use crate::errors::{DebugInfoErrorKind, DebugInfoResult, ErrorContext, ResultExt};
use crate::location::Location;
use crate::output::DebugValue;

impl<C: CounterSink> DebugInfoBuilder<'_, C> {
    /// Resolve one slot. Failures carry the slot's value as context.
    pub(super) fn resolve(&mut self, value: Option<ValueId>) -> DebugInfoResult<DebugValue> {
        let Some(value) = value else {
            // Dead slot: the real value is never read.
            self.counters.increment(StateCounter::Illegals);
            return Ok(DebugValue::Illegal);
        };
        self.resolve_value(value).context(ErrorContext::Value(value))
    }

    /// Stack-width kind of a slot; `Illegal` for an empty slot.
    pub(super) fn slot_kind(&self, value: Option<ValueId>) -> ValueKind {
        value.map_or(ValueKind::Illegal, |v| self.graph.stack_kind(v))
    }

    fn resolve_value(&mut self, value: ValueId) -> DebugInfoResult<DebugValue> {
        let graph = self.graph;
        if graph.as_virtual_object(value).is_some() {
            return self.resolve_virtual_object(value);
        }

        // Proxies only tag a value for bookkeeping; embed the constant
        // behind them directly.
        if let Some(constant) = graph.as_constant(graph.unproxify(value)) {
            self.counters.increment(StateCounter::Constants);
            return Ok(DebugValue::Constant(constant));
        }

        self.counters.increment(StateCounter::Variables);
        match self.locations.operand(value) {
            Some(Location::Constant(constant)) => Ok(DebugValue::Constant(constant)),
            Some(Location::Variable(variable)) => Ok(DebugValue::Variable(variable)),
            Some(Location::Register(register)) => Ok(DebugValue::Register(register)),
            Some(location) => {
                Err(DebugInfoErrorKind::UnexpectedLocation { value, location }.into())
            }
            None => Err(DebugInfoErrorKind::MissingLocation { value }.into()),
        }
    }

    /// Follow materializations, then register the object if still virtual.
    fn resolve_virtual_object(&mut self, object: ValueId) -> DebugInfoResult<DebugValue> {
        let graph = self.graph;
        let mut current = object;
        let mut hops = 0;

        loop {
            let Some(def) = graph.as_virtual_object(current) else {
                // Materialized as an ordinary value.
                return self
                    .resolve_value(current)
                    .context(ErrorContext::Value(current));
            };

            match self.object_states.get(current) {
                Some(EscapeObjectState::Materialized { value, .. }) => {
                    hops += 1;
                    if hops > self.object_states.len() {
                        return Err(DebugInfoErrorKind::MaterializationCycle { object }.into());
                    }
                    current = *value;
                }
                state => {
                    // Objects without entries need no recorded state.
                    if state.is_none() && def.entry_count(self.types) > 0 {
                        return Err(
                            DebugInfoErrorKind::MissingObjectState { object: current }.into()
                        );
                    }
                    let index = self.registry.register(current, def)?;
                    self.counters.increment(StateCounter::VirtualObjects);
                    return Ok(DebugValue::VirtualObject(index));
                }
            }
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
