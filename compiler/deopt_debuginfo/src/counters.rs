//! Observability counters.
//!
//! The builder bumps one of four counters for each slot it resolves. The
//! counters are a sink only: nothing in the builder reads them back. Each
//! builder owns its sink, so concurrent compilations on separate builders
//! never contend.

use std::fmt;

/// Which counter to increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateCounter {
    /// A virtual object reference was emitted.
    VirtualObjects,
    /// A "value not needed" placeholder was emitted.
    Illegals,
    /// A value was resolved through the location map.
    Variables,
    /// A constant was embedded directly.
    Constants,
}

impl StateCounter {
    pub fn name(self) -> &'static str {
        match self {
            Self::VirtualObjects => "StateVirtualObjects",
            Self::Illegals => "StateIllegals",
            Self::Variables => "StateVariables",
            Self::Constants => "StateConstants",
        }
    }
}

impl fmt::Display for StateCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counter-increment interface.
pub trait CounterSink {
    fn increment(&mut self, counter: StateCounter);
}

/// Discards every increment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCounters;

impl CounterSink for NoCounters {
    #[inline]
    fn increment(&mut self, _counter: StateCounter) {}
}

/// Plain in-memory counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugInfoCounters {
    pub virtual_objects: u64,
    pub illegals: u64,
    pub variables: u64,
    pub constants: u64,
}

impl CounterSink for DebugInfoCounters {
    #[inline]
    fn increment(&mut self, counter: StateCounter) {
        let slot = match counter {
            StateCounter::VirtualObjects => &mut self.virtual_objects,
            StateCounter::Illegals => &mut self.illegals,
            StateCounter::Variables => &mut self.variables,
            StateCounter::Constants => &mut self.constants,
        };
        *slot = slot.wrapping_add(1);
    }
}

impl DebugInfoCounters {
    pub fn get(&self, counter: StateCounter) -> u64 {
        match counter {
            StateCounter::VirtualObjects => self.virtual_objects,
            StateCounter::Illegals => self.illegals,
            StateCounter::Variables => self.variables,
            StateCounter::Constants => self.constants,
        }
    }

    /// Accumulate another builder's counters, e.g. one per worker thread.
    pub fn merge(&mut self, other: &DebugInfoCounters) {
        self.virtual_objects = self.virtual_objects.wrapping_add(other.virtual_objects);
        self.illegals = self.illegals.wrapping_add(other.illegals);
        self.variables = self.variables.wrapping_add(other.variables);
        self.constants = self.constants.wrapping_add(other.constants);
    }

    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Debug info counters:\n  \
             {}: {}\n  \
             {}: {}\n  \
             {}: {}\n  \
             {}: {}",
            StateCounter::VirtualObjects,
            self.virtual_objects,
            StateCounter::Illegals,
            self.illegals,
            StateCounter::Variables,
            self.variables,
            StateCounter::Constants,
            self.constants,
        )
    }
}
