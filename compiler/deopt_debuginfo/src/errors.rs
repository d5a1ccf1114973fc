//! Structural errors raised while building debug info.
//!
//! Every failure here means the optimizer's claims and the builder's
//! assumptions disagree. None of them is recoverable: the driver aborts the
//! compilation of the current method. Errors pick up an [`ErrorContext`]
//! at each recursion level they pass through, innermost first, so a failure
//! deep in an inlined frame still names the exact value and frame state.

use std::fmt;

use deopt_ir::{Bci, FrameStateId, StateDefect, ValueId};
use thiserror::Error;

use crate::location::Location;
use crate::output::VirtualObjectIndex;

/// Result alias used throughout the builder.
pub type DebugInfoResult<T> = Result<T, DebugInfoError>;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DebugInfoErrorKind {
    // Escape states
    #[error("escape state owner {object} is not a virtual object")]
    NotAVirtualObject { object: ValueId },

    #[error("no mapping found for virtual object {object}")]
    MissingObjectState { object: ValueId },

    #[error("virtual object {object}: illegal entry {index} follows neither a two-slot value nor a byte-array write")]
    UnexpectedIllegalEntry { object: ValueId, index: usize },

    #[error("virtual object {object} declares {expected} entries but its field mapping has {actual}")]
    EntryCountMismatch {
        object: ValueId,
        expected: usize,
        actual: usize,
    },

    #[error("materialization of virtual object {object} leads back to itself")]
    MaterializationCycle { object: ValueId },

    // Frame states
    #[error("frame state has undefined bci {bci}")]
    UndefinedBci { bci: Bci },

    #[error("frame state at {bci} holds {locks} lock(s) at a call boundary")]
    LocksAtCallBoundary { bci: Bci, locks: usize },

    #[error("synchronized method {method} holds no monitor at bci {bci}")]
    MissingMonitor { method: String, bci: Bci },

    #[error("malformed frame state: {defect}")]
    MalformedFrameState { defect: StateDefect },

    #[error("Frame state for {location} cannot be converted to a bytecode frame since the frame state's code is not the same as the frame state method's code")]
    CannotProduceFrame { location: String },

    #[error("frame state chain exceeds the inlining depth limit of {limit}")]
    InliningTooDeep { limit: usize },

    #[error("platform frame-state check failed: {reason}")]
    PlatformCheck { reason: String },

    // Value resolution
    #[error("value {value} has no location")]
    MissingLocation { value: ValueId },

    #[error("unexpected location {location} for {value}")]
    UnexpectedLocation { value: ValueId, location: Location },

    // Registry
    #[error("virtual object descriptor {index} is already filled")]
    DescriptorAlreadyFilled { index: VirtualObjectIndex },

    #[error("virtual object {object} referenced after pending objects were drained")]
    RegistryDrained { object: ValueId },

    // Shape check
    #[error("{ty}: {detail}")]
    ShapeMismatch { ty: String, detail: String },
}

/// Where an error was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorContext {
    /// The node whose state was being described.
    Node(ValueId),
    FrameState(FrameStateId),
    /// A value being resolved.
    Value(ValueId),
    /// A virtual object whose entries were being filled.
    VirtualObject(ValueId),
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => write!(f, "node: {node}"),
            Self::FrameState(state) => write!(f, "FrameState: {state}"),
            Self::Value(value) => write!(f, "toValue: {value}"),
            Self::VirtualObject(object) => write!(f, "virtual object: {object}"),
        }
    }
}

/// A structural error with the context it propagated through.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}{}", render_context(.context))]
pub struct DebugInfoError {
    kind: DebugInfoErrorKind,
    context: Vec<ErrorContext>,
}

fn render_context(context: &[ErrorContext]) -> String {
    context.iter().map(|c| format!("\n  at {c}")).collect()
}

impl DebugInfoError {
    pub fn new(kind: DebugInfoErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &DebugInfoErrorKind {
        &self.kind
    }

    /// Context entries, innermost first.
    #[inline]
    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }

    /// Append a context entry.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context.push(context);
        self
    }
}

impl From<DebugInfoErrorKind> for DebugInfoError {
    fn from(kind: DebugInfoErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Extension for attaching context on the error path of a result.
pub(crate) trait ResultExt<T> {
    fn context(self, context: ErrorContext) -> DebugInfoResult<T>;
}

impl<T> ResultExt<T> for DebugInfoResult<T> {
    #[inline]
    fn context(self, context: ErrorContext) -> DebugInfoResult<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
