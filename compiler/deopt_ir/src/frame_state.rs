//! Abstract interpreter frame states.
//!
//! A [`FrameState`] snapshots one interpreter frame at one inlining level:
//! locals, operand stack, held locks and bytecode position. Inlined callees
//! point at their caller through `outer`, forming a singly linked chain
//! from the innermost frame outward.
//!
//! Slots hold `Option<ValueId>`. An empty slot is a value the optimizer
//! proved is never read, or the upper half of a two-slot value.

use std::fmt;

use smallvec::SmallVec;

use crate::{CodeId, Graph, MethodId, MethodTable, ValueId, ValueKind};

/// Index of a frame state in a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FrameStateId(u32);

impl FrameStateId {
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

impl fmt::Display for FrameStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fs{}", self.0)
    }
}

/// Bytecode position of a frame state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bci {
    /// An ordinary instruction offset.
    At(u32),
    /// Before the first instruction of a call's target, arguments still on
    /// the caller's stack.
    BeforeCall,
    /// After the callee returned, before the result is pushed.
    AfterCall,
    /// At the exception dispatch point following a throwing call.
    AfterException,
    /// Position never determined.
    Unknown,
    /// A state that must never reach the backend.
    Invalid,
}

impl Bci {
    pub const BEFORE_RAW: i32 = -1;
    pub const AFTER_RAW: i32 = -2;
    pub const AFTER_EXCEPTION_RAW: i32 = -4;
    pub const UNKNOWN_RAW: i32 = -5;
    pub const INVALID_RAW: i32 = -6;

    /// The VM's integer encoding of this position.
    #[expect(
        clippy::cast_possible_wrap,
        reason = "bytecode offsets are bounded by the class-file code length"
    )]
    pub fn as_raw(self) -> i32 {
        match self {
            Self::At(bci) => bci as i32,
            Self::BeforeCall => Self::BEFORE_RAW,
            Self::AfterCall => Self::AFTER_RAW,
            Self::AfterException => Self::AFTER_EXCEPTION_RAW,
            Self::Unknown => Self::UNKNOWN_RAW,
            Self::Invalid => Self::INVALID_RAW,
        }
    }

    /// Decode a raw VM position. Unrecognized negative values decode as
    /// `Invalid`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::BEFORE_RAW => Self::BeforeCall,
            Self::AFTER_RAW => Self::AfterCall,
            Self::AFTER_EXCEPTION_RAW => Self::AfterException,
            Self::UNKNOWN_RAW => Self::Unknown,
            raw => u32::try_from(raw).map_or(Self::Invalid, Self::At),
        }
    }

    /// One of the call-boundary sentinels, where no monitor may be held.
    #[inline]
    pub fn is_call_boundary(self) -> bool {
        matches!(self, Self::BeforeCall | Self::AfterCall | Self::AfterException)
    }

    /// `Unknown` or `Invalid`.
    #[inline]
    pub fn is_undefined(self) -> bool {
        matches!(self, Self::Unknown | Self::Invalid)
    }
}

impl fmt::Display for Bci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(bci) => write!(f, "{bci}"),
            Self::BeforeCall => f.write_str("BEFORE_BCI"),
            Self::AfterCall => f.write_str("AFTER_BCI"),
            Self::AfterException => f.write_str("AFTER_EXCEPTION_BCI"),
            Self::Unknown => f.write_str("UNKNOWN_BCI"),
            Self::Invalid => f.write_str("INVALID_FRAMESTATE_BCI"),
        }
    }
}

/// Escape state of one virtual object, attached to a frame state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EscapeObjectState {
    /// Field/element values, parallel to the object's declared entries.
    /// `None` means "no override at this level".
    FieldMapping {
        object: ValueId,
        values: Vec<Option<ValueId>>,
    },
    /// The object was allocated for real; `value` stands in for it.
    Materialized { object: ValueId, value: ValueId },
}

impl EscapeObjectState {
    /// The virtual object this state describes.
    #[inline]
    pub fn object(&self) -> ValueId {
        match self {
            Self::FieldMapping { object, .. } | Self::Materialized { object, .. } => *object,
        }
    }

    /// A materialization whose value is the object itself carries no
    /// information and is treated as absent.
    #[inline]
    pub fn is_self_materialization(&self) -> bool {
        matches!(self, Self::Materialized { object, value } if object == value)
    }
}

/// Which slot area a [`StateDefect`] was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotArea {
    Local,
    Stack,
    Lock,
}

impl fmt::Display for SlotArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Stack => "stack",
            Self::Lock => "lock",
        })
    }
}

/// Structural defect reported by [`FrameState::verify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateDefect {
    /// A two-slot value is not followed by an empty slot.
    MissingSecondSlot { area: SlotArea, index: usize },
    /// A lock slot is empty.
    EmptyLock { index: usize },
    /// A lock slot holds a non-object value.
    NonObjectLock { index: usize, kind: ValueKind },
}

impl fmt::Display for StateDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecondSlot { area, index } => write!(
                f,
                "two-slot {area} {index} is not followed by an empty slot"
            ),
            Self::EmptyLock { index } => write!(f, "lock {index} is empty"),
            Self::NonObjectLock { index, kind } => {
                write!(f, "lock {index} holds a {kind} value")
            }
        }
    }
}

/// One interpreter frame snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameState {
    pub method: MethodId,
    /// Code this state was parsed from; `None` for synthetic states.
    pub code: Option<CodeId>,
    pub bci: Bci,
    pub outer: Option<FrameStateId>,
    pub locals: Vec<Option<ValueId>>,
    pub stack: Vec<Option<ValueId>>,
    pub locks: Vec<Option<ValueId>>,
    /// The exception on top of the stack is about to be rethrown.
    pub rethrow_exception: bool,
    /// Execution is inside the call at `bci`.
    pub during_call: bool,
    pub valid_for_deoptimization: bool,
    pub virtual_mappings: SmallVec<[EscapeObjectState; 2]>,
}

impl FrameState {
    /// A state for `method` at `bci` parsed from the method's own code.
    pub fn new(methods: &MethodTable, method: MethodId, bci: Bci) -> Self {
        Self {
            method,
            code: Some(methods.code_of(method)),
            bci,
            outer: None,
            locals: Vec::new(),
            stack: Vec::new(),
            locks: Vec::new(),
            rethrow_exception: false,
            during_call: false,
            valid_for_deoptimization: true,
            virtual_mappings: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_outer(mut self, outer: FrameStateId) -> Self {
        self.outer = Some(outer);
        self
    }

    #[must_use]
    pub fn with_locals(mut self, locals: impl IntoIterator<Item = Option<ValueId>>) -> Self {
        self.locals = locals.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl IntoIterator<Item = Option<ValueId>>) -> Self {
        self.stack = stack.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_locks(mut self, locks: impl IntoIterator<Item = ValueId>) -> Self {
        self.locks = locks.into_iter().map(Some).collect();
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, state: EscapeObjectState) -> Self {
        self.virtual_mappings.push(state);
        self
    }

    #[inline]
    pub fn locals_size(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn locks_size(&self) -> usize {
        self.locks.len()
    }

    /// Whether the state's code is the method's own code. Snippet and
    /// intrinsic states fail this and cannot become interpreter frames.
    pub fn can_produce_bytecode_frame(&self, methods: &MethodTable) -> bool {
        self.code == Some(methods.code_of(self.method))
    }

    /// Structural self-check.
    pub fn verify(&self, graph: &Graph) -> Result<(), StateDefect> {
        verify_slots(graph, &self.locals, SlotArea::Local)?;
        verify_slots(graph, &self.stack, SlotArea::Stack)?;
        for (index, lock) in self.locks.iter().enumerate() {
            let Some(lock) = lock else {
                return Err(StateDefect::EmptyLock { index });
            };
            let kind = graph.stack_kind(*lock);
            if !kind.is_object() {
                return Err(StateDefect::NonObjectLock { index, kind });
            }
        }
        Ok(())
    }
}

fn verify_slots(graph: &Graph, slots: &[Option<ValueId>], area: SlotArea) -> Result<(), StateDefect> {
    for (index, slot) in slots.iter().enumerate() {
        let Some(value) = slot else { continue };
        if graph.stack_kind(*value).needs_two_slots() && !matches!(slots.get(index + 1), Some(None)) {
            return Err(StateDefect::MissingSecondSlot { area, index });
        }
    }
    Ok(())
}

impl Graph {
    /// Walk the frame-state chain from `innermost` outward.
    pub fn outer_chain(
        &self,
        innermost: FrameStateId,
    ) -> impl Iterator<Item = (FrameStateId, &FrameState)> + '_ {
        std::iter::successors(Some(innermost), |id| self.frame_state(*id).outer)
            .map(|id| (id, self.frame_state(id)))
    }
}

#[cfg(test)]
mod tests;
