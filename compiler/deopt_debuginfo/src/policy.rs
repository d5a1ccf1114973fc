//! Host customization hooks.
//!
//! A backend may store some declared types differently from their
//! intrinsic kind. The usual case is machine-word types: logically object
//! references, physically raw 64-bit words. [`BackendPolicy`] is injected
//! into the builder instead of being a subclassing point.

use deopt_ir::{FrameState, FrameStateId, Graph, TypeId, TypePool, ValueId, ValueKind};
use rustc_hash::FxHashSet;

use crate::output::DebugValue;

/// Storage-kind mapping, lock values and platform frame-state verification.
pub trait BackendPolicy {
    /// Runtime representation kind used to store a value of type `ty`.
    fn storage_kind(&self, types: &TypePool, ty: TypeId) -> ValueKind {
        types.intrinsic_kind(ty)
    }

    /// Debug value recorded for lock `index` of `state`.
    ///
    /// `None` resolves the locked object like any other slot. Backends that
    /// keep monitors in dedicated stack slots return the slot here.
    fn lock_value(&self, _graph: &Graph, _state: &FrameState, _index: usize) -> Option<DebugValue> {
        None
    }

    /// Platform-specific check of the innermost frame state of `node`.
    ///
    /// Runs once per build before any frame descriptor is built. Returns a
    /// reason on failure.
    fn verify_frame_state(
        &self,
        _graph: &Graph,
        _node: ValueId,
        _state: FrameStateId,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Every type is stored as its intrinsic kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntrinsicStorage;

impl BackendPolicy for IntrinsicStorage {}

/// Stores a set of word types as raw `Long`s; everything else is intrinsic.
#[derive(Clone, Debug, Default)]
pub struct WordStorage {
    word_types: FxHashSet<TypeId>,
}

impl WordStorage {
    pub fn new(word_types: impl IntoIterator<Item = TypeId>) -> Self {
        Self {
            word_types: word_types.into_iter().collect(),
        }
    }

    pub fn is_word(&self, ty: TypeId) -> bool {
        self.word_types.contains(&ty)
    }
}

impl BackendPolicy for WordStorage {
    fn storage_kind(&self, types: &TypePool, ty: TypeId) -> ValueKind {
        if self.is_word(ty) {
            ValueKind::Long
        } else {
            types.intrinsic_kind(ty)
        }
    }
}
