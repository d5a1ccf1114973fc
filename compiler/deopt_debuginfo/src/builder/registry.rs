//! Virtual-object registry and entry filling.
//!
//! Virtual objects are registered lazily while frames are resolved. The
//! first reference assigns the next dense [`VirtualObjectIndex`] and queues
//! the object; the (still empty) descriptor index is returned at once, so
//! objects that reference each other resolve without a completed graph.
//!
//! After all frames are built the queue is drained: each object's entries
//! are resolved from its field mapping, which can register more objects.
//! Once drained the registry is sealed for the rest of the build.

use std::collections::VecDeque;

use deopt_ir::{Constant, EscapeObjectState, TypeId, ValueId, ValueKind, VirtualObjectDef};
use rustc_hash::FxHashMap;

use super::DebugInfoBuilder;
use crate::counters::CounterSink;
use crate::errors::{DebugInfoErrorKind, DebugInfoResult, ErrorContext, ResultExt};
use crate::output::{DebugValue, VirtualObjectDescriptor, VirtualObjectIndex};
use crate::shape::check_virtual_object_shape;

/// Descriptor arena plus pending work list, for one build.
#[derive(Debug, Default)]
pub(super) struct VirtualObjectRegistry {
    descriptors: Vec<VirtualObjectDescriptor>,
    index_of: FxHashMap<ValueId, VirtualObjectIndex>,
    pending: VecDeque<(VirtualObjectIndex, ValueId)>,
    drained: bool,
}

impl VirtualObjectRegistry {
    pub(super) fn is_empty(&self) -> bool {
        self.descriptors.is_empty() && self.pending.is_empty() && !self.drained
    }

    /// Index of `object`, registering and queueing it on first reference.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "virtual object indices never exceed u32"
    )]
    pub(super) fn register(
        &mut self,
        object: ValueId,
        def: &VirtualObjectDef,
    ) -> DebugInfoResult<VirtualObjectIndex> {
        if let Some(&index) = self.index_of.get(&object) {
            return Ok(index);
        }
        if self.drained {
            return Err(DebugInfoErrorKind::RegistryDrained { object }.into());
        }
        let index = VirtualObjectIndex::new(self.descriptors.len() as u32);
        self.descriptors
            .push(VirtualObjectDescriptor::new(index, def.ty, def.auto_box));
        self.index_of.insert(object, index);
        self.pending.push_back((index, object));
        tracing::trace!(%object, %index, "registered virtual object");
        Ok(index)
    }

    fn pop_pending(&mut self) -> Option<(VirtualObjectIndex, ValueId)> {
        self.pending.pop_front()
    }

    fn descriptor_mut(&mut self, index: VirtualObjectIndex) -> &mut VirtualObjectDescriptor {
        &mut self.descriptors[index.index()]
    }

    /// No further registrations are allowed in this build.
    fn seal(&mut self) {
        debug_assert!(self.pending.is_empty());
        self.drained = true;
    }

    /// Hand the descriptors over, in index order.
    pub(super) fn take_descriptors(&mut self) -> Vec<VirtualObjectDescriptor> {
        std::mem::take(&mut self.descriptors)
    }

    pub(super) fn clear(&mut self) {
        self.descriptors.clear();
        self.index_of.clear();
        self.pending.clear();
        self.drained = false;
    }
}

impl<C: CounterSink> DebugInfoBuilder<'_, C> {
    /// Fill every queued virtual object, including ones queued while filling.
    pub(super) fn fill_pending_objects(&mut self) -> DebugInfoResult<()> {
        while let Some((index, object)) = self.registry.pop_pending() {
            let (values, slot_kinds) = self
                .virtual_object_entries(object)
                .context(ErrorContext::VirtualObject(object))?;

            let ty = self.registry.descriptor_mut(index).ty;
            if self.config.verify_shapes {
                check_virtual_object_shape(self.types, self.policy, ty, &values, &slot_kinds)
                    .context(ErrorContext::VirtualObject(object))?;
            }
            tracing::trace!(
                %object,
                %index,
                entries = values.len(),
                "filled virtual object"
            );
            self.registry
                .descriptor_mut(index)
                .set_entries(values, slot_kinds)?;
        }
        self.registry.seal();
        Ok(())
    }

    /// Resolve the entries of `object` from its field mapping.
    ///
    /// The result can be shorter than the declared entry count: the
    /// illegal continuation of a two-slot value is dropped. Byte arrays keep
    /// their illegal markers so the VM can count how many bytes a wide
    /// write covered, e.g. a `short` stored at index 2 of a 6-byte array is
    /// `[b0, b1, SHORT, ILLEGAL, b4, b5]`.
    fn virtual_object_entries(
        &mut self,
        object: ValueId,
    ) -> DebugInfoResult<(Vec<DebugValue>, Vec<ValueKind>)> {
        let graph = self.graph;
        let types = self.types;
        let policy = self.policy;
        let storage = |ty: TypeId| policy.storage_kind(types, ty);

        let Some(def) = graph.as_virtual_object(object) else {
            return Err(DebugInfoErrorKind::NotAVirtualObject { object }.into());
        };
        let entry_count = def.entry_count(types);
        if entry_count == 0 {
            return Ok((Vec::new(), Vec::new()));
        }

        let Some(EscapeObjectState::FieldMapping {
            values: mapping, ..
        }) = self.object_states.get(object)
        else {
            return Err(DebugInfoErrorKind::MissingObjectState { object }.into());
        };
        if mapping.len() != entry_count {
            return Err(DebugInfoErrorKind::EntryCountMismatch {
                object,
                expected: entry_count,
                actual: mapping.len(),
            }
            .into());
        }

        let byte_array = def.is_byte_array(types, storage);
        let mut values = Vec::with_capacity(entry_count);
        let mut slot_kinds = Vec::with_capacity(entry_count);

        for (index, entry) in mapping.iter().enumerate() {
            match *entry {
                None => {
                    let kind = def.entry_kind(types, storage, index).stack_kind();
                    values.push(DebugValue::Constant(Constant::default_for_kind(kind)));
                    slot_kinds.push(kind);
                }
                Some(value) if !graph.is_illegal_marker(value) => {
                    values.push(self.resolve(Some(value))?);
                    slot_kinds.push(self.slot_kind(Some(value)));
                }
                Some(_) => {
                    if byte_array {
                        values.push(DebugValue::Illegal);
                        slot_kinds.push(ValueKind::Illegal);
                        continue;
                    }
                    let previous = index.checked_sub(1).and_then(|p| mapping[p]);
                    let follows_two_slot =
                        previous.is_some_and(|p| graph.stack_kind(p).needs_two_slots());
                    if !follows_two_slot {
                        return Err(
                            DebugInfoErrorKind::UnexpectedIllegalEntry { object, index }.into()
                        );
                    }
                    // Covered by the two-slot value before it.
                }
            }
        }

        Ok((values, slot_kinds))
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
