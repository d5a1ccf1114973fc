//! Deoptimization debug info for the JIT backend.
//!
//! When compiled code gives up and falls back to the interpreter, the VM
//! needs an exact picture of every interpreter frame at that point: locals,
//! operand stack and held locks for each inlined method, plus recipes for
//! rebuilding objects that escape analysis replaced by their fields.
//!
//! This crate provides:
//!
//! - **[`DebugInfoBuilder`]**: turns the innermost [`FrameState`](deopt_ir::FrameState)
//!   of a deoptimization point into a [`DebugInfo`].
//! - **Descriptors** ([`DebugInfo`], [`FrameDescriptor`], [`VirtualObjectDescriptor`],
//!   [`DebugValue`]): the immutable output handed to the metadata encoder.
//! - **Collaborator seams** ([`LocationMap`], [`BackendPolicy`], [`CounterSink`]):
//!   the allocator's operands, storage-kind overrides and counters. Each
//!   is passed in by the driver.
//! - **Shape check** ([`check_virtual_object_shape`]): layout self-check
//!   for filled virtual objects.
//!
//! # Design
//!
//! The builder only *describes* state. Allocation, register assignment and
//! inlining decisions all happen elsewhere.
//! Every inconsistency between the optimizer's claims and what the builder
//! sees is a [`DebugInfoError`]; the driver aborts the compilation.
//!
//! Virtual objects form an index graph: a descriptor refers to another by
//! [`VirtualObjectIndex`], so mutually referencing objects need no special
//! handling.

mod builder;
mod config;
mod counters;
mod errors;
mod location;
mod output;
mod policy;
mod shape;

#[cfg(test)]
mod test_helpers;

pub use builder::DebugInfoBuilder;
pub use config::{DebugInfoConfig, DEFAULT_MAX_INLINING_DEPTH};
pub use counters::{CounterSink, DebugInfoCounters, NoCounters, StateCounter};
pub use errors::{DebugInfoError, DebugInfoErrorKind, DebugInfoResult, ErrorContext};
pub use location::{Location, LocationMap, RegisterValue, StackSlot, Variable};
pub use output::{
    BlockLabel, DebugInfo, DebugValue, FrameDescriptor, ImplicitDeopt, VirtualObjectDescriptor,
    VirtualObjectIndex,
};
pub use policy::{BackendPolicy, IntrinsicStorage, WordStorage};
pub use shape::check_virtual_object_shape;
