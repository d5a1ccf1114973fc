//! Input model for the deoptimization debug-info builder.
//!
//! This crate holds the slice of the compiler's IR that the builder reads:
//!
//! - **Kinds and constants** ([`ValueKind`], [`Constant`]): slot widths and
//!   folded values.
//! - **Types** ([`TypePool`], [`TypeId`]): declared instance layouts and
//!   array component types of virtual objects.
//! - **Methods** ([`MethodTable`], [`MethodFlags`]): the methods whose
//!   frames appear in a frame-state chain.
//! - **Value graph** ([`Graph`], [`ValueId`]): constants, proxies, virtual
//!   objects and computed values, addressed by dense ids.
//! - **Frame states** ([`FrameState`], [`EscapeObjectState`], [`Bci`]):
//!   interpreter frame snapshots chained innermost to outermost.
//!
//! Everything is index-addressed: no `Rc`, no back pointers. A virtual
//! object's identity is its `ValueId`.

mod frame_state;
mod graph;
mod kind;
mod method;
mod types;

pub use frame_state::{Bci, EscapeObjectState, FrameState, FrameStateId, SlotArea, StateDefect};
pub use graph::{Graph, ValueId, ValueNode, ValueOp, VirtualObjectDef};
pub use kind::{Constant, ObjectHandle, ValueKind};
pub use method::{CodeId, MethodDef, MethodFlags, MethodId, MethodTable};
pub use types::{FieldDef, TypeDef, TypeId, TypePool};
