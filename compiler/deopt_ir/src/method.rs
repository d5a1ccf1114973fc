//! Method identities.
//!
//! A frame state names the method whose interpreter frame it describes and,
//! separately, the code it was parsed from. The two only differ for states
//! produced from snippets or intrinsics, which cannot be turned into an
//! interpreter frame.

use std::fmt;

use bitflags::bitflags;

/// Index of a method in a [`MethodTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MethodId(u32);

impl MethodId {
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

/// Identity of a bytecode body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CodeId(u32);

impl CodeId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Method modifiers relevant to frame reconstruction.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodFlags: u16 {
        const STATIC = 1 << 0;
        /// The method holds its receiver's (or class's) monitor for its
        /// whole body.
        const SYNCHRONIZED = 1 << 1;
    }
}

/// A method whose frames may appear in a frame-state chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDef {
    pub holder: String,
    pub name: String,
    pub flags: MethodFlags,
    pub code: CodeId,
}

impl MethodDef {
    #[inline]
    pub fn is_synchronized(&self) -> bool {
        self.flags.contains(MethodFlags::SYNCHRONIZED)
    }

    /// `Holder.name(bci)` style location, used in diagnostics.
    pub fn stack_trace_element(&self, bci: impl fmt::Display) -> String {
        format!("{}.{}(bci {bci})", self.holder, self.name)
    }
}

/// Arena of methods.
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    methods: Vec<MethodDef>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method with its own fresh code identity.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "method indices never exceed u32"
    )]
    pub fn add(
        &mut self,
        holder: impl Into<String>,
        name: impl Into<String>,
        flags: MethodFlags,
    ) -> MethodId {
        let id = MethodId::new(self.methods.len() as u32);
        self.methods.push(MethodDef {
            holder: holder.into(),
            name: name.into(),
            flags,
            code: CodeId::new(id.raw()),
        });
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this table.
    #[inline]
    pub fn get(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.index()]
    }

    /// The code identity of `id`'s own bytecode.
    #[inline]
    pub fn code_of(&self, id: MethodId) -> CodeId {
        self.get(id).code
    }

    /// Find the method that owns `code`.
    pub fn method_for_code(&self, code: CodeId) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.code == code)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests;
