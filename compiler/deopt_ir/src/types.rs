//! Declared type metadata.
//!
//! The [`TypePool`] owns every type referenced by virtual objects and
//! fields. Types are addressed by a dense [`TypeId`]. Instance types carry
//! their complete field layout, inherited fields first, so a virtual
//! object's entries line up with `fields()` one to one.

use std::fmt;

use crate::ValueKind;

/// Index of a type in a [`TypePool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
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

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// One instance field in layout order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeId,
}

/// A declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDef {
    /// A primitive type such as `int` or `double`.
    Primitive(ValueKind),
    /// An ordinary object type with a fixed field list.
    Instance { name: String, fields: Vec<FieldDef> },
    /// An array type.
    Array { component: TypeId },
}

/// Arena of declared types.
///
/// Primitive types are pre-registered at fixed indices so callers can use
/// the `TypeId` constants without a lookup.
#[derive(Clone, Debug)]
pub struct TypePool {
    types: Vec<TypeDef>,
}

impl TypeId {
    pub const BOOLEAN: TypeId = TypeId(0);
    pub const BYTE: TypeId = TypeId(1);
    pub const SHORT: TypeId = TypeId(2);
    pub const CHAR: TypeId = TypeId(3);
    pub const INT: TypeId = TypeId(4);
    pub const FLOAT: TypeId = TypeId(5);
    pub const LONG: TypeId = TypeId(6);
    pub const DOUBLE: TypeId = TypeId(7);
    /// The root object type (no fields).
    pub const OBJECT: TypeId = TypeId(8);
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with the primitive types and the root object type.
    pub fn new() -> Self {
        let types = vec![
            TypeDef::Primitive(ValueKind::Boolean),
            TypeDef::Primitive(ValueKind::Byte),
            TypeDef::Primitive(ValueKind::Short),
            TypeDef::Primitive(ValueKind::Char),
            TypeDef::Primitive(ValueKind::Int),
            TypeDef::Primitive(ValueKind::Float),
            TypeDef::Primitive(ValueKind::Long),
            TypeDef::Primitive(ValueKind::Double),
            TypeDef::Instance {
                name: "Object".to_owned(),
                fields: Vec::new(),
            },
        ];
        Self { types }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "type indices never exceed u32"
    )]
    fn push(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(def);
        id
    }

    /// Register an instance type with the given fields, in layout order.
    pub fn add_instance(
        &mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, TypeId)>,
    ) -> TypeId {
        let fields = fields
            .into_iter()
            .map(|(name, ty)| FieldDef {
                name: name.to_owned(),
                ty,
            })
            .collect();
        self.push(TypeDef::Instance {
            name: name.into(),
            fields,
        })
    }

    /// Register (or reuse) the array type with the given component.
    pub fn array_of(&mut self, component: TypeId) -> TypeId {
        let def = TypeDef::Array { component };
        if let Some(existing) = self.lookup(&def) {
            return existing;
        }
        self.push(def)
    }

    /// Find an already registered type with this exact definition.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "type indices never exceed u32"
    )]
    fn lookup(&self, def: &TypeDef) -> Option<TypeId> {
        self.types
            .iter()
            .position(|existing| existing == def)
            .map(|index| TypeId::new(index as u32))
    }

    /// Look up a type definition.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this pool.
    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[id.index()]
    }

    /// Component type of an array type, `None` otherwise.
    pub fn component(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeDef::Array { component } => Some(*component),
            _ => None,
        }
    }

    /// Instance fields of an instance type; empty for primitives and arrays.
    pub fn fields(&self, id: TypeId) -> &[FieldDef] {
        match self.get(id) {
            TypeDef::Instance { fields, .. } => fields,
            _ => &[],
        }
    }

    /// The type's own representation kind: its primitive kind, or `Object`.
    pub fn intrinsic_kind(&self, id: TypeId) -> ValueKind {
        match self.get(id) {
            TypeDef::Primitive(kind) => *kind,
            TypeDef::Instance { .. } | TypeDef::Array { .. } => ValueKind::Object,
        }
    }

    /// Human-readable type name, e.g. `Point` or `byte[]`.
    pub fn name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeDef::Primitive(kind) => kind.to_string(),
            TypeDef::Instance { name, .. } => name.clone(),
            TypeDef::Array { component } => format!("{}[]", self.name(*component)),
        }
    }
}
