use std::collections::HashMap;

use crate::info::{Type, TypePath, Typed};

// -----------------------------------------------------------------------------
// FieldInfo

/// The descriptor of one serializable member of a composite type.
///
/// Descriptors are produced once per type, in declaration order, and cached
/// for the process lifetime inside the owning [`StructInfo`]. `index` is the
/// declaration position and doubles as the positional slot on the wire.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    name: &'static str,
    ty: Type,
    index: u32,
}

impl FieldInfo {
    /// Creates the descriptor of a member with declared type `T`.
    pub fn new<T: Typed>(name: &'static str, index: u32) -> Self {
        Self {
            name,
            ty: Type::of::<T>(),
            index,
        }
    }

    /// Returns the member name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared [`Type`] of the member.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the declaration index of the member.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

// -----------------------------------------------------------------------------
// StructInfo

/// The member table of a composite type: an ordered, immutable list of
/// [`FieldInfo`] plus a name index.
#[derive(Clone, Debug)]
pub struct StructInfo {
    ty: Type,
    fields: Box<[FieldInfo]>,
    field_indices: HashMap<&'static str, usize>,
}

impl StructInfo {
    /// Creates the member table for `T` from its fields in declaration order.
    pub fn new<T: TypePath>(fields: Vec<FieldInfo>) -> Self {
        let field_indices = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name(), index))
            .collect();
        Self {
            ty: Type::of::<T>(),
            fields: fields.into_boxed_slice(),
            field_indices,
        }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the descriptor of the member at `index`.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&FieldInfo> {
        self.fields.get(index)
    }

    /// Returns the descriptor of the member named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.field_indices
            .get(name)
            .map(|index| &self.fields[*index])
    }

    /// Returns the declaration index of the member named `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// Returns the number of members.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates the member descriptors in declaration order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FieldInfo> {
        self.fields.iter()
    }
}
