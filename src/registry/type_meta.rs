use core::any::TypeId;
use core::ops::{Deref, DerefMut};
use std::collections::HashMap;

use crate::info::{Type, TypeInfo, Typed};
use crate::registry::{TypeRegistry, TypeTrait};

// -----------------------------------------------------------------------------
// TypeMeta

/// The registration record of one type: its [`TypeInfo`] plus a
/// [`TypeTrait`] capability table.
///
/// Usually generated by [`#[derive(Reflect)]`](crate::derive::Reflect)
/// through [`GetTypeMeta`], but can be assembled by hand:
///
/// ```
/// use graphwire::registry::{FromType, TypeMeta, TypeTraitDefault};
///
/// let mut meta = TypeMeta::of::<String>();
/// meta.insert_trait::<TypeTraitDefault>(FromType::<String>::from_type());
///
/// let f = meta.get_trait::<TypeTraitDefault>().unwrap();
/// let s = f.default().take::<String>().unwrap();
/// assert_eq!(s, "");
/// ```
pub struct TypeMeta {
    // Cached out of `type_info` so lookups skip the kind dispatch.
    ty: &'static Type,
    type_info: &'static TypeInfo,
    trait_table: HashMap<TypeId, Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Creates an empty record for `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        let type_info = T::type_info();
        Self {
            ty: type_info.ty(),
            type_info,
            trait_table: HashMap::new(),
        }
    }

    /// Returns the [`TypeInfo`].
    #[inline(always)]
    pub const fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    /// Returns the [`Type`].
    #[inline(always)]
    pub const fn ty(&self) -> &'static Type {
        self.ty
    }

    /// Returns the [`TypeId`] of the registered type.
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    /// Returns the fully qualified path of the registered type.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    /// Returns the short name of the registered type.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    /// Inserts a capability, replacing any previous one of the same type.
    #[inline]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.trait_table.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Returns the capability of type `T`, if present.
    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.get_trait_by_id(TypeId::of::<T>())
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    /// Returns the capability with the given [`TypeId`], if present.
    pub fn get_trait_by_id(&self, type_id: TypeId) -> Option<&dyn TypeTrait> {
        self.trait_table.get(&type_id).map(Deref::deref)
    }

    /// Returns the capability of type `T` mutably, if present.
    #[inline]
    pub fn get_trait_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        self.trait_table
            .get_mut(&TypeId::of::<T>())
            .map(DerefMut::deref_mut)
            .and_then(<dyn TypeTrait>::downcast_mut)
    }

    /// Whether the capability of type `T` is present.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of capabilities.
    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl Clone for TypeMeta {
    fn clone(&self) -> Self {
        let trait_table = self
            .trait_table
            .iter()
            .map(|(id, type_trait)| (*id, (**type_trait).clone_type_trait()))
            .collect();
        Self {
            ty: self.ty,
            type_info: self.type_info,
            trait_table,
        }
    }
}

impl core::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("ty", &self.ty)
            .field("trait_len", &self.trait_table.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// A trait which allows a type to generate its [`TypeMeta`] for registration
/// into the [`TypeRegistry`].
///
/// Automatically implemented by
/// [`#[derive(Reflect)]`](crate::derive::Reflect); the derive also inserts
/// the capabilities requested in its `#[reflect(...)]` attribute.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `GetTypeMeta` so cannot provide type registration information",
    note = "consider annotating `{Self}` with `#[derive(Reflect)]`"
)]
pub trait GetTypeMeta: Typed {
    /// Returns the default [`TypeMeta`] for this type.
    fn get_type_meta() -> TypeMeta;

    /// Registers other types needed by this type.
    /// **Allow** not to register oneself.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
