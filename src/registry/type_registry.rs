use core::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::info::{TypeInfo, Typed};
use crate::ops::{VarList, VarMap};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait};
use crate::{Bytes, Decimal, TypeHandle};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of reflected types.
///
/// The central store of type information: [registering] a type generates a
/// [`TypeMeta`] entry from its [`GetTypeMeta`] implementation (automatically
/// derived by [`#[derive(Reflect)]`](crate::derive::Reflect)) and indexes it
/// by [`TypeId`], full path, and short name. The traversal engine resolves
/// wire type tags against these indices and activates default instances
/// through the stored capabilities.
///
/// # Example
///
/// ```
/// use graphwire::registry::{TypeRegistry, TypeTraitDefault};
/// use graphwire::info::DynamicTypePath;
///
/// let registry = TypeRegistry::new();
///
/// let generator = registry
///     .get_with_type_name("String").unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// let s = generator.default();
/// assert_eq!(s.reflect_type_path(), "alloc::string::String");
/// ```
///
/// [registering]: TypeRegistry::register
pub struct TypeRegistry {
    type_meta_table: HashMap<TypeId, TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty `TypeRegistry`.
    #[inline]
    pub fn empty() -> Self {
        Self {
            type_meta_table: HashMap::new(),
            type_path_to_id: HashMap::new(),
            type_name_to_id: HashMap::new(),
            ambiguous_names: HashSet::new(),
        }
    }

    /// Creates a registry with the built-in wire types registered.
    ///
    /// - `()` `bool`
    /// - `i16` `i32` `i64` `u16` `u32` `u64`
    /// - `f32` `f64`
    /// - `String` [`Bytes`] [`Decimal`] `DateTime<Utc>`
    /// - [`Uuid`] `IpAddr` `SocketAddr` [`TypeHandle`]
    /// - [`VarList`] [`VarMap`]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>();
        registry.register::<bool>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<Bytes>();
        registry.register::<Decimal>();
        registry.register::<DateTime<Utc>>();
        registry.register::<Uuid>();
        registry.register::<std::net::IpAddr>();
        registry.register::<std::net::SocketAddr>();
        registry.register::<TypeHandle>();
        registry.register::<VarList>();
        registry.register::<VarMap>();
        registry
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(
        type_meta: &TypeMeta,
        type_path_to_id: &mut HashMap<&'static str, TypeId>,
        type_name_to_id: &mut HashMap<&'static str, TypeId>,
        ambiguous_names: &mut HashSet<&'static str>,
    ) {
        let ty = type_meta.ty();
        let type_name = ty.name();

        // A short name seen under two paths becomes unresolvable by name.
        if !ambiguous_names.contains(type_name) {
            if type_name_to_id.contains_key(type_name) {
                type_name_to_id.remove(type_name);
                ambiguous_names.insert(type_name);
            } else {
                type_name_to_id.insert(type_name, ty.id());
            }
        }

        // For new types, assuming that the full path cannot be duplicated.
        type_path_to_id.insert(ty.path(), ty.id());
    }

    /// Registers `T` if it has not been registered yet, then recursively
    /// registers its type dependencies per
    /// [`GetTypeMeta::register_dependencies`].
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.try_insert_type_meta(T::get_type_meta()) {
            T::register_dependencies(self);
        }
    }

    /// Registers the referenced type `T` if it has not been registered yet.
    ///
    /// See [`register`](TypeRegistry::register) for details.
    #[inline]
    pub fn register_by_val<T: GetTypeMeta>(&mut self, _: &T) {
        self.register::<T>();
    }

    /// Inserts a [`TypeMeta`] if its type is not registered yet.
    ///
    /// Returns `false` (and keeps the existing entry) when it is. This does
    /// _not_ register type dependencies; use [`register`](Self::register)
    /// for that.
    pub fn try_insert_type_meta(&mut self, type_meta: TypeMeta) -> bool {
        if self.type_meta_table.contains_key(&type_meta.type_id()) {
            return false;
        }
        Self::add_new_type_indices(
            &type_meta,
            &mut self.type_path_to_id,
            &mut self.type_name_to_id,
            &mut self.ambiguous_names,
        );
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
        true
    }

    /// Registers the capability `D` for the already-registered type `T`.
    ///
    /// Covers capabilities the derive could not insert unconditionally, such
    /// as `serde` support for generic containers.
    ///
    /// # Panics
    ///
    /// Panics when `T` is not registered.
    pub fn register_type_trait<T: Typed, D: TypeTrait + FromType<T>>(&mut self) {
        match self.type_meta_table.get_mut(&TypeId::of::<T>()) {
            Some(type_meta) => type_meta.insert_trait(D::from_type()),
            None => panic!(
                "called `TypeRegistry::register_type_trait` for capability `{}` of unregistered type `{}`",
                core::any::type_name::<D>(),
                T::type_path(),
            ),
        }
    }

    /// Whether the type with the given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains_key(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given [`TypeId`]
    /// mutably.
    #[inline]
    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut TypeMeta> {
        self.type_meta_table.get_mut(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given
    /// [type path](crate::info::TypePath::type_path).
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeMeta`] of the type with the given
    /// [type name](crate::info::TypePath::type_name).
    ///
    /// Returns `None` when the name is ambiguous or unregistered.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Whether the given short name matches more than one registered type.
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    /// Returns the capability of type `T` associated with the given
    /// [`TypeId`].
    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        match self.get(type_id) {
            Some(type_meta) => type_meta.get_trait::<T>(),
            None => None,
        }
    }

    /// Returns the [`TypeInfo`] associated with the given [`TypeId`].
    pub fn get_type_info(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.get(type_id).map(TypeMeta::type_info)
    }

    /// Returns an iterator over the registered [`TypeMeta`]s.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A cloneable, lock-guarded handle to a shared [`TypeRegistry`].
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    /// Wraps a registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read()
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal.write()
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.internal.read().type_path_to_id.keys().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_by_path_and_name() {
        let registry = TypeRegistry::new();
        assert!(registry.contains(TypeId::of::<Decimal>()));
        let by_path = registry.get_with_type_path("alloc::string::String").unwrap();
        let by_name = registry.get_with_type_name("String").unwrap();
        assert_eq!(by_path.type_id(), by_name.type_id());
    }

    #[test]
    fn duplicate_short_names_become_ambiguous() {
        mod foo {
            use crate::impls::impl_reflect_opaque;
            #[derive(Debug, Default, PartialEq)]
            pub struct Same;
            impl_reflect_opaque!(Same, path: "foo::Same", name: "Same");
        }
        mod bar {
            use crate::impls::impl_reflect_opaque;
            #[derive(Debug, Default, PartialEq)]
            pub struct Same;
            impl_reflect_opaque!(Same, path: "bar::Same", name: "Same");
        }

        let mut registry = TypeRegistry::empty();
        registry.register::<foo::Same>();
        registry.register::<bar::Same>();
        assert!(registry.is_ambiguous("Same"));
        assert!(registry.get_with_type_name("Same").is_none());
        assert!(registry.get_with_type_path("foo::Same").is_some());
        assert!(registry.get_with_type_path("bar::Same").is_some());
    }

    #[test]
    fn registering_a_container_pulls_in_its_dependencies() {
        let mut registry = TypeRegistry::empty();
        registry.register::<Vec<Option<i32>>>();
        assert!(registry.contains(TypeId::of::<Option<i32>>()));
        assert!(registry.contains(TypeId::of::<i32>()));
    }
}
