//! The reference-tracked shared handle type.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Reflect;
use crate::impls::{GenericTypeInfoCell, GenericTypePathCell};
use crate::info::{RefInfo, TypeInfo, TypePath, Typed};
use crate::ops::SharedNode;
use crate::reflection::impl_reflect_cast_fn;
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitDefault};
use crate::wire::WireError;

/// A shared, mutable handle to a value, tracked by identity on the wire.
///
/// Clones of a `Shared<T>` point at the same allocation, and the traversal
/// engine collapses repeated encounters of one allocation into
/// back-references when
/// [`Settings::use_object_reference`](crate::wire::Settings) is enabled.
/// Cyclic graphs are expressed through `Shared` handles (with an
/// `Option<Shared<T>>` breaking the type recursion) and require reference
/// tracking; without it a cycle never terminates.
///
/// # Examples
///
/// ```
/// use graphwire::Shared;
///
/// let a = Shared::new(1_i32);
/// let b = a.clone();
/// *b.write() = 2;
/// assert_eq!(*a.read(), 2);
/// ```
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wraps a value in a new shared allocation.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Locks the target for reading.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Locks the target for writing.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Whether two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Reflect + TypePath> TypePath for Shared<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("graphwire::Shared<{}>", T::type_path()))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("Shared<{}>", T::type_name()))
    }
}

impl<T: Reflect + Typed> Typed for Shared<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Ref(RefInfo::new::<Self, T>()))
    }
}

impl<T: Reflect + Typed> Reflect for Shared<T> {
    impl_reflect_cast_fn!(Ref);

    // Identity equality. Comparing targets would never terminate on cyclic
    // graphs.
    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        Some(
            other
                .downcast_ref::<Self>()
                .is_some_and(|other| self.ptr_eq(other)),
        )
    }

    fn reflect_debug(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Shared<{}>(#{:x})", T::type_name(), self.identity())
    }
}

impl<T: Reflect + Typed> SharedNode for Shared<T> {
    fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    fn clone_handle(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn adopt(&mut self, other: &dyn Reflect) -> bool {
        match other.downcast_ref::<Self>() {
            Some(other) => {
                self.0 = Arc::clone(&other.0);
                true
            }
            None => false,
        }
    }

    fn with_target(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), WireError>,
    ) -> Result<(), WireError> {
        let guard = self.0.read();
        f(&*guard)
    }

    fn with_target_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), WireError>,
    ) -> Result<(), WireError> {
        let mut guard = self.0.write();
        f(&mut *guard)
    }
}

impl<T: Reflect + Typed + Default + GetTypeMeta> GetTypeMeta for Shared<T> {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(TypeTraitDefault::from_fn(|| {
            Box::new(Shared::new(T::default())) as Box<dyn Reflect>
        }));
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a = Shared::new(String::from("x"));
        let b = a.clone();
        let c = Shared::new(String::from("x"));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_eq!(a.as_reflect().reflect_partial_eq(b.as_reflect()), Some(true));
        assert_eq!(a.as_reflect().reflect_partial_eq(c.as_reflect()), Some(false));
    }

    #[test]
    fn adopt_redirects_the_handle() {
        let mut a = Shared::new(1_i32);
        let b = Shared::new(2_i32);
        assert!(a.adopt(b.as_reflect()));
        assert!(a.ptr_eq(&b));
        assert!(!a.adopt(Shared::new(String::new()).as_reflect()));
    }
}
