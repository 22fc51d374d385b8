use core::any::Any;

// -----------------------------------------------------------------------------
// TypeTrait

/// A capability supported by a registered type, stored in its
/// [`TypeMeta`](crate::registry::TypeMeta) trait table.
///
/// Automatically implemented for every `Clone + Send + Sync + 'static` type;
/// capability containers like
/// [`TypeTraitDefault`](crate::registry::TypeTraitDefault) are plain structs
/// of type-specific function pointers.
pub trait TypeTrait: Any + Send + Sync {
    /// Clones the capability container behind the trait object.
    fn clone_type_trait(&self) -> Box<dyn TypeTrait>;
}

impl<T: Clone + Send + Sync + 'static> TypeTrait for T {
    fn clone_type_trait(&self) -> Box<dyn TypeTrait> {
        Box::new(self.clone())
    }
}

impl dyn TypeTrait {
    /// Downcasts the capability to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the capability to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }
}
