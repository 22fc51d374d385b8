use core::any::{Any, TypeId};
use core::fmt;

use crate::info::{DynamicTypePath, DynamicTyped};
use crate::ops::{ReflectKind, ReflectMut, ReflectRef};

// -----------------------------------------------------------------------------
// Reflect

/// The foundational trait for runtime traversal in [`graphwire`](crate).
///
/// A `Reflect` value can report its [kind](ReflectKind) and expose the
/// matching access trait ([`Struct`], [`List`], [`Map`], [`Optional`],
/// [`SharedNode`]) through [`reflect_ref`]/[`reflect_mut`], which is all the
/// traversal engine needs to classify and walk an arbitrary object graph.
///
/// It's strongly recommended to use
/// [the derive macro](crate::derive::Reflect) rather than implementing this
/// trait by hand; the derive also implements [`Struct`], [`TypePath`],
/// [`Typed`] and [`GetTypeMeta`] as appropriate.
///
/// # Type identification
///
/// Note that [`Any::type_id`] on a `Box<dyn Reflect>` reports the box, not
/// the boxed value. Use [`Reflect::ty_id`] instead:
///
/// ```
/// use graphwire::Reflect;
/// use core::any::TypeId;
///
/// let x: Box<dyn Reflect> = 32_i32.into_boxed_reflect();
/// assert_eq!(x.ty_id(), TypeId::of::<i32>());
/// ```
///
/// [`reflect_ref`]: Reflect::reflect_ref
/// [`reflect_mut`]: Reflect::reflect_mut
/// [`Struct`]: crate::ops::Struct
/// [`List`]: crate::ops::List
/// [`Map`]: crate::ops::Map
/// [`Optional`]: crate::ops::Optional
/// [`SharedNode`]: crate::ops::SharedNode
/// [`TypePath`]: crate::info::TypePath
/// [`Typed`]: crate::info::Typed
/// [`GetTypeMeta`]: crate::registry::GetTypeMeta
pub trait Reflect: DynamicTypePath + DynamicTyped + Send + Sync + Any {
    /// Casts this type to a fully-reflected value.
    #[inline(always)]
    fn as_reflect(&self) -> &dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a mutable, fully-reflected value.
    #[inline(always)]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts a boxed value to a boxed, fully-reflected value.
    #[inline(always)]
    fn into_reflect(self: Box<Self>) -> Box<dyn Reflect>
    where
        Self: Sized,
    {
        self
    }

    /// Boxes this value as a fully-reflected value.
    #[inline(always)]
    fn into_boxed_reflect(self) -> Box<dyn Reflect>
    where
        Self: Sized,
    {
        Box::new(self)
    }

    /// Returns the [`TypeId`] of the underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Performs a type-checked assignment of a reflected value to this value.
    ///
    /// Returns the input unchanged if its underlying type differs from
    /// `Self`.
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Returns the pure enumeration of this value's [kind](ReflectKind).
    fn reflect_kind(&self) -> ReflectKind;

    /// Returns the kind-matched immutable access enumeration.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Returns the kind-matched mutable access enumeration.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Returns a "partial equality" comparison result.
    ///
    /// Returns `None` when the underlying type does not support equality
    /// testing. Composite implementations compare member-by-member; this is
    /// what the default-member filter
    /// ([`is_default_member`](crate::wire::is_default_member)) is built on.
    #[inline]
    fn reflect_partial_eq(&self, _other: &dyn Reflect) -> Option<bool> {
        None
    }

    /// Debug formatter for the value.
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reflect({})", self.reflect_type_path())
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait
    /// object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            match any.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(_) => unreachable!("type was checked above"),
            }
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implements the common cast methods (`set`, `reflect_kind`, `reflect_ref`,
/// `reflect_mut`) for a given kind.
macro_rules! impl_reflect_cast_fn {
    ($kind:ident) => {
        fn set(
            &mut self,
            value: ::std::boxed::Box<dyn $crate::Reflect>,
        ) -> Result<(), ::std::boxed::Box<dyn $crate::Reflect>> {
            *self = value.take::<Self>()?;
            Ok(())
        }

        #[inline]
        fn reflect_kind(&self) -> $crate::ops::ReflectKind {
            $crate::ops::ReflectKind::$kind
        }

        #[inline]
        fn reflect_ref(&self) -> $crate::ops::ReflectRef<'_> {
            $crate::ops::ReflectRef::$kind(self)
        }

        #[inline]
        fn reflect_mut(&mut self) -> $crate::ops::ReflectMut<'_> {
            $crate::ops::ReflectMut::$kind(self)
        }
    };
}

pub(crate) use impl_reflect_cast_fn;
