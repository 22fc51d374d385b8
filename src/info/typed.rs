use crate::info::{TypeInfo, TypePath};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor for a type's [`TypeInfo`].
///
/// The returned reference is `'static`: the info is built once per type and
/// cached process-wide in a [`NonGenericTypeInfoCell`] or
/// [`GenericTypeInfoCell`].
///
/// This is usually implemented by
/// [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// [`NonGenericTypeInfoCell`]: crate::impls::NonGenericTypeInfoCell
/// [`GenericTypeInfoCell`]: crate::impls::GenericTypeInfoCell
pub trait Typed: TypePath {
    /// Returns the cached [`TypeInfo`] of this type.
    fn type_info() -> &'static TypeInfo;
}

/// Dynamic, object-safe access to [`Typed`] information.
///
/// Automatically implemented for every `T: Typed`.
pub trait DynamicTyped {
    /// See [`Typed::type_info`].
    fn reflect_type_info(&self) -> &'static TypeInfo;
}

impl<T: Typed> DynamicTyped for T {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        T::type_info()
    }
}
