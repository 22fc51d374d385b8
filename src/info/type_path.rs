// -----------------------------------------------------------------------------
// TypePath

/// A static accessor for a type's stable path and short name.
///
/// The *path* is the fully qualified name used when
/// [`Settings::use_type_full_name`](crate::wire::Settings) is enabled
/// (e.g. `my_crate::telemetry::Sample`); the *name* is the short form
/// (e.g. `Sample`). Both must be stable across runs, which is why they are
/// `&'static str` rather than values derived from [`core::any::type_name`]
/// (whose output is explicitly unspecified).
///
/// This is usually implemented by
/// [`#[derive(Reflect)]`](crate::derive::Reflect).
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type.
    fn type_path() -> &'static str;

    /// Returns the short name of the type.
    fn type_name() -> &'static str;
}

/// Dynamic, object-safe access to [`TypePath`] information.
///
/// Automatically implemented for every `T: TypePath`.
pub trait DynamicTypePath {
    /// See [`TypePath::type_path`].
    fn reflect_type_path(&self) -> &'static str;

    /// See [`TypePath::type_name`].
    fn reflect_type_name(&self) -> &'static str;
}

impl<T: TypePath> DynamicTypePath for T {
    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        T::type_path()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        T::type_name()
    }
}
