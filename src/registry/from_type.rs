use crate::info::Typed;

/// Builds a [`TypeTrait`] capability container from a concrete type.
///
/// Used by [`#[derive(Reflect)]`](crate::derive::Reflect) to populate the
/// [`TypeMeta`] trait table.
///
/// # Example
///
/// ```
/// use graphwire::registry::{FromType, TypeMeta, TypeTraitDefault};
///
/// let mut meta = TypeMeta::of::<String>();
/// meta.insert_trait::<TypeTraitDefault>(FromType::<String>::from_type());
/// ```
///
/// [`TypeTrait`]: crate::registry::TypeTrait
/// [`TypeMeta`]: crate::registry::TypeMeta
pub trait FromType<T: Typed> {
    fn from_type() -> Self;
}
