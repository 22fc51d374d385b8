use crate::Reflect;
use crate::info::StructInfo;

// -----------------------------------------------------------------------------
// Struct

/// Member access for a composite object.
///
/// The member *table* (names, declared types, ordering) lives in the type's
/// [`StructInfo`]; this trait provides the matching value access. Both are
/// generated by [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// # Examples
///
/// ```
/// use graphwire::{derive::Reflect, ops::Struct};
///
/// #[derive(Reflect, Default)]
/// struct Foo {
///     a: i32,
///     b: bool,
/// }
///
/// let foo = Foo { a: 1, b: true };
/// assert!(foo.field("a").is_some());
/// assert_eq!(foo.field_len(), 2);
/// ```
pub trait Struct: Reflect {
    /// Returns a reference to the value of the member named `name`.
    fn field(&self, name: &str) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the value of the member named `name`.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;

    /// Returns a reference to the value of the member at declaration index
    /// `index`.
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the value of the member at declaration
    /// index `index`.
    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Returns the number of members.
    fn field_len(&self) -> usize;

    /// Returns the member table of this type.
    ///
    /// # Panics
    ///
    /// Panics if the type's [`TypeInfo`](crate::info::TypeInfo) is not
    /// `Struct`, which indicates a broken manual implementation.
    fn struct_info(&self) -> &'static StructInfo {
        self.reflect_type_info()
            .as_struct()
            .unwrap_or_else(|| panic!("`{}` is Struct kind but carries non-struct TypeInfo", self.reflect_type_path()))
    }
}
