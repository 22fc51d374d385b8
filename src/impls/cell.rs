//! Containers for static storage of type information.
//!
//! Non-generic types store their [`TypeInfo`] in a [`NonGenericTypeInfoCell`]
//! (a plain `OnceLock`). Generic types share one `static CELL` across all of
//! their instantiations, so [`GenericTypeInfoCell`] and
//! [`GenericTypePathCell`] key the stored data by [`TypeId`] and leak each
//! entry to obtain the `'static` lifetime.

use std::any::{Any, TypeId};
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// NonGenericTypeInfoCell

/// Static storage of the [`TypeInfo`] of one non-generic type.
///
/// ```ignore
/// impl Typed for Foo {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::Opaque(OpaqueInfo::new::<Self>()))
///     }
/// }
/// ```
pub struct NonGenericTypeInfoCell(OnceLock<TypeInfo>);

impl NonGenericTypeInfoCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored info, initializing it from `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &TypeInfo
    where
        F: FnOnce() -> TypeInfo,
    {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericTypeCell

/// Static storage of per-instantiation data for a generic type.
///
/// The `static CELL` inside a generic `type_info`/`type_path` function is
/// shared by every instantiation, so entries are keyed by the concrete
/// [`TypeId`].
pub struct GenericTypeCell<T: 'static>(RwLock<Vec<(TypeId, &'static T)>>);

/// Static storage of [`TypeInfo`] for generic types.
///
/// ```ignore
/// impl<T: Typed> Typed for Holder<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
///     }
/// }
/// ```
pub type GenericTypeInfoCell = GenericTypeCell<TypeInfo>;

/// Static storage of type-path strings for generic types.
pub type GenericTypePathCell = GenericTypeCell<String>;

impl<T: 'static> GenericTypeCell<T> {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(Vec::new()))
    }

    /// Returns the entry for `G`, initializing it from `f` on first access.
    pub fn get_or_insert<G: Any>(&self, f: impl FnOnce() -> T) -> &'static T {
        let type_id = TypeId::of::<G>();
        if let Some((_, entry)) = self.0.read().iter().find(|(id, _)| *id == type_id) {
            return entry;
        }
        let mut table = self.0.write();
        if let Some((_, entry)) = table.iter().find(|(id, _)| *id == type_id) {
            return entry;
        }
        // Leaked once per generic instantiation, alive for the process.
        let entry: &'static T = Box::leak(Box::new(f()));
        table.push((type_id, entry));
        entry
    }
}
