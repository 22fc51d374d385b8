//! Per-kind access traits and the kind-dispatch enumerations.
//!
//! ## Menu
//!
//! - [`ReflectKind`] / [`ReflectRef`] / [`ReflectMut`]: the classification
//!   the traversal engine dispatches on.
//! - [`Struct`]: member access for composite objects.
//! - [`List`] / [`VarList`]: ordered collections (typed / per-item tagged).
//! - [`Map`] / [`VarMap`]: key-value maps (typed / per-entry tagged).
//! - [`Optional`]: nullable values.
//! - [`SharedNode`]: reference-tracked shared handles.

mod list_ops;
mod map_ops;
mod option_ops;
mod ref_ops;
mod struct_ops;

pub use list_ops::{List, VarList};
pub use map_ops::{Map, VarMap};
pub use option_ops::Optional;
pub use ref_ops::SharedNode;
pub use struct_ops::Struct;

use crate::Reflect;

// -----------------------------------------------------------------------------
// Kind dispatch

/// A pure enumeration of value kinds, mirroring [`ReflectRef`] without
/// borrowing the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReflectKind {
    /// A primitive, extension, or otherwise interior-free value.
    Opaque,
    /// A composite object with a member table.
    Struct,
    /// An ordered collection.
    List,
    /// A key-value map.
    Map,
    /// A nullable value.
    Option,
    /// A reference-tracked shared handle.
    Ref,
}

impl core::fmt::Display for ReflectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ReflectKind::Opaque => "opaque",
            ReflectKind::Struct => "struct",
            ReflectKind::List => "list",
            ReflectKind::Map => "map",
            ReflectKind::Option => "option",
            ReflectKind::Ref => "ref",
        };
        f.write_str(name)
    }
}

/// An immutable, kind-matched view of a reflected value.
pub enum ReflectRef<'a> {
    /// See [`ReflectKind::Opaque`].
    Opaque(&'a dyn Reflect),
    /// See [`ReflectKind::Struct`].
    Struct(&'a dyn Struct),
    /// See [`ReflectKind::List`].
    List(&'a dyn List),
    /// See [`ReflectKind::Map`].
    Map(&'a dyn Map),
    /// See [`ReflectKind::Option`].
    Option(&'a dyn Optional),
    /// See [`ReflectKind::Ref`].
    Ref(&'a dyn SharedNode),
}

/// A mutable, kind-matched view of a reflected value.
pub enum ReflectMut<'a> {
    /// See [`ReflectKind::Opaque`].
    Opaque(&'a mut dyn Reflect),
    /// See [`ReflectKind::Struct`].
    Struct(&'a mut dyn Struct),
    /// See [`ReflectKind::List`].
    List(&'a mut dyn List),
    /// See [`ReflectKind::Map`].
    Map(&'a mut dyn Map),
    /// See [`ReflectKind::Option`].
    Option(&'a mut dyn Optional),
    /// See [`ReflectKind::Ref`].
    Ref(&'a mut dyn SharedNode),
}

impl<'a> ReflectRef<'a> {
    /// Returns the matching pure [`ReflectKind`].
    pub fn kind(&self) -> ReflectKind {
        match self {
            ReflectRef::Opaque(_) => ReflectKind::Opaque,
            ReflectRef::Struct(_) => ReflectKind::Struct,
            ReflectRef::List(_) => ReflectKind::List,
            ReflectRef::Map(_) => ReflectKind::Map,
            ReflectRef::Option(_) => ReflectKind::Option,
            ReflectRef::Ref(_) => ReflectKind::Ref,
        }
    }
}
