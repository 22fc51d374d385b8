//! A serializable handle to a registered type.

use core::any::TypeId;

use crate::impls::impl_reflect_opaque;
use crate::info::TypePath;

/// A value that names a type.
///
/// On the wire a handle travels as the target type's registered path (or
/// short name, per [`Settings::use_type_full_name`](crate::wire::Settings)),
/// so both peers must have the target registered in their
/// [`TypeRegistry`](crate::registry::TypeRegistry). Reading a handle whose
/// name is unknown or ambiguous fails with
/// [`WireError::TypeResolution`](crate::wire::WireError).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle(TypeId);

impl TypeHandle {
    /// Creates a handle to `T`.
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self(TypeId::of::<T>())
    }

    /// Creates a handle from a raw [`TypeId`].
    #[inline]
    pub const fn from_id(id: TypeId) -> Self {
        Self(id)
    }

    /// Returns the target [`TypeId`].
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.0
    }
}

// The unit type is always registered, so a default handle can be resolved on
// any peer.
impl Default for TypeHandle {
    #[inline]
    fn default() -> Self {
        Self(TypeId::of::<()>())
    }
}

impl_reflect_opaque!(TypeHandle, path: "graphwire::TypeHandle", name: "TypeHandle");
