use core::any::TypeId;

use crate::info::{StructInfo, TypePath};

// -----------------------------------------------------------------------------
// Type

/// The identity of a type: its [`TypeId`] plus its stable path and name.
///
/// `Type` is the unit the wire format deals in wherever a type must be named:
/// member declared types, collection element types, and type tags all carry
/// one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    name: &'static str,
}

impl Type {
    /// Creates the `Type` of `T`.
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: T::type_path(),
            name: T::type_name(),
        }
    }

    /// Returns the [`TypeId`].
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified path.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the short name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

// -----------------------------------------------------------------------------
// Per-kind info

/// Info for a type with no reflectable interior: primitives, extension
/// values, and every type that falls through to the opaque-blob path.
#[derive(Clone, Debug)]
pub struct OpaqueInfo {
    ty: Type,
}

impl OpaqueInfo {
    /// Creates the info for `T`.
    pub fn new<T: TypePath>() -> Self {
        Self { ty: Type::of::<T>() }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }
}

/// Info for an ordered collection.
///
/// `item` is `Some` when the element type is statically known (a single
/// generic parameter, e.g. `Vec<T>`); `None` when every item carries its own
/// type tag on the wire (e.g. [`VarList`](crate::ops::VarList)).
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    item: Option<Type>,
}

impl ListInfo {
    /// Creates the info for a list type with a statically known element type.
    pub fn new<L: TypePath, I: TypePath>() -> Self {
        Self {
            ty: Type::of::<L>(),
            item: Some(Type::of::<I>()),
        }
    }

    /// Creates the info for a list whose items are individually tagged.
    pub fn new_tagged<L: TypePath>() -> Self {
        Self {
            ty: Type::of::<L>(),
            item: None,
        }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the element [`Type`], if statically known.
    #[inline]
    pub const fn item(&self) -> Option<&Type> {
        self.item.as_ref()
    }
}

/// Info for a key-value map.
///
/// Key/value types are `Some` when derivable from exactly two generic
/// parameters (e.g. `HashMap<K, V>`); `None` when each entry carries its own
/// type tags (e.g. [`VarMap`](crate::ops::VarMap)).
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key: Option<Type>,
    value: Option<Type>,
}

impl MapInfo {
    /// Creates the info for a map type with statically known entry types.
    pub fn new<M: TypePath, K: TypePath, V: TypePath>() -> Self {
        Self {
            ty: Type::of::<M>(),
            key: Some(Type::of::<K>()),
            value: Some(Type::of::<V>()),
        }
    }

    /// Creates the info for a map whose entries are individually tagged.
    pub fn new_tagged<M: TypePath>() -> Self {
        Self {
            ty: Type::of::<M>(),
            key: None,
            value: None,
        }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the key [`Type`], if statically known.
    #[inline]
    pub const fn key(&self) -> Option<&Type> {
        self.key.as_ref()
    }

    /// Returns the value [`Type`], if statically known.
    #[inline]
    pub const fn value(&self) -> Option<&Type> {
        self.value.as_ref()
    }
}

/// Info for a nullable value (`Option<T>`).
#[derive(Clone, Debug)]
pub struct OptionInfo {
    ty: Type,
    some: Type,
}

impl OptionInfo {
    /// Creates the info for `Option<T>`.
    pub fn new<O: TypePath, T: TypePath>() -> Self {
        Self {
            ty: Type::of::<O>(),
            some: Type::of::<T>(),
        }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the inner [`Type`].
    #[inline]
    pub const fn some(&self) -> &Type {
        &self.some
    }
}

/// Info for a shared node (`Shared<T>`), the reference-tracked handle type.
#[derive(Clone, Debug)]
pub struct RefInfo {
    ty: Type,
    target: Type,
}

impl RefInfo {
    /// Creates the info for `Shared<T>`.
    pub fn new<S: TypePath, T: TypePath>() -> Self {
        Self {
            ty: Type::of::<S>(),
            target: Type::of::<T>(),
        }
    }

    /// Returns the [`Type`] this info describes.
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`Type`] behind the handle.
    #[inline]
    pub const fn target(&self) -> &Type {
        &self.target
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time derived metadata for a reflected type, one variant per
/// [`ReflectKind`](crate::ops::ReflectKind).
#[derive(Clone, Debug)]
pub enum TypeInfo {
    /// See [`OpaqueInfo`].
    Opaque(OpaqueInfo),
    /// See [`StructInfo`].
    Struct(StructInfo),
    /// See [`ListInfo`].
    List(ListInfo),
    /// See [`MapInfo`].
    Map(MapInfo),
    /// See [`OptionInfo`].
    Option(OptionInfo),
    /// See [`RefInfo`].
    Ref(RefInfo),
}

impl TypeInfo {
    /// Returns the [`Type`] this info describes.
    pub const fn ty(&self) -> &Type {
        match self {
            TypeInfo::Opaque(info) => info.ty(),
            TypeInfo::Struct(info) => info.ty(),
            TypeInfo::List(info) => info.ty(),
            TypeInfo::Map(info) => info.ty(),
            TypeInfo::Option(info) => info.ty(),
            TypeInfo::Ref(info) => info.ty(),
        }
    }

    /// Returns the [`TypeId`] of the described type.
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.ty().id()
    }

    /// Returns the fully qualified path of the described type.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty().path()
    }

    /// Returns the short name of the described type.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.ty().name()
    }

    /// Returns the [`StructInfo`], or `None` for other kinds.
    pub const fn as_struct(&self) -> Option<&StructInfo> {
        match self {
            TypeInfo::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the [`ListInfo`], or `None` for other kinds.
    pub const fn as_list(&self) -> Option<&ListInfo> {
        match self {
            TypeInfo::List(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the [`MapInfo`], or `None` for other kinds.
    pub const fn as_map(&self) -> Option<&MapInfo> {
        match self {
            TypeInfo::Map(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the [`OptionInfo`], or `None` for other kinds.
    pub const fn as_option(&self) -> Option<&OptionInfo> {
        match self {
            TypeInfo::Option(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the [`RefInfo`], or `None` for other kinds.
    pub const fn as_ref_info(&self) -> Option<&RefInfo> {
        match self {
            TypeInfo::Ref(info) => Some(info),
            _ => None,
        }
    }

    /// Whether the described type is `T`.
    #[inline]
    pub fn type_is<T: TypePath>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }
}
