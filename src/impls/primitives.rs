//! Opaque [`Reflect`] implementations for the atomic wire types.

use crate::Reflect;

// -----------------------------------------------------------------------------
// impl_reflect_opaque

/// Implements the full reflection stack ([`TypePath`], [`Typed`],
/// [`Reflect`], [`GetTypeMeta`]) for an opaque type with `PartialEq`,
/// `Debug`, and a default constructor.
///
/// [`TypePath`]: crate::info::TypePath
/// [`Typed`]: crate::info::Typed
/// [`GetTypeMeta`]: crate::registry::GetTypeMeta
macro_rules! impl_reflect_opaque {
    ($ty:ty, path: $path:expr, name: $name:expr) => {
        $crate::impls::impl_reflect_opaque!($ty, path: $path, name: $name, default: <$ty as Default>::default());
    };
    ($ty:ty, path: $path:expr, name: $name:expr, default: $default:expr) => {
        impl $crate::info::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }

        impl $crate::info::Typed for $ty {
            fn type_info() -> &'static $crate::info::TypeInfo {
                static CELL: $crate::impls::NonGenericTypeInfoCell =
                    $crate::impls::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    $crate::info::TypeInfo::Opaque($crate::info::OpaqueInfo::new::<$ty>())
                })
            }
        }

        impl $crate::Reflect for $ty {
            $crate::reflection::impl_reflect_cast_fn!(Opaque);

            fn reflect_partial_eq(&self, other: &dyn $crate::Reflect) -> Option<bool> {
                Some(other.downcast_ref::<Self>() == Some(self))
            }

            fn reflect_debug(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Debug::fmt(self, f)
            }
        }

        impl $crate::registry::GetTypeMeta for $ty {
            fn get_type_meta() -> $crate::registry::TypeMeta {
                let mut meta = $crate::registry::TypeMeta::of::<$ty>();
                meta.insert_trait::<$crate::registry::TypeTraitDefault>(
                    $crate::registry::TypeTraitDefault::from_fn(|| {
                        Box::new($default) as Box<dyn $crate::Reflect>
                    }),
                );
                meta
            }
        }
    };
}

pub(crate) use impl_reflect_opaque;

// -----------------------------------------------------------------------------
// Atomic types

impl_reflect_opaque!(bool, path: "bool", name: "bool");
impl_reflect_opaque!(i16, path: "i16", name: "i16");
impl_reflect_opaque!(u16, path: "u16", name: "u16");
impl_reflect_opaque!(i32, path: "i32", name: "i32");
impl_reflect_opaque!(u32, path: "u32", name: "u32");
impl_reflect_opaque!(i64, path: "i64", name: "i64");
impl_reflect_opaque!(u64, path: "u64", name: "u64");
impl_reflect_opaque!(f32, path: "f32", name: "f32");
impl_reflect_opaque!(f64, path: "f64", name: "f64");
impl_reflect_opaque!((), path: "()", name: "()");
impl_reflect_opaque!(String, path: "alloc::string::String", name: "String");

#[cfg(test)]
mod tests {
    use crate::Reflect;
    use crate::ops::ReflectKind;

    #[test]
    fn primitives_are_opaque() {
        assert_eq!(1_i32.reflect_kind(), ReflectKind::Opaque);
        assert_eq!(String::from("x").reflect_kind(), ReflectKind::Opaque);
    }

    #[test]
    fn partial_eq_compares_underlying_values() {
        let a: Box<dyn Reflect> = Box::new(7_i64);
        assert_eq!(a.reflect_partial_eq(&9_i64), Some(false));
        assert_eq!(a.reflect_partial_eq(&7_i64), Some(true));
        assert_eq!(a.reflect_partial_eq(&7_i32), Some(false));
    }
}
