use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Reflect;
use crate::info::{TypePath, Typed};
use crate::registry::FromType;

// -----------------------------------------------------------------------------
// TypeTraitDefault

/// A container providing [`Default`] support for registered types.
///
/// This is how the read side activates fresh instances for list items, map
/// entries, and option inners before filling them in place.
///
/// # Examples
///
/// ```
/// use graphwire::{Reflect, registry::{TypeRegistry, TypeTraitDefault}};
///
/// let registry = TypeRegistry::new();
///
/// let generator = registry
///     .get_with_type_name("String").unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// let s: Box<dyn Reflect> = generator.default();
/// assert_eq!(s.take::<String>().unwrap(), "");
/// ```
#[derive(Clone)]
pub struct TypeTraitDefault {
    func: fn() -> Box<dyn Reflect>,
}

impl TypeTraitDefault {
    /// Builds the capability from an explicit constructor, for types whose
    /// default instance is not `Default::default()`.
    #[inline]
    pub const fn from_fn(func: fn() -> Box<dyn Reflect>) -> Self {
        Self { func }
    }

    /// Builds a boxed default instance.
    ///
    /// [`TypeTraitDefault`] does not have a type flag,
    /// but the function used internally is type specific.
    #[inline(always)]
    pub fn default(&self) -> Box<dyn Reflect> {
        (self.func)()
    }
}

impl<T: Default + Typed + Reflect> FromType<T> for TypeTraitDefault {
    fn from_type() -> Self {
        Self {
            func: || Box::<T>::default(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeTraitSerialize

/// A container providing `serde` serialization support for registered types.
///
/// Internally stores a function pointer for one concrete type; it downcasts
/// the reflected value and hands it to `serde` type-erased. The
/// [`SerdeFallback`](crate::wire::SerdeFallback) codec drives this for every
/// type the traversal engine cannot classify.
///
/// # Safety
///
/// Passing an incorrectly typed `&dyn Reflect` value will cause a panic.
#[derive(Clone)]
pub struct TypeTraitSerialize {
    func: fn(value: &dyn Reflect) -> &dyn erased_serde::Serialize,
}

impl TypeTraitSerialize {
    /// Serializes a reflected value of the captured type.
    ///
    /// # Panics
    ///
    /// Panics on a mismatched value type.
    #[inline(always)]
    pub fn serialize<S: Serializer>(
        &self,
        value: &dyn Reflect,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        (self.func)(value).serialize(serializer)
    }
}

impl<T: erased_serde::Serialize + Typed + Reflect> FromType<T> for TypeTraitSerialize {
    fn from_type() -> Self {
        Self {
            func: |value| match value.downcast_ref::<T>() {
                Some(value) => value as &dyn erased_serde::Serialize,
                None => {
                    panic!(
                        "serialize type mismatched, capability of `{}` fed a `{}`",
                        T::type_path(),
                        value.reflect_type_path(),
                    );
                }
            },
        }
    }
}

// -----------------------------------------------------------------------------
// TypeTraitDeserialize

/// A container providing `serde` deserialization support for registered
/// types.
///
/// The counterpart of [`TypeTraitSerialize`]: builds a boxed value of the
/// captured type from any `serde` deserializer.
#[derive(Clone)]
pub struct TypeTraitDeserialize {
    func: fn(
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn Reflect>, erased_serde::Error>,
}

impl TypeTraitDeserialize {
    /// Deserializes a boxed value of the captured type.
    #[inline(always)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Box<dyn Reflect>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func)(&mut erased).map_err(<D::Error as serde::de::Error>::custom)
    }
}

impl<T: for<'a> Deserialize<'a> + Typed + Reflect> FromType<T> for TypeTraitDeserialize {
    fn from_type() -> Self {
        Self {
            func: |deserializer| Ok(Box::new(T::deserialize(deserializer)?)),
        }
    }
}
