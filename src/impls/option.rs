//! Reflection support for `Option<T>`.

use core::fmt;

use crate::Reflect;
use crate::impls::{GenericTypeInfoCell, GenericTypePathCell};
use crate::info::{OptionInfo, TypeInfo, TypePath, Typed};
use crate::ops::Optional;
use crate::reflection::impl_reflect_cast_fn;
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitDefault};

impl<T: Reflect + TypePath> TypePath for Option<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("core::option::Option<{}>", T::type_path()))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("Option<{}>", T::type_name()))
    }
}

impl<T: Reflect + Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Option(OptionInfo::new::<Self, T>()))
    }
}

impl<T: Reflect + Typed> Reflect for Option<T> {
    impl_reflect_cast_fn!(Option);

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::option_partial_eq(self, other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(value) => write!(f, "Some({:?})", value as &dyn Reflect),
            None => f.write_str("None"),
        }
    }
}

impl<T: Reflect + Typed> Optional for Option<T> {
    fn value(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|value| value as &dyn Reflect)
    }

    fn value_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|value| value as &mut dyn Reflect)
    }

    fn set_value(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        *self = Some(value.take::<T>()?);
        Ok(())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<T: Reflect + Typed + GetTypeMeta> GetTypeMeta for Option<T> {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(TypeTraitDefault::from_fn(|| {
            Box::new(Option::<T>::None) as Box<dyn Reflect>
        }));
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

#[cfg(test)]
mod tests {
    use crate::Reflect;
    use crate::ops::Optional;

    #[test]
    fn set_value_swaps_presence() {
        let mut value: Option<i32> = None;
        assert!(!value.is_some());
        Optional::set_value(&mut value, Box::new(5_i32)).unwrap();
        assert_eq!(value, Some(5));
        Optional::clear(&mut value);
        assert_eq!(value, None);
    }

    #[test]
    fn partial_eq_checks_presence_then_inner() {
        let a: Option<i32> = Some(3);
        assert_eq!(a.as_reflect().reflect_partial_eq(&Some(3_i32)), Some(true));
        assert_eq!(a.as_reflect().reflect_partial_eq(&Option::<i32>::None), Some(false));
    }
}
