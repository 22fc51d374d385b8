//! Reflection support for the standard containers `Vec<T>` and
//! `HashMap<K, V>`.
//!
//! Both record their element types in [`TypeInfo`], so items travel without
//! per-item type tags. The heterogeneous counterparts are
//! [`VarList`](crate::ops::VarList) and [`VarMap`](crate::ops::VarMap).

use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;

use crate::Reflect;
use crate::impls::{GenericTypeInfoCell, GenericTypePathCell};
use crate::info::{ListInfo, MapInfo, TypeInfo, TypePath, Typed};
use crate::reflection::impl_reflect_cast_fn;
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitDefault};

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Reflect + TypePath> TypePath for Vec<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("alloc::vec::Vec<{}>", T::type_path()))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("Vec<{}>", T::type_name()))
    }
}

impl<T: Reflect + Typed> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
    }
}

impl<T: Reflect + Typed> Reflect for Vec<T> {
    impl_reflect_cast_fn!(List);

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::list_partial_eq(self, other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::impls::list_debug(self, f)
    }
}

impl<T: Reflect + Typed> crate::ops::List for Vec<T> {
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|item| item as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|item| item as &mut dyn Reflect)
    }

    fn try_push(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        self.push(value.take::<T>()?);
        Ok(())
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(self.as_slice().iter().map(|item| item as &dyn Reflect))
    }
}

impl<T: Reflect + Typed + GetTypeMeta> GetTypeMeta for Vec<T> {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(TypeTraitDefault::from_fn(|| {
            Box::new(Vec::<T>::new()) as Box<dyn Reflect>
        }));
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// HashMap<K, V>

impl<K, V> TypePath for HashMap<K, V>
where
    K: Reflect + TypePath,
    V: Reflect + TypePath,
{
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            format!(
                "std::collections::HashMap<{}, {}>",
                K::type_path(),
                V::type_path()
            )
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            format!("HashMap<{}, {}>", K::type_name(), V::type_name())
        })
    }
}

impl<K, V> Typed for HashMap<K, V>
where
    K: Reflect + Typed,
    V: Reflect + Typed,
{
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Typed + Eq + Hash,
    V: Reflect + Typed,
{
    impl_reflect_cast_fn!(Map);

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::map_partial_eq(self, other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::impls::map_debug(self, f)
    }
}

impl<K, V> crate::ops::Map for HashMap<K, V>
where
    K: Reflect + Typed + Eq + Hash,
    V: Reflect + Typed,
{
    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        let key = key.downcast_ref::<K>()?;
        HashMap::get(self, key).map(|value| value as &dyn Reflect)
    }

    fn try_insert(
        &mut self,
        key: Box<dyn Reflect>,
        value: Box<dyn Reflect>,
    ) -> Result<(), (Box<dyn Reflect>, Box<dyn Reflect>)> {
        let key = match key.take::<K>() {
            Ok(key) => key,
            Err(key) => return Err((key, value)),
        };
        let value = match value.take::<V>() {
            Ok(value) => value,
            Err(value) => return Err((Box::new(key) as Box<dyn Reflect>, value)),
        };
        self.insert(key, value);
        Ok(())
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            HashMap::iter(self).map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
        )
    }
}

impl<K, V> GetTypeMeta for HashMap<K, V>
where
    K: Reflect + Typed + Eq + Hash + GetTypeMeta,
    V: Reflect + Typed + GetTypeMeta,
{
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(TypeTraitDefault::from_fn(|| {
            Box::new(HashMap::<K, V>::new()) as Box<dyn Reflect>
        }));
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::Reflect;
    use crate::info::Typed;
    use crate::ops::{List, Map};

    #[test]
    fn vec_records_its_item_type() {
        let info = <Vec<i32>>::type_info().as_list().unwrap();
        assert_eq!(info.item().unwrap().name(), "i32");
    }

    #[test]
    fn vec_push_rejects_foreign_items() {
        let mut list: Vec<i32> = vec![1, 2];
        assert!(List::try_push(&mut list, Box::new(3_i32)).is_ok());
        assert!(List::try_push(&mut list, Box::new(String::new())).is_err());
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn map_lookup_goes_through_reflection() {
        let mut map = HashMap::new();
        map.insert(String::from("k"), 9_i64);
        let found = Map::get(&map, String::from("k").as_reflect()).unwrap();
        assert_eq!(found.downcast_ref::<i64>(), Some(&9));
    }
}
