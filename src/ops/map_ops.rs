use core::fmt;

use crate::Reflect;
use crate::impls::NonGenericTypeInfoCell;
use crate::info::{MapInfo, TypeInfo, TypePath, Typed};
use crate::reflection::impl_reflect_cast_fn;
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};

// -----------------------------------------------------------------------------
// Map

/// Access to a key-value map.
///
/// Iteration order is whatever the concrete container yields; the wire
/// format does not promise to preserve it.
pub trait Map: Reflect {
    /// Returns a reference to the value stored under `key`.
    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect>;

    /// Inserts a boxed entry. Returns the pair unchanged if either side is
    /// incompatible with the entry types.
    fn try_insert(
        &mut self,
        key: Box<dyn Reflect>,
        value: Box<dyn Reflect>,
    ) -> Result<(), (Box<dyn Reflect>, Box<dyn Reflect>)>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Whether the map holds no entries.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the entries in container order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;
}

// -----------------------------------------------------------------------------
// VarMap

/// A heterogeneous key-value map.
///
/// Keys and values may be of mixed types; each entry therefore carries its
/// own explicit type tags on the wire (its [`MapInfo`] records no entry
/// types). Lookup compares keys with
/// [`reflect_partial_eq`](Reflect::reflect_partial_eq), so it is linear in
/// the entry count.
#[derive(Default)]
pub struct VarMap {
    entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
}

impl VarMap {
    /// Creates an empty `VarMap`.
    #[inline]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts an entry.
    #[inline]
    pub fn insert<K: Reflect, V: Reflect>(&mut self, key: K, value: V) {
        self.entries.push((Box::new(key), Box::new(value)));
    }
}

impl TypePath for VarMap {
    #[inline]
    fn type_path() -> &'static str {
        "graphwire::ops::VarMap"
    }

    #[inline]
    fn type_name() -> &'static str {
        "VarMap"
    }
}

impl Typed for VarMap {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Map(MapInfo::new_tagged::<Self>()))
    }
}

impl Reflect for VarMap {
    impl_reflect_cast_fn!(Map);

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::map_partial_eq(self, other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::impls::map_debug(self, f)
    }
}

impl Map for VarMap {
    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        self.entries
            .iter()
            .find(|(k, _)| k.reflect_partial_eq(key) == Some(true))
            .map(|(_, v)| &**v)
    }

    fn try_insert(
        &mut self,
        key: Box<dyn Reflect>,
        value: Box<dyn Reflect>,
    ) -> Result<(), (Box<dyn Reflect>, Box<dyn Reflect>)> {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(k, _)| k.reflect_partial_eq(&*key) == Some(true))
        {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(self.entries.iter().map(|(k, v)| (&**k, &**v)))
    }
}

impl GetTypeMeta for VarMap {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(FromType::<Self>::from_type());
        meta
    }
}
