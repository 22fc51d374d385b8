use core::fmt;

use crate::Reflect;
use crate::impls::NonGenericTypeInfoCell;
use crate::info::{ListInfo, TypeInfo, TypePath, Typed};
use crate::reflection::impl_reflect_cast_fn;
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};

// -----------------------------------------------------------------------------
// List

/// Access to an ordered collection.
///
/// Whether the element type is statically known is recorded in the type's
/// [`ListInfo`]; when it is not, every item carries its own type tag on the
/// wire.
pub trait List: Reflect {
    /// Returns a reference to the item at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the item at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Appends a boxed item. Returns the input unchanged if its type is
    /// incompatible with the element type.
    fn try_push(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Removes every item.
    fn clear(&mut self);

    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Whether the collection holds no items.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the items in order.
    fn iter(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_>;
}

// -----------------------------------------------------------------------------
// VarList

/// A heterogeneous ordered collection.
///
/// Unlike `Vec<T>`, items may be of mixed types; each item therefore carries
/// its own explicit type tag on the wire (its [`ListInfo::item`] is `None`).
///
/// # Examples
///
/// ```
/// use graphwire::ops::{List, VarList};
///
/// let mut list = VarList::new();
/// list.push(1_i32);
/// list.push(String::from("two"));
/// assert_eq!(list.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct VarList {
    items: Vec<Box<dyn Reflect>>,
}

impl VarList {
    /// Creates an empty `VarList`.
    #[inline]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item.
    #[inline]
    pub fn push<T: Reflect>(&mut self, value: T) {
        self.items.push(Box::new(value));
    }

    /// Appends a boxed item.
    #[inline]
    pub fn push_boxed(&mut self, value: Box<dyn Reflect>) {
        self.items.push(value);
    }
}

impl TypePath for VarList {
    #[inline]
    fn type_path() -> &'static str {
        "graphwire::ops::VarList"
    }

    #[inline]
    fn type_name() -> &'static str {
        "VarList"
    }
}

impl Typed for VarList {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::List(ListInfo::new_tagged::<Self>()))
    }
}

impl Reflect for VarList {
    impl_reflect_cast_fn!(List);

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::list_partial_eq(self, other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::impls::list_debug(self, f)
    }
}

impl List for VarList {
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.items.get(index).map(|item| &**item)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.items.get_mut(index).map(|item| &mut **item)
    }

    fn try_push(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        self.items.push(value);
        Ok(())
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(self.items.iter().map(|item| &**item))
    }
}

impl GetTypeMeta for VarList {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDefault>(FromType::<Self>::from_type());
        meta
    }
}
