//! Static type metadata: paths, member tables, and per-kind type info.
//!
//! ## Menu
//!
//! - [`TypePath`] / [`DynamicTypePath`]: stable full path and short name.
//! - [`Typed`] / [`DynamicTyped`]: access to the cached [`TypeInfo`].
//! - [`TypeInfo`]: per-kind metadata ([`OpaqueInfo`], [`StructInfo`],
//!   [`ListInfo`], [`MapInfo`], [`OptionInfo`], [`RefInfo`]).
//! - [`FieldInfo`]: the descriptor of one serializable member.

mod struct_info;
mod type_info;
mod type_path;
mod typed;

pub use struct_info::{FieldInfo, StructInfo};
pub use type_info::{ListInfo, MapInfo, OpaqueInfo, OptionInfo, RefInfo, Type, TypeInfo};
pub use type_path::{DynamicTypePath, TypePath};
pub use typed::{DynamicTyped, Typed};
