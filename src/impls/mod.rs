//! Reflection implementations for the built-in wire types.
//!
//! Covers the atomic primitives (`bool`, the sized integers, `f32`/`f64`,
//! `String`, `()`), the foreign value types (`DateTime<Utc>`, `Uuid`,
//! `IpAddr`, `SocketAddr`), the standard containers (`Vec<T>`,
//! `HashMap<K, V>`, `Option<T>`), and the static-storage cells and equality
//! helpers the implementations are built from.

mod cell;
mod collections;
mod external;
mod option;
mod primitives;
mod utils;

pub use cell::{GenericTypeCell, GenericTypeInfoCell, GenericTypePathCell, NonGenericTypeInfoCell};
pub use utils::{
    list_debug, list_partial_eq, map_debug, map_partial_eq, option_partial_eq, struct_debug,
    struct_partial_eq,
};

pub(crate) use primitives::impl_reflect_opaque;
