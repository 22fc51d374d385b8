//! The central store of registered types.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: a capability supported by a registered type.
//! - [`FromType`]: builds a `TypeTrait` from a concrete type.
//! - [`TypeMeta`] / [`GetTypeMeta`]: the per-type registration record and
//!   the trait producing it.
//! - [`TypeRegistry`] / [`TypeRegistryArc`]: the store itself, plain and
//!   shared.
//! - Built-in capabilities: [`TypeTraitDefault`], [`TypeTraitSerialize`],
//!   [`TypeTraitDeserialize`].

mod from_type;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;

pub use from_type::FromType;
pub use traits::{TypeTraitDefault, TypeTraitDeserialize, TypeTraitSerialize};
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
pub use type_trait::TypeTrait;
