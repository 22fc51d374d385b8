#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

// Usually, we need to use `crate` in the crate itself and use `graphwire` in
// doc testing. The derive macro emits `::graphwire::` paths, so an
// `extern self` ensures `graphwire` can be used as an alias for `crate`.
extern crate self as graphwire;

// -----------------------------------------------------------------------------
// Modules

mod bytes;
mod decimal;
mod handle;
mod reflection;
mod shared;

pub mod impls;
pub mod info;
pub mod ops;
pub mod registry;
pub mod wire;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use bytes::Bytes;
pub use decimal::{Decimal, ParseDecimalError};
pub use handle::TypeHandle;
pub use reflection::Reflect;
pub use shared::Shared;

/// Re-exports the [`Reflect`](derive::Reflect) derive macro.
pub mod derive {
    pub use graphwire_derive::Reflect;
}
