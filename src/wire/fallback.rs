//! The escape hatch for values no traversal path can classify.
//!
//! A value of `Opaque` kind that is neither a primitive nor an extension has
//! no structure the engine can walk. With a fallback codec installed, such a
//! value travels as one opaque blob; without one, it fails with
//! [`WireError::UnsupportedValue`](crate::wire::WireError).

use crate::Reflect;
use crate::registry::{TypeRegistry, TypeTraitDeserialize, TypeTraitSerialize};
use crate::wire::{WireError, WireResult};

/// Encodes otherwise-unsupported values to and from opaque byte blobs.
///
/// The blob travels length-prefixed like any byte buffer; its internal
/// format is entirely the codec's business, so both peers must install the
/// same fallback.
pub trait FallbackCodec {
    /// Encodes a value to a blob.
    fn encode(&self, value: &dyn Reflect, registry: &TypeRegistry) -> WireResult<Vec<u8>>;

    /// Decodes a blob into the target in place.
    fn decode(
        &self,
        target: &mut dyn Reflect,
        blob: &[u8],
        registry: &TypeRegistry,
    ) -> WireResult<()>;
}

/// A [`FallbackCodec`] backed by the registry's `serde` capabilities.
///
/// Values travel as JSON; a type opts in by registering
/// [`TypeTraitSerialize`] and [`TypeTraitDeserialize`] (the derive's
/// `#[reflect(serialize, deserialize)]` attribute does both).
#[derive(Default)]
pub struct SerdeFallback;

impl SerdeFallback {
    /// Creates the codec.
    pub fn new() -> Self {
        Self
    }
}

impl FallbackCodec for SerdeFallback {
    fn encode(&self, value: &dyn Reflect, registry: &TypeRegistry) -> WireResult<Vec<u8>> {
        let capability = registry
            .get_type_trait::<TypeTraitSerialize>(value.ty_id())
            .ok_or_else(|| {
                WireError::UnsupportedValue(format!(
                    "type `{}` registers no serialize capability",
                    value.reflect_type_path()
                ))
            })?;
        let mut blob = Vec::new();
        let mut serializer = serde_json::Serializer::new(&mut blob);
        capability
            .serialize(value, &mut serializer)
            .map_err(|err| WireError::Format(format!("fallback encoding failed: {err}")))?;
        Ok(blob)
    }

    fn decode(
        &self,
        target: &mut dyn Reflect,
        blob: &[u8],
        registry: &TypeRegistry,
    ) -> WireResult<()> {
        let capability = registry
            .get_type_trait::<TypeTraitDeserialize>(target.ty_id())
            .ok_or_else(|| {
                WireError::UnsupportedValue(format!(
                    "type `{}` registers no deserialize capability",
                    target.reflect_type_path()
                ))
            })?;
        let mut deserializer = serde_json::Deserializer::from_slice(blob);
        let value = capability
            .deserialize(&mut deserializer)
            .map_err(|err| WireError::Format(format!("fallback decoding failed: {err}")))?;
        target.set(value).map_err(|value| {
            WireError::Format(format!(
                "fallback value of type `{}` does not fit a `{}` slot",
                value.reflect_type_path(),
                target.reflect_type_path(),
            ))
        })
    }
}
