//! An owned byte buffer carried as a single opaque leaf.

use crate::impls::impl_reflect_opaque;

/// An owned byte buffer.
///
/// `Bytes` travels as one length-prefixed blob rather than as a list of
/// individual elements, and the text backend renders it as a hex or base64
/// token per [`Settings::bytes_encoding`](crate::wire::Settings).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Creates an empty buffer.
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the content as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwraps the buffer into its backing vector.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl_reflect_opaque!(Bytes, path: "graphwire::Bytes", name: "Bytes");
