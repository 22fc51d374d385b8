use crate::Reflect;
use crate::wire::WireError;

// -----------------------------------------------------------------------------
// SharedNode

/// Access to a reference-tracked shared handle
/// ([`Shared<T>`](crate::Shared)).
///
/// Shared nodes are the values the [`ReferenceTable`] tracks: the engine asks
/// a node for its [`identity`](SharedNode::identity) before traversing it,
/// and collapses repeated identities into back-references when
/// [`Settings::use_object_reference`](crate::wire::Settings) is enabled.
///
/// [`ReferenceTable`]: crate::wire::WriteRefTable
pub trait SharedNode: Reflect {
    /// Returns the identity of the shared allocation (stable for the
    /// lifetime of the handle, equal across clones of the same handle).
    fn identity(&self) -> usize;

    /// Returns a new handle to the same allocation, boxed as the concrete
    /// `Shared<T>` type.
    fn clone_handle(&self) -> Box<dyn Reflect>;

    /// Redirects this handle at the allocation behind `other`.
    ///
    /// Returns `false` when `other` is not a handle of the same concrete
    /// type.
    fn adopt(&mut self, other: &dyn Reflect) -> bool;

    /// Runs `f` against the target value under the node's read lock.
    fn with_target(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), WireError>,
    ) -> Result<(), WireError>;

    /// Runs `f` against the target value under the node's write lock.
    fn with_target_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), WireError>,
    ) -> Result<(), WireError>;
}
