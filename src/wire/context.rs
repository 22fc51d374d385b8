//! The per-traversal bookkeeping handed to hooks.

/// Position information for the traversal in progress.
///
/// Handed by reference to every [`WriteHook`](crate::wire::WriteHook) and
/// [`ReadHook`](crate::wire::ReadHook) checkpoint.
#[derive(Debug, Default)]
pub struct TraversalContext {
    depth: usize,
    objects: usize,
}

impl TraversalContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Nesting depth of the value at the current checkpoint. The top-level
    /// value is at depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of composite objects entered so far in this traversal.
    #[inline]
    pub fn objects_seen(&self) -> usize {
        self.objects
    }

    #[inline]
    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    #[inline]
    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub(crate) fn count_object(&mut self) {
        self.objects += 1;
    }

    pub(crate) fn reset(&mut self) {
        self.depth = 0;
        self.objects = 0;
    }
}
