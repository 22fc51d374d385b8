//! Reference tables for shared-node tracking.
//!
//! The write table maps node identities to the order in which their content
//! was first written; the read table records handles in the same order, so a
//! back-reference index on the wire resolves to the matching handle. Both
//! sides assigning indices in first-encounter order is what makes the
//! indices line up.

use crate::Reflect;
use crate::wire::{WireError, WireResult};

// -----------------------------------------------------------------------------
// WriteRefTable

/// First-encounter index assignment for written shared nodes.
#[derive(Default)]
pub struct WriteRefTable {
    // Identity -> slot. Linear scan: graphs that benefit from tracking
    // rarely hold enough distinct nodes for a map to pay off.
    entries: Vec<usize>,
}

impl WriteRefTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `identity`, inserting it at the next slot when absent.
    ///
    /// Returns `Ok(index)` for a previously seen identity and `Err(index)`
    /// with the newly assigned slot otherwise.
    pub fn intern(&mut self, identity: usize) -> Result<usize, usize> {
        match self.entries.iter().position(|entry| *entry == identity) {
            Some(index) => Ok(index),
            None => {
                self.entries.push(identity);
                Err(self.entries.len() - 1)
            }
        }
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identity has been tracked yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets all tracked identities.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// -----------------------------------------------------------------------------
// ReadRefTable

/// First-encounter handle recording for read shared nodes.
#[derive(Default)]
pub struct ReadRefTable {
    handles: Vec<Box<dyn Reflect>>,
}

impl ReadRefTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a handle, assigning it the next slot.
    ///
    /// Must happen *before* the node's content is read, so that a cycle
    /// pointing back at the node under construction can resolve.
    pub fn record(&mut self, handle: Box<dyn Reflect>) -> usize {
        self.handles.push(handle);
        self.handles.len() - 1
    }

    /// Resolves a back-reference index to the recorded handle.
    pub fn resolve(&self, index: usize) -> WireResult<&dyn Reflect> {
        self.handles
            .get(index)
            .map(|handle| &**handle)
            .ok_or_else(|| {
                WireError::Format(format!(
                    "back-reference {index} out of range ({} nodes recorded)",
                    self.handles.len()
                ))
            })
    }

    /// Number of recorded handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handle has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Forgets all recorded handles.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shared;
    use crate::ops::SharedNode;

    #[test]
    fn intern_assigns_slots_in_first_encounter_order() {
        let mut table = WriteRefTable::new();
        assert_eq!(table.intern(10), Err(0));
        assert_eq!(table.intern(20), Err(1));
        assert_eq!(table.intern(10), Ok(0));
        assert_eq!(table.intern(20), Ok(1));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn resolve_rejects_out_of_range_indices() {
        let mut table = ReadRefTable::new();
        let node = Shared::new(1_i32);
        let slot = table.record(node.clone_handle());
        assert_eq!(slot, 0);
        assert!(table.resolve(0).is_ok());
        assert!(matches!(table.resolve(1), Err(WireError::Format(_))));
    }
}
