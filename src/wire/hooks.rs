//! Traversal hooks: checkpoints, actions, and the provided filters.
//!
//! Hooks observe or redirect the traversal at six checkpoints: around
//! composite objects, around struct members, and around collection elements
//! (list items and map entries share the element checkpoints). `before_*`
//! checkpoints return an action; `after_*` checkpoints are pure observers.
//! When several hooks are installed they run in installation order, and the
//! first non-[`Continue`](HookAction::Continue) action wins.

use std::collections::HashSet;

use crate::Reflect;
use crate::info::FieldInfo;
use crate::ops::Struct;
use crate::registry::{TypeRegistry, TypeTraitDefault};
use crate::wire::TraversalContext;

// -----------------------------------------------------------------------------
// Actions

/// What a write-side `before_*` checkpoint tells the engine to do.
pub enum HookAction {
    /// Proceed with the value as-is.
    Continue,
    /// Serialize this value in place of the original.
    Replace(Box<dyn Reflect>),
    /// Leave the value off the wire entirely.
    Skip,
}

/// What a read-side `before_*` checkpoint tells the engine to do.
///
/// The read side cannot replace what is already on the wire, and a skipped
/// value must still be consumed to keep the stream aligned; `Skip` therefore
/// means "read and discard".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadHookAction {
    /// Read the value into the target.
    Continue,
    /// Consume the value from the wire but leave the target untouched.
    Skip,
}

// -----------------------------------------------------------------------------
// Hook traits

/// Observes and redirects a write traversal.
///
/// Every method has a pass-through default; implement only the checkpoints
/// you care about.
#[allow(unused_variables)]
pub trait WriteHook {
    /// Runs before a composite object's members are written.
    fn before_object(&mut self, value: &dyn Reflect, ctx: &TraversalContext) -> HookAction {
        HookAction::Continue
    }

    /// Runs after a composite object's members were written.
    fn after_object(&mut self, value: &dyn Reflect, ctx: &TraversalContext) {}

    /// Runs before one struct member is written.
    fn before_member(
        &mut self,
        field: &FieldInfo,
        value: &dyn Reflect,
        ctx: &TraversalContext,
    ) -> HookAction {
        HookAction::Continue
    }

    /// Runs after one struct member was written.
    fn after_member(&mut self, field: &FieldInfo, value: &dyn Reflect, ctx: &TraversalContext) {}

    /// Runs before one collection element (list item or map value) is
    /// written. For map entries `key` is `Some`.
    fn before_element(
        &mut self,
        key: Option<&dyn Reflect>,
        value: &dyn Reflect,
        ctx: &TraversalContext,
    ) -> HookAction {
        HookAction::Continue
    }

    /// Runs after one collection element was written.
    fn after_element(
        &mut self,
        key: Option<&dyn Reflect>,
        value: &dyn Reflect,
        ctx: &TraversalContext,
    ) {
    }
}

/// Observes and filters a read traversal.
#[allow(unused_variables)]
pub trait ReadHook {
    /// Runs before a composite object's members are read.
    fn before_object(&mut self, target: &dyn Reflect, ctx: &TraversalContext) -> ReadHookAction {
        ReadHookAction::Continue
    }

    /// Runs after a composite object's members were read.
    fn after_object(&mut self, target: &dyn Reflect, ctx: &TraversalContext) {}

    /// Runs before a struct member arriving under `name` is read.
    fn before_member(&mut self, name: &str, ctx: &TraversalContext) -> ReadHookAction {
        ReadHookAction::Continue
    }

    /// Runs after a struct member was read.
    fn after_member(&mut self, name: &str, ctx: &TraversalContext) {}

    /// Runs before one collection element is read.
    fn before_element(&mut self, index: usize, ctx: &TraversalContext) -> ReadHookAction {
        ReadHookAction::Continue
    }

    /// Runs after one collection element was read.
    fn after_element(&mut self, index: usize, ctx: &TraversalContext) {}
}

/// Replaces the member list of every struct the writer visits.
///
/// Where [`WriteHook::before_member`] filters one member at a time, a
/// selector decides the whole list up front. At most one selector can be
/// installed.
pub trait MemberSelect {
    /// Returns the declaration indices of the members to write, in wire
    /// order.
    fn members(&self, value: &dyn Struct) -> Vec<usize>;
}

// -----------------------------------------------------------------------------
// Provided hooks

/// A write hook that leaves members holding their default value off the
/// wire.
///
/// Default instances are activated through the registry's
/// [`TypeTraitDefault`] capability; a member whose type carries no such
/// capability (or is not comparable) is always written.
pub struct SkipDefaultMembers {
    registry: crate::registry::TypeRegistryArc,
}

impl SkipDefaultMembers {
    /// Builds the filter over the registry the writer resolves against.
    pub fn new(registry: crate::registry::TypeRegistryArc) -> Self {
        Self { registry }
    }
}

impl WriteHook for SkipDefaultMembers {
    fn before_member(
        &mut self,
        _field: &FieldInfo,
        value: &dyn Reflect,
        _ctx: &TraversalContext,
    ) -> HookAction {
        let registry = self.registry.read();
        let Some(generator) = registry.get_type_trait::<TypeTraitDefault>(value.ty_id()) else {
            return HookAction::Continue;
        };
        if value.reflect_partial_eq(&*generator.default()) == Some(true) {
            HookAction::Skip
        } else {
            HookAction::Continue
        }
    }
}

/// Skips struct members by name, on either side.
///
/// As a [`WriteHook`] the named members never reach the wire; as a
/// [`ReadHook`] they are consumed and discarded when a peer did write them.
pub struct SkipMembers {
    names: HashSet<String>,
}

impl SkipMembers {
    /// Builds the filter from the member names to skip.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl WriteHook for SkipMembers {
    fn before_member(
        &mut self,
        field: &FieldInfo,
        _value: &dyn Reflect,
        _ctx: &TraversalContext,
    ) -> HookAction {
        if self.names.contains(field.name()) {
            HookAction::Skip
        } else {
            HookAction::Continue
        }
    }
}

impl ReadHook for SkipMembers {
    fn before_member(&mut self, name: &str, _ctx: &TraversalContext) -> ReadHookAction {
        if self.names.contains(name) {
            ReadHookAction::Skip
        } else {
            ReadHookAction::Continue
        }
    }
}

// -----------------------------------------------------------------------------
// Default comparison

/// Whether the member at `index` of `owner` holds its type's default value.
///
/// Activation goes through the registry's [`TypeTraitDefault`] capability;
/// members of unregistered or incomparable types report `false`.
pub fn is_default_member(registry: &TypeRegistry, owner: &dyn Struct, index: usize) -> bool {
    let Some(value) = owner.field_at(index) else {
        return false;
    };
    let Some(generator) = registry.get_type_trait::<TypeTraitDefault>(value.ty_id()) else {
        return false;
    };
    let default = generator.default();
    value.reflect_partial_eq(&*default) == Some(true)
}
