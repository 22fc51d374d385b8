//! Helper functions for implementing [`Reflect::reflect_partial_eq`] and
//! [`Reflect::reflect_debug`] on composite kinds.
//!
//! [`Reflect::reflect_partial_eq`]: crate::Reflect::reflect_partial_eq
//! [`Reflect::reflect_debug`]: crate::Reflect::reflect_debug

use core::fmt;

use crate::Reflect;
use crate::ops::{List, Map, Optional, ReflectRef, Struct};

/// Member-by-member partial equality for struct kinds.
///
/// Returns `Some(false)` on kind or member-count mismatch; `None` as soon as
/// any member pair is itself incomparable.
pub fn struct_partial_eq(x: &dyn Struct, y: &dyn Reflect) -> Option<bool> {
    let ReflectRef::Struct(y) = y.reflect_ref() else {
        return Some(false);
    };
    if x.field_len() != y.field_len() {
        return Some(false);
    }
    for index in 0..x.field_len() {
        let (a, b) = (x.field_at(index)?, y.field_at(index)?);
        match a.reflect_partial_eq(b) {
            Some(true) => {}
            other => return other,
        }
    }
    Some(true)
}

/// Item-by-item partial equality for list kinds.
pub fn list_partial_eq(x: &dyn List, y: &dyn Reflect) -> Option<bool> {
    let ReflectRef::List(y) = y.reflect_ref() else {
        return Some(false);
    };
    if x.len() != y.len() {
        return Some(false);
    }
    for (a, b) in x.iter().zip(y.iter()) {
        match a.reflect_partial_eq(b) {
            Some(true) => {}
            other => return other,
        }
    }
    Some(true)
}

/// Entry-by-entry partial equality for map kinds, independent of iteration
/// order.
pub fn map_partial_eq(x: &dyn Map, y: &dyn Reflect) -> Option<bool> {
    let ReflectRef::Map(y) = y.reflect_ref() else {
        return Some(false);
    };
    if x.len() != y.len() {
        return Some(false);
    }
    for (key, a) in x.iter() {
        let Some(b) = y.get(key) else {
            return Some(false);
        };
        match a.reflect_partial_eq(b) {
            Some(true) => {}
            other => return other,
        }
    }
    Some(true)
}

/// Presence-then-inner partial equality for option kinds.
pub fn option_partial_eq(x: &dyn Optional, y: &dyn Reflect) -> Option<bool> {
    let ReflectRef::Option(y) = y.reflect_ref() else {
        return Some(false);
    };
    match (x.value(), y.value()) {
        (None, None) => Some(true),
        (Some(a), Some(b)) => a.reflect_partial_eq(b),
        _ => Some(false),
    }
}

/// `Debug` output for struct kinds: `TypeName { field: value, .. }`.
pub fn struct_debug(x: &dyn Struct, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let info = x.struct_info();
    let mut debug = f.debug_struct(info.ty().name());
    for (index, field) in info.iter().enumerate() {
        if let Some(value) = x.field_at(index) {
            debug.field(field.name(), &value as &dyn fmt::Debug);
        }
    }
    debug.finish()
}

/// `Debug` output for list kinds: `[item, ..]`.
pub fn list_debug(x: &dyn List, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut debug = f.debug_list();
    for item in x.iter() {
        debug.entry(&item as &dyn fmt::Debug);
    }
    debug.finish()
}

/// `Debug` output for map kinds: `{key: value, ..}`.
pub fn map_debug(x: &dyn Map, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut debug = f.debug_map();
    for (key, value) in x.iter() {
        debug.entry(&key as &dyn fmt::Debug, &value as &dyn fmt::Debug);
    }
    debug.finish()
}
