//! The write half of the traversal engine.

use chrono::{DateTime, Utc};
use tracing::trace;
use uuid::Uuid;

use crate::info::StructInfo;
use crate::ops::{List, Map, Optional, ReflectRef, SharedNode, Struct};
use crate::registry::TypeRegistryArc;
use crate::wire::codec::Encode;
use crate::wire::extension::ExtensionKind;
use crate::wire::hooks::{HookAction, MemberSelect, WriteHook};
use crate::wire::refs::WriteRefTable;
use crate::wire::{FallbackCodec, Settings, TraversalContext, WireError, WireResult};
use crate::{Bytes, Decimal, Reflect};

// -----------------------------------------------------------------------------
// GraphWriter

/// Walks an object graph through its [`Reflect`] surface and spells it out
/// as primitive codec operations.
///
/// The classification order for every value is fixed: primitive by
/// [`TypeId`], extension by [`TypeId`], then the structural kinds (shared
/// node, map, list, option, struct), and finally the fallback codec for
/// opaque values nothing else claimed.
///
/// # Examples
///
/// ```
/// use graphwire::registry::TypeRegistryArc;
/// use graphwire::wire::{BinaryEncoder, GraphWriter};
///
/// let registry = TypeRegistryArc::default();
/// let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry);
/// writer.write(&12345_i64).unwrap();
/// assert_eq!(writer.into_inner().into_inner().len(), 8);
/// ```
///
/// [`TypeId`]: core::any::TypeId
pub struct GraphWriter<E: Encode> {
    encoder: E,
    settings: Settings,
    frozen: bool,
    registry: TypeRegistryArc,
    hooks: Vec<Box<dyn WriteHook>>,
    selector: Option<Box<dyn MemberSelect>>,
    fallback: Option<Box<dyn FallbackCodec>>,
    refs: WriteRefTable,
    ctx: TraversalContext,
}

impl<E: Encode> GraphWriter<E> {
    /// Creates a writer over an encoder, resolving types against `registry`.
    pub fn new(encoder: E, registry: TypeRegistryArc) -> Self {
        Self {
            encoder,
            settings: Settings::default(),
            frozen: false,
            registry,
            hooks: Vec::new(),
            selector: None,
            fallback: None,
            refs: WriteRefTable::new(),
            ctx: TraversalContext::new(),
        }
    }

    /// Returns the active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings.
    ///
    /// Fails with [`WireError::SettingsFrozen`] once the first write has
    /// happened; the output produced so far would not match.
    pub fn set_settings(&mut self, settings: Settings) -> WireResult<()> {
        if self.frozen {
            return Err(WireError::SettingsFrozen);
        }
        self.settings = settings;
        Ok(())
    }

    /// Returns the registry handle this writer resolves against.
    pub fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    /// Installs a hook, after any already installed.
    pub fn add_hook(&mut self, hook: Box<dyn WriteHook>) {
        self.hooks.push(hook);
    }

    /// Installs the member selector, replacing any previous one.
    pub fn set_member_select(&mut self, selector: Box<dyn MemberSelect>) {
        self.selector = Some(selector);
    }

    /// Installs the fallback codec, replacing any previous one.
    pub fn set_fallback(&mut self, fallback: Box<dyn FallbackCodec>) {
        self.fallback = Some(fallback);
    }

    /// Unwraps the encoder.
    pub fn into_inner(self) -> E {
        self.encoder
    }

    /// Writes one complete value graph.
    ///
    /// Every top-level write starts with a fresh reference table, so
    /// back-reference indices never leak across calls. Flushes the encoder
    /// afterwards when [`Settings::auto_flush`] is on.
    pub fn write(&mut self, value: &dyn Reflect) -> WireResult<()> {
        self.frozen = true;
        self.refs.clear();
        self.ctx.reset();
        trace!(ty = value.reflect_type_path(), "write graph");
        self.write_value(value)?;
        if self.settings.auto_flush {
            self.encoder.flush()?;
        }
        Ok(())
    }

    fn write_value(&mut self, value: &dyn Reflect) -> WireResult<()> {
        if self.write_primitive(value)? {
            return Ok(());
        }
        if let Some(extension) = ExtensionKind::resolve(value.ty_id()) {
            let registry = self.registry.read();
            return extension.write(&mut self.encoder, value, &self.settings, &registry);
        }
        match value.reflect_ref() {
            ReflectRef::Ref(node) => self.write_shared(node),
            ReflectRef::Map(map) => self.write_map(map),
            ReflectRef::List(list) => self.write_list(list),
            ReflectRef::Option(option) => self.write_option(option),
            ReflectRef::Struct(object) => self.write_struct(object),
            ReflectRef::Opaque(opaque) => self.write_fallback(opaque),
        }
    }

    fn write_primitive(&mut self, value: &dyn Reflect) -> WireResult<bool> {
        if let Some(v) = value.downcast_ref::<bool>() {
            self.encoder.write_bool(*v)?;
        } else if let Some(v) = value.downcast_ref::<i16>() {
            self.encoder.write_i16(*v)?;
        } else if let Some(v) = value.downcast_ref::<u16>() {
            self.encoder.write_u16(*v)?;
        } else if let Some(v) = value.downcast_ref::<i32>() {
            self.encoder.write_i32(*v)?;
        } else if let Some(v) = value.downcast_ref::<u32>() {
            self.encoder.write_u32(*v)?;
        } else if let Some(v) = value.downcast_ref::<i64>() {
            self.encoder.write_i64(*v)?;
        } else if let Some(v) = value.downcast_ref::<u64>() {
            self.encoder.write_u64(*v)?;
        } else if let Some(v) = value.downcast_ref::<f32>() {
            self.encoder.write_f32(*v)?;
        } else if let Some(v) = value.downcast_ref::<f64>() {
            self.encoder.write_f64(*v)?;
        } else if let Some(v) = value.downcast_ref::<String>() {
            self.encoder.write_str(v, &self.settings)?;
        } else if let Some(v) = value.downcast_ref::<Bytes>() {
            self.encoder.write_bytes(v.as_slice(), &self.settings)?;
        } else if let Some(v) = value.downcast_ref::<Decimal>() {
            self.encoder.write_decimal(*v)?;
        } else if let Some(v) = value.downcast_ref::<DateTime<Utc>>() {
            self.encoder.write_datetime(*v, &self.settings)?;
        } else if let Some(v) = value.downcast_ref::<Uuid>() {
            // Resolved here rather than in the extension table so the two
            // backends can give UUIDs their natural form directly.
            self.encoder.write_uuid(*v)?;
        } else if value.downcast_ref::<()>().is_some() {
            // The unit value occupies no wire space.
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Composite kinds

    fn write_struct(&mut self, object: &dyn Struct) -> WireResult<()> {
        match self.run_before_object(object as &dyn Reflect) {
            HookAction::Replace(replacement) => return self.write_value(&*replacement),
            HookAction::Skip => {
                // An empty member list keeps the framing intact.
                return self.encoder.write_bool(false);
            }
            HookAction::Continue => {}
        }
        self.ctx.count_object();
        self.ctx.enter();
        let result = self.write_struct_members(object);
        self.ctx.exit();
        result?;
        self.run_after_object(object as &dyn Reflect);
        Ok(())
    }

    fn write_struct_members(&mut self, object: &dyn Struct) -> WireResult<()> {
        let info = object.struct_info();
        let indices = match &self.selector {
            Some(selector) => selector.members(object),
            None => (0..info.field_len()).collect(),
        };
        for index in indices {
            let field = info
                .field_at(index)
                .ok_or_else(|| member_out_of_range(info, index))?;
            let member = object
                .field_at(index)
                .ok_or_else(|| member_out_of_range(info, index))?;
            match self.run_before_member(field, member) {
                HookAction::Skip => continue,
                HookAction::Replace(replacement) => {
                    self.encoder.write_bool(true)?;
                    self.encoder.write_str(field.name(), &self.settings)?;
                    self.write_value(&*replacement)
                        .map_err(|err| err.into_member(field.name(), self.ctx.depth()))?;
                }
                HookAction::Continue => {
                    self.encoder.write_bool(true)?;
                    self.encoder.write_str(field.name(), &self.settings)?;
                    self.write_value(member)
                        .map_err(|err| err.into_member(field.name(), self.ctx.depth()))?;
                }
            }
            self.run_after_member(field, member);
        }
        self.encoder.write_bool(false)?;
        Ok(())
    }

    fn write_list(&mut self, list: &dyn List) -> WireResult<()> {
        // Items of a tagged list each announce their own type.
        let tagged = list
            .reflect_type_info()
            .as_list()
            .is_none_or(|info| info.item().is_none());
        self.ctx.enter();
        let result = self.write_list_items(list, tagged);
        self.ctx.exit();
        result
    }

    fn write_list_items(&mut self, list: &dyn List, tagged: bool) -> WireResult<()> {
        // Hook decisions come first so the count covers only the items that
        // actually land on the wire.
        let mut plan = Vec::with_capacity(list.len());
        for item in list.iter() {
            plan.push(match self.run_before_element(None, item) {
                HookAction::Skip => None,
                HookAction::Replace(replacement) => Some(Some(replacement)),
                HookAction::Continue => Some(None),
            });
        }
        if self.settings.use_size_prefix {
            let written = plan.iter().filter(|d| d.is_some()).count();
            self.encoder.write_len(written, &self.settings)?;
        }
        for (item, decision) in list.iter().zip(plan) {
            match decision {
                None => continue,
                Some(Some(replacement)) => self.write_element(&*replacement, tagged)?,
                Some(None) => self.write_element(item, tagged)?,
            }
            self.run_after_element(None, item);
        }
        Ok(())
    }

    fn write_element(&mut self, item: &dyn Reflect, tagged: bool) -> WireResult<()> {
        if tagged {
            self.write_type_tag(item)?;
        }
        self.write_value(item)
    }

    fn write_map(&mut self, map: &dyn Map) -> WireResult<()> {
        let tagged = map
            .reflect_type_info()
            .as_map()
            .is_none_or(|info| info.key().is_none());
        self.ctx.enter();
        let result = self.write_entries(map, tagged);
        self.ctx.exit();
        result
    }

    fn write_entries(&mut self, map: &dyn Map, tagged: bool) -> WireResult<()> {
        // Iterating an unmodified map twice yields the same order, so the
        // hook pass and the write pass line up entry for entry.
        let mut plan = Vec::with_capacity(map.len());
        for (key, value) in map.iter() {
            plan.push(match self.run_before_element(Some(key), value) {
                HookAction::Skip => None,
                HookAction::Replace(replacement) => Some(Some(replacement)),
                HookAction::Continue => Some(None),
            });
        }
        if self.settings.use_size_prefix {
            let written = plan.iter().filter(|d| d.is_some()).count();
            self.encoder.write_len(written, &self.settings)?;
        }
        for ((key, value), decision) in map.iter().zip(plan) {
            match decision {
                None => continue,
                Some(Some(replacement)) => {
                    self.write_element(key, tagged)?;
                    self.write_element(&*replacement, tagged)?;
                }
                Some(None) => {
                    self.write_element(key, tagged)?;
                    self.write_element(value, tagged)?;
                }
            }
            self.run_after_element(Some(key), value);
        }
        Ok(())
    }

    fn write_option(&mut self, option: &dyn Optional) -> WireResult<()> {
        match option.value() {
            Some(inner) => {
                self.encoder.write_bool(true)?;
                self.ctx.enter();
                let result = self.write_value(inner);
                self.ctx.exit();
                result
            }
            None => self.encoder.write_bool(false),
        }
    }

    fn write_shared(&mut self, node: &dyn SharedNode) -> WireResult<()> {
        if self.settings.use_object_reference {
            match self.refs.intern(node.identity()) {
                Ok(index) => {
                    // Seen before: a back-reference replaces the content.
                    self.encoder.write_bool(true)?;
                    return self.encoder.write_len(index, &self.settings);
                }
                Err(_) => self.encoder.write_bool(false)?,
            }
        }
        self.ctx.enter();
        let result = node.with_target(&mut |target| self.write_value(target));
        self.ctx.exit();
        result
    }

    fn write_fallback(&mut self, value: &dyn Reflect) -> WireResult<()> {
        let Some(fallback) = self.fallback.as_deref() else {
            return Err(WireError::UnsupportedValue(format!(
                "no traversal path covers `{}` and no fallback codec is installed",
                value.reflect_type_path()
            )));
        };
        trace!(ty = value.reflect_type_path(), "fallback encode");
        let blob = {
            let registry = self.registry.read();
            fallback.encode(value, &registry)?
        };
        self.encoder.write_bytes(&blob, &self.settings)
    }

    fn write_type_tag(&mut self, value: &dyn Reflect) -> WireResult<()> {
        let tag = if self.settings.use_type_full_name {
            value.reflect_type_path()
        } else {
            value.reflect_type_name()
        };
        self.encoder.write_str(tag, &self.settings)
    }

    // ------------------------------------------------------------------
    // Hook dispatch: installation order, first non-Continue action wins.

    fn run_before_object(&mut self, value: &dyn Reflect) -> HookAction {
        for i in 0..self.hooks.len() {
            match self.hooks[i].before_object(value, &self.ctx) {
                HookAction::Continue => {}
                action => return action,
            }
        }
        HookAction::Continue
    }

    fn run_after_object(&mut self, value: &dyn Reflect) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_object(value, &self.ctx);
        }
    }

    fn run_before_member(
        &mut self,
        field: &crate::info::FieldInfo,
        value: &dyn Reflect,
    ) -> HookAction {
        for i in 0..self.hooks.len() {
            match self.hooks[i].before_member(field, value, &self.ctx) {
                HookAction::Continue => {}
                action => return action,
            }
        }
        HookAction::Continue
    }

    fn run_after_member(&mut self, field: &crate::info::FieldInfo, value: &dyn Reflect) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_member(field, value, &self.ctx);
        }
    }

    fn run_before_element(
        &mut self,
        key: Option<&dyn Reflect>,
        value: &dyn Reflect,
    ) -> HookAction {
        for i in 0..self.hooks.len() {
            match self.hooks[i].before_element(key, value, &self.ctx) {
                HookAction::Continue => {}
                action => return action,
            }
        }
        HookAction::Continue
    }

    fn run_after_element(&mut self, key: Option<&dyn Reflect>, value: &dyn Reflect) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_element(key, value, &self.ctx);
        }
    }
}

fn member_out_of_range(info: &StructInfo, index: usize) -> WireError {
    WireError::MemberAccess(format!(
        "`{}` has no member at index {index}",
        info.ty().path()
    ))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::Shared;
    use crate::derive::Reflect;
    use crate::registry::TypeRegistryArc;
    use crate::wire::{
        BinaryEncoder, GraphWriter, HookAction, Settings, TraversalContext, WireError, WriteHook,
    };

    #[derive(Reflect, Default)]
    struct Sample {
        sequence: i64,
        label: String,
    }

    #[derive(Reflect, Default)]
    struct Pair {
        left: Shared<i32>,
        right: Shared<i32>,
    }

    fn encode(value: &dyn crate::Reflect, settings: Settings) -> Vec<u8> {
        let mut writer =
            GraphWriter::new(BinaryEncoder::new(Vec::new()), TypeRegistryArc::default());
        writer.set_settings(settings).unwrap();
        writer.write(value).unwrap();
        writer.into_inner().into_inner()
    }

    #[test]
    fn settings_freeze_on_first_write() {
        let mut writer =
            GraphWriter::new(BinaryEncoder::new(Vec::new()), TypeRegistryArc::default());
        writer.write(&1_i32).unwrap();
        assert!(matches!(
            writer.set_settings(Settings::default()),
            Err(WireError::SettingsFrozen)
        ));
    }

    #[test]
    fn skipped_objects_keep_the_framing_intact() {
        struct SkipEverything;

        impl WriteHook for SkipEverything {
            fn before_object(
                &mut self,
                _value: &dyn crate::Reflect,
                _ctx: &TraversalContext,
            ) -> HookAction {
                HookAction::Skip
            }
        }

        let mut writer =
            GraphWriter::new(BinaryEncoder::new(Vec::new()), TypeRegistryArc::default());
        writer.add_hook(Box::new(SkipEverything));
        writer
            .write(&Sample {
                sequence: 3,
                label: String::from("hidden"),
            })
            .unwrap();
        // A lone terminator: the empty member list.
        assert_eq!(writer.into_inner().into_inner(), [0]);
    }

    #[test]
    fn repeated_handles_shrink_to_backrefs() {
        let handle = Shared::new(21_i32);
        let aliased = Pair {
            left: handle.clone(),
            right: handle,
        };
        let distinct = Pair {
            left: Shared::new(21_i32),
            right: Shared::new(21_i32),
        };

        let aliased_bytes = encode(&aliased, Settings::default());
        let distinct_bytes = encode(&distinct, Settings::default());
        assert!(aliased_bytes.len() < distinct_bytes.len());

        let untracked = Settings::default().with_object_reference(false);
        assert_eq!(
            encode(&aliased, untracked.clone()).len(),
            encode(&distinct, untracked).len()
        );
    }
}
