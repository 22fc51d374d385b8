//! The read half of the traversal engine.

use chrono::{DateTime, Utc};
use tracing::trace;
use uuid::Uuid;

use crate::ops::{List, Map, Optional, ReflectMut, SharedNode, Struct};
use crate::registry::{TypeRegistryArc, TypeTraitDefault};
use crate::wire::codec::Decode;
use crate::wire::extension::{ExtensionKind, resolve_tag};
use crate::wire::hooks::{ReadHook, ReadHookAction};
use crate::wire::refs::ReadRefTable;
use crate::wire::{FallbackCodec, Settings, TraversalContext, WireError, WireResult};
use crate::{Bytes, Decimal, Reflect};

// -----------------------------------------------------------------------------
// GraphReader

/// Rebuilds an object graph by mirroring [`GraphWriter`] operation for
/// operation.
///
/// Values are read *into* existing targets: the caller supplies the
/// top-level instance (or lets [`read`](GraphReader::read) start from
/// `Default`), and nested slots the wire fills in are activated through the
/// registry's [`TypeTraitDefault`] capability.
///
/// [`GraphWriter`]: crate::wire::GraphWriter
pub struct GraphReader<D: Decode> {
    decoder: D,
    settings: Settings,
    frozen: bool,
    registry: TypeRegistryArc,
    hooks: Vec<Box<dyn ReadHook>>,
    fallback: Option<Box<dyn FallbackCodec>>,
    refs: ReadRefTable,
    ctx: TraversalContext,
}

impl<D: Decode> GraphReader<D> {
    /// Creates a reader over a decoder, resolving types against `registry`.
    pub fn new(decoder: D, registry: TypeRegistryArc) -> Self {
        Self {
            decoder,
            settings: Settings::default(),
            frozen: false,
            registry,
            hooks: Vec::new(),
            fallback: None,
            refs: ReadRefTable::new(),
            ctx: TraversalContext::new(),
        }
    }

    /// Returns the active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings.
    ///
    /// Fails with [`WireError::SettingsFrozen`] once the first read has
    /// happened.
    pub fn set_settings(&mut self, settings: Settings) -> WireResult<()> {
        if self.frozen {
            return Err(WireError::SettingsFrozen);
        }
        self.settings = settings;
        Ok(())
    }

    /// Returns the registry handle this reader resolves against.
    pub fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    /// Installs a hook, after any already installed.
    pub fn add_hook(&mut self, hook: Box<dyn ReadHook>) {
        self.hooks.push(hook);
    }

    /// Installs the fallback codec, replacing any previous one.
    pub fn set_fallback(&mut self, fallback: Box<dyn FallbackCodec>) {
        self.fallback = Some(fallback);
    }

    /// Unwraps the decoder.
    pub fn into_inner(self) -> D {
        self.decoder
    }

    /// Reads one complete value graph into a fresh `T`.
    pub fn read<T: Reflect + Default>(&mut self) -> WireResult<T> {
        let mut value = T::default();
        self.read_into(value.as_reflect_mut())?;
        Ok(value)
    }

    /// Reads one complete value graph into an existing target.
    ///
    /// Mirrors [`GraphWriter::write`](crate::wire::GraphWriter::write): the
    /// reference table starts fresh on every call.
    pub fn read_into(&mut self, target: &mut dyn Reflect) -> WireResult<()> {
        self.frozen = true;
        self.refs.clear();
        self.ctx.reset();
        trace!(ty = target.reflect_type_path(), "read graph");
        self.read_value(target)
    }

    fn read_value(&mut self, target: &mut dyn Reflect) -> WireResult<()> {
        if self.read_primitive(target)? {
            return Ok(());
        }
        if let Some(extension) = ExtensionKind::resolve(target.ty_id()) {
            let registry = self.registry.read();
            return extension.read(&mut self.decoder, target, &self.settings, &registry);
        }
        match target.reflect_mut() {
            ReflectMut::Ref(node) => self.read_shared(node),
            ReflectMut::Map(map) => self.read_map(map),
            ReflectMut::List(list) => self.read_list(list),
            ReflectMut::Option(option) => self.read_option(option),
            ReflectMut::Struct(object) => self.read_struct(object),
            ReflectMut::Opaque(opaque) => self.read_fallback(opaque),
        }
    }

    fn read_primitive(&mut self, target: &mut dyn Reflect) -> WireResult<bool> {
        if let Some(v) = target.downcast_mut::<bool>() {
            *v = self.decoder.read_bool()?;
        } else if let Some(v) = target.downcast_mut::<i16>() {
            *v = self.decoder.read_i16()?;
        } else if let Some(v) = target.downcast_mut::<u16>() {
            *v = self.decoder.read_u16()?;
        } else if let Some(v) = target.downcast_mut::<i32>() {
            *v = self.decoder.read_i32()?;
        } else if let Some(v) = target.downcast_mut::<u32>() {
            *v = self.decoder.read_u32()?;
        } else if let Some(v) = target.downcast_mut::<i64>() {
            *v = self.decoder.read_i64()?;
        } else if let Some(v) = target.downcast_mut::<u64>() {
            *v = self.decoder.read_u64()?;
        } else if let Some(v) = target.downcast_mut::<f32>() {
            *v = self.decoder.read_f32()?;
        } else if let Some(v) = target.downcast_mut::<f64>() {
            *v = self.decoder.read_f64()?;
        } else if let Some(v) = target.downcast_mut::<String>() {
            *v = self.decoder.read_str(&self.settings)?;
        } else if let Some(v) = target.downcast_mut::<Bytes>() {
            *v = Bytes::from(self.decoder.read_bytes(&self.settings)?);
        } else if let Some(v) = target.downcast_mut::<Decimal>() {
            *v = self.decoder.read_decimal()?;
        } else if let Some(v) = target.downcast_mut::<DateTime<Utc>>() {
            *v = self.decoder.read_datetime(&self.settings)?;
        } else if let Some(v) = target.downcast_mut::<Uuid>() {
            *v = self.decoder.read_uuid()?;
        } else if target.downcast_mut::<()>().is_some() {
            // The unit value occupies no wire space.
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// Activates a fresh default instance of the type with `type_id`.
    fn activate(&self, type_id: core::any::TypeId, slot: &str) -> WireResult<Box<dyn Reflect>> {
        let registry = self.registry.read();
        let generator = registry
            .get_type_trait::<TypeTraitDefault>(type_id)
            .ok_or_else(|| {
                WireError::TypeResolution(format!(
                    "cannot activate {slot}: no default capability registered"
                ))
            })?;
        Ok(generator.default())
    }

    // ------------------------------------------------------------------
    // Composite kinds

    fn read_struct(&mut self, object: &mut dyn Struct) -> WireResult<()> {
        let discard_all =
            self.run_before_object(&*object) == ReadHookAction::Skip;
        self.ctx.count_object();
        self.ctx.enter();
        let result = self.read_struct_members(object, discard_all);
        self.ctx.exit();
        result?;
        self.run_after_object(&*object);
        Ok(())
    }

    fn read_struct_members(&mut self, object: &mut dyn Struct, discard_all: bool) -> WireResult<()> {
        let info = object.struct_info();
        while self.decoder.read_bool()? {
            let name = self.decoder.read_str(&self.settings)?;
            let field = info.field(&name).ok_or_else(|| {
                WireError::Format(format!(
                    "wire carries unknown member `{name}` for `{}`",
                    info.ty().path()
                ))
            })?;
            let index = field.index() as usize;
            let discard =
                discard_all || self.run_before_member(&name) == ReadHookAction::Skip;
            if discard {
                // The stream must stay aligned: consume into a scratch
                // instance of the declared type and drop it.
                let mut scratch = self.activate(
                    field.ty().id(),
                    &format!("member `{name}` of `{}`", info.ty().path()),
                )?;
                self.read_value(&mut *scratch)
                    .map_err(|err| err.into_member(&name, self.ctx.depth()))?;
            } else {
                let member = object.field_at_mut(index).ok_or_else(|| {
                    WireError::MemberAccess(format!(
                        "`{}` has no member at index {index}",
                        info.ty().path()
                    ))
                })?;
                self.read_value(member)
                    .map_err(|err| err.into_member(&name, self.ctx.depth()))?;
            }
            self.run_after_member(&name);
        }
        Ok(())
    }

    fn read_list(&mut self, list: &mut dyn List) -> WireResult<()> {
        let item_ty = list
            .reflect_type_info()
            .as_list()
            .and_then(|info| info.item())
            .map(|ty| ty.id());
        list.clear();
        self.ctx.enter();
        let result = self.read_items(list, item_ty);
        self.ctx.exit();
        result
    }

    fn read_items(
        &mut self,
        list: &mut dyn List,
        item_ty: Option<core::any::TypeId>,
    ) -> WireResult<()> {
        let count = self.read_element_count()?;
        for index in 0..count {
            let discard = self.run_before_element(index) == ReadHookAction::Skip;
            let item = self.read_tagged_value(item_ty, "list item")?;
            if !discard {
                list.try_push(item).map_err(|item| {
                    WireError::MemberAccess(format!(
                        "`{}` rejected an item of type `{}`",
                        list.reflect_type_path(),
                        item.reflect_type_path()
                    ))
                })?;
            }
            self.run_after_element(index);
        }
        Ok(())
    }

    fn read_map(&mut self, map: &mut dyn Map) -> WireResult<()> {
        let entry_ty = match map.reflect_type_info().as_map() {
            Some(info) => match (info.key(), info.value()) {
                (Some(key), Some(value)) => Some((key.id(), value.id())),
                _ => None,
            },
            None => None,
        };
        map.clear();
        self.ctx.enter();
        let result = self.read_entries(map, entry_ty);
        self.ctx.exit();
        result
    }

    fn read_entries(
        &mut self,
        map: &mut dyn Map,
        entry_ty: Option<(core::any::TypeId, core::any::TypeId)>,
    ) -> WireResult<()> {
        let count = self.read_element_count()?;
        for index in 0..count {
            let discard = self.run_before_element(index) == ReadHookAction::Skip;
            let key = self.read_tagged_value(entry_ty.map(|(key, _)| key), "map key")?;
            let value = self.read_tagged_value(entry_ty.map(|(_, value)| value), "map value")?;
            if !discard {
                map.try_insert(key, value).map_err(|(key, _)| {
                    WireError::MemberAccess(format!(
                        "`{}` rejected an entry keyed by `{}`",
                        map.reflect_type_path(),
                        key.reflect_type_path()
                    ))
                })?;
            }
            self.run_after_element(index);
        }
        Ok(())
    }

    // Streams written with prefixing disabled carry no counts; reading them
    // back is refused on every backend alike.
    fn read_element_count(&mut self) -> WireResult<usize> {
        if !self.settings.use_size_prefix {
            return Err(WireError::Format(
                "collections written without a count prefix cannot be read back".to_owned(),
            ));
        }
        self.decoder.read_len(&self.settings)
    }

    /// Reads one value whose type is either declared (`Some`) or announced
    /// by a tag on the wire (`None`).
    fn read_tagged_value(
        &mut self,
        declared: Option<core::any::TypeId>,
        slot: &str,
    ) -> WireResult<Box<dyn Reflect>> {
        let type_id = match declared {
            Some(type_id) => type_id,
            None => {
                let tag = self.decoder.read_str(&self.settings)?;
                let registry = self.registry.read();
                let resolved = resolve_tag(&registry, &tag, &self.settings)?;
                drop(registry);
                resolved
            }
        };
        let mut value = self.activate(type_id, slot)?;
        self.read_value(&mut *value)?;
        Ok(value)
    }

    fn read_option(&mut self, option: &mut dyn Optional) -> WireResult<()> {
        if !self.decoder.read_bool()? {
            option.clear();
            return Ok(());
        }
        self.ctx.enter();
        let result = self.read_option_inner(option);
        self.ctx.exit();
        result
    }

    fn read_option_inner(&mut self, option: &mut dyn Optional) -> WireResult<()> {
        if let Some(inner) = option.value_mut() {
            return self.read_value(inner);
        }
        let inner_ty = option
            .reflect_type_info()
            .as_option()
            .map(|info| info.some().id())
            .ok_or_else(|| {
                WireError::MemberAccess(format!(
                    "`{}` is Option kind but carries no option info",
                    option.reflect_type_path()
                ))
            })?;
        let mut inner = self.activate(inner_ty, "option inner")?;
        self.read_value(&mut *inner)?;
        option.set_value(inner).map_err(|inner| {
            WireError::MemberAccess(format!(
                "`{}` rejected an inner value of type `{}`",
                option.reflect_type_path(),
                inner.reflect_type_path()
            ))
        })
    }

    fn read_shared(&mut self, node: &mut dyn SharedNode) -> WireResult<()> {
        if self.settings.use_object_reference {
            if self.decoder.read_bool()? {
                let index = self.decoder.read_len(&self.settings)?;
                let resolved = self.refs.resolve(index)?;
                if !node.adopt(resolved) {
                    return Err(WireError::Format(format!(
                        "back-reference {index} resolves to `{}`, expected `{}`",
                        resolved.reflect_type_path(),
                        node.reflect_type_path()
                    )));
                }
                return Ok(());
            }
            // Recorded before the content so a cycle pointing back here
            // finds its handle.
            self.refs.record(node.clone_handle());
        }
        self.ctx.enter();
        let result = node.with_target_mut(&mut |target| self.read_value(target));
        self.ctx.exit();
        result
    }

    fn read_fallback(&mut self, target: &mut dyn Reflect) -> WireResult<()> {
        let Some(fallback) = self.fallback.as_deref() else {
            return Err(WireError::UnsupportedValue(format!(
                "no traversal path covers `{}` and no fallback codec is installed",
                target.reflect_type_path()
            )));
        };
        trace!(ty = target.reflect_type_path(), "fallback decode");
        let blob = self.decoder.read_bytes(&self.settings)?;
        let registry = self.registry.read();
        fallback.decode(target, &blob, &registry)
    }

    // ------------------------------------------------------------------
    // Hook dispatch: installation order, first non-Continue action wins.

    fn run_before_object(&mut self, target: &dyn Reflect) -> ReadHookAction {
        for i in 0..self.hooks.len() {
            if self.hooks[i].before_object(target, &self.ctx) == ReadHookAction::Skip {
                return ReadHookAction::Skip;
            }
        }
        ReadHookAction::Continue
    }

    fn run_after_object(&mut self, target: &dyn Reflect) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_object(target, &self.ctx);
        }
    }

    fn run_before_member(&mut self, name: &str) -> ReadHookAction {
        for i in 0..self.hooks.len() {
            if self.hooks[i].before_member(name, &self.ctx) == ReadHookAction::Skip {
                return ReadHookAction::Skip;
            }
        }
        ReadHookAction::Continue
    }

    fn run_after_member(&mut self, name: &str) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_member(name, &self.ctx);
        }
    }

    fn run_before_element(&mut self, index: usize) -> ReadHookAction {
        for i in 0..self.hooks.len() {
            if self.hooks[i].before_element(index, &self.ctx) == ReadHookAction::Skip {
                return ReadHookAction::Skip;
            }
        }
        ReadHookAction::Continue
    }

    fn run_after_element(&mut self, index: usize) {
        for i in 0..self.hooks.len() {
            self.hooks[i].after_element(index, &self.ctx);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use crate::Reflect as _;
    use crate::derive::Reflect;
    use crate::ops::{Struct, VarList, VarMap};
    use crate::registry::TypeRegistryArc;
    use crate::wire::{
        BinaryDecoder, BinaryEncoder, BytesEncoding, DateEncoding, GraphReader, GraphWriter,
        MemberSelect, SerdeFallback, Settings, SizeWidth, SkipDefaultMembers, SkipMembers,
        TextDecoder, TextEncoder, WireError,
    };
    use crate::{Bytes, Decimal, Shared};

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Sample {
        sequence: i64,
        label: String,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Telemetry {
        name: String,
        samples: Vec<Sample>,
        tags: HashMap<String, i32>,
        window: Option<u32>,
    }

    #[derive(Reflect, Default)]
    struct Pair {
        left: Shared<i32>,
        right: Shared<i32>,
    }

    #[derive(Reflect, Default)]
    struct Record {
        label: String,
        next: Option<Shared<Record>>,
    }

    fn encode_binary(
        value: &dyn crate::Reflect,
        registry: &TypeRegistryArc,
        settings: Settings,
    ) -> Vec<u8> {
        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry.clone());
        writer.set_settings(settings).unwrap();
        writer.write(value).unwrap();
        writer.into_inner().into_inner()
    }

    fn roundtrip_binary_with<T: crate::Reflect + Default>(
        value: &T,
        registry: &TypeRegistryArc,
        settings: Settings,
    ) -> T {
        let bytes = encode_binary(value, registry, settings.clone());
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry.clone());
        reader.set_settings(settings).unwrap();
        reader.read().unwrap()
    }

    fn roundtrip_binary<T: crate::Reflect + Default>(value: &T, registry: &TypeRegistryArc) -> T {
        roundtrip_binary_with(value, registry, Settings::default())
    }

    fn roundtrip_text_with<T: crate::Reflect + Default>(
        value: &T,
        registry: &TypeRegistryArc,
        settings: Settings,
    ) -> T {
        let mut writer = GraphWriter::new(TextEncoder::new(Vec::new()), registry.clone());
        writer.set_settings(settings.clone()).unwrap();
        writer.write(value).unwrap();
        let bytes = writer.into_inner().into_inner();
        let mut reader = GraphReader::new(TextDecoder::new(bytes.as_slice()), registry.clone());
        reader.set_settings(settings).unwrap();
        reader.read().unwrap()
    }

    #[test]
    fn derived_struct_roundtrips_in_binary() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        let sample = Sample {
            sequence: -42,
            label: String::from("calibration"),
        };
        assert_eq!(roundtrip_binary(&sample, &registry), sample);
    }

    #[test]
    fn derived_struct_roundtrips_in_text() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        let sample = Sample {
            sequence: 7,
            label: String::from("two\nlines"),
        };
        assert_eq!(
            roundtrip_text_with(&sample, &registry, Settings::default()),
            sample
        );
    }

    #[test]
    fn nested_composites_roundtrip() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Telemetry>();
        let telemetry = Telemetry {
            name: String::from("pressure"),
            samples: vec![
                Sample {
                    sequence: 1,
                    label: String::from("a"),
                },
                Sample {
                    sequence: 2,
                    label: String::from("b"),
                },
            ],
            tags: HashMap::from([(String::from("unit"), 3), (String::from("rate"), 50)]),
            window: Some(16),
        };
        assert_eq!(roundtrip_binary(&telemetry, &registry), telemetry);
        assert_eq!(
            roundtrip_text_with(&telemetry, &registry, Settings::default()),
            telemetry
        );
    }

    #[test]
    fn empty_and_singleton_collections_roundtrip() {
        let registry = TypeRegistryArc::default();
        assert_eq!(
            roundtrip_binary(&Vec::<i32>::new(), &registry),
            Vec::<i32>::new()
        );
        assert_eq!(roundtrip_binary(&vec![5_i32], &registry), vec![5]);
        assert_eq!(
            roundtrip_binary(&HashMap::<String, i32>::new(), &registry),
            HashMap::new()
        );
    }

    #[test]
    fn wire_value_types_roundtrip() {
        let registry = TypeRegistryArc::default();
        let bytes = Bytes::from(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(roundtrip_binary(&bytes, &registry), bytes);

        let decimal: Decimal = "-123.45".parse().unwrap();
        assert_eq!(roundtrip_binary(&decimal, &registry), decimal);

        let uuid = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(roundtrip_binary(&uuid, &registry), uuid);
        assert_eq!(
            roundtrip_text_with(&uuid, &registry, Settings::default()),
            uuid
        );

        let instant = chrono::DateTime::from_timestamp(1_700_000_000, 123_400_000).unwrap();
        assert_eq!(roundtrip_binary(&instant, &registry), instant);
    }

    #[test]
    fn date_encodings_roundtrip() {
        let registry = TypeRegistryArc::default();
        let instant = chrono::DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        for encoding in [DateEncoding::Ticks, DateEncoding::MillisecondsSinceEpoch] {
            let settings = Settings::default().with_date_encoding(encoding);
            assert_eq!(roundtrip_binary_with(&instant, &registry, settings), instant);
        }
        let whole = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let seconds = Settings::default().with_date_encoding(DateEncoding::SecondsSinceEpoch);
        assert_eq!(roundtrip_binary_with(&whole, &registry, seconds), whole);
    }

    #[test]
    fn text_backend_renders_bytes_per_encoding() {
        let registry = TypeRegistryArc::default();
        let settings = Settings::default().with_bytes_encoding(BytesEncoding::Hex);
        let bytes = Bytes::from(vec![0x01, 0x02, 0x03]);

        let mut writer = GraphWriter::new(TextEncoder::new(Vec::new()), registry.clone());
        writer.set_settings(settings.clone()).unwrap();
        writer.write(&bytes).unwrap();
        let out = writer.into_inner().into_inner();
        assert_eq!(out, b"010203\n");

        let mut reader = GraphReader::new(TextDecoder::new(out.as_slice()), registry);
        reader.set_settings(settings).unwrap();
        assert_eq!(reader.read::<Bytes>().unwrap(), bytes);
    }

    #[test]
    fn narrow_size_width_roundtrips() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        let sample = Sample {
            sequence: 1,
            label: String::from("short"),
        };
        let settings = Settings::default().with_size_width(SizeWidth::U16);
        assert_eq!(roundtrip_binary_with(&sample, &registry, settings), sample);
    }

    #[test]
    fn options_roundtrip_at_top_level() {
        let registry = TypeRegistryArc::default();
        assert_eq!(roundtrip_binary(&None::<i32>, &registry), None);
        assert_eq!(roundtrip_binary(&Some(19_i32), &registry), Some(19));
    }

    #[test]
    fn var_list_items_carry_type_tags() {
        let registry = TypeRegistryArc::default();
        let mut list = VarList::new();
        list.push(41_i32);
        list.push(String::from("tagged"));
        list.push(true);
        let back = roundtrip_binary(&list, &registry);
        assert_eq!(list.as_reflect().reflect_partial_eq(back.as_reflect()), Some(true));
    }

    #[test]
    fn var_map_entries_carry_type_tags() {
        let registry = TypeRegistryArc::default();
        let mut map = VarMap::new();
        map.insert(String::from("threshold"), 5_i32);
        map.insert(7_i64, String::from("seven"));
        let back = roundtrip_binary(&map, &registry);
        assert_eq!(map.as_reflect().reflect_partial_eq(back.as_reflect()), Some(true));
    }

    #[test]
    fn full_path_tags_resolve() {
        let registry = TypeRegistryArc::default();
        let mut list = VarList::new();
        list.push(3_i32);
        list.push(String::from("full"));
        let settings = Settings::default().with_type_full_name(true);
        let back = roundtrip_binary_with(&list, &registry, settings);
        assert_eq!(list.as_reflect().reflect_partial_eq(back.as_reflect()), Some(true));
    }

    #[test]
    fn shared_handles_keep_their_aliasing() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Pair>();
        let handle = Shared::new(4_i32);
        let pair = Pair {
            left: handle.clone(),
            right: handle,
        };
        let back = roundtrip_binary(&pair, &registry);
        assert!(back.left.ptr_eq(&back.right));
        *back.left.write() = 9;
        assert_eq!(*back.right.read(), 9);
    }

    #[test]
    fn untracked_handles_duplicate_their_targets() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Pair>();
        let handle = Shared::new(4_i32);
        let pair = Pair {
            left: handle.clone(),
            right: handle,
        };
        let settings = Settings::default().with_object_reference(false);
        let back = roundtrip_binary_with(&pair, &registry, settings);
        assert!(!back.left.ptr_eq(&back.right));
        assert_eq!(*back.left.read(), 4);
        assert_eq!(*back.right.read(), 4);
    }

    #[test]
    fn cyclic_graphs_roundtrip() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Record>();

        let first = Shared::new(Record {
            label: String::from("first"),
            next: None,
        });
        let second = Shared::new(Record {
            label: String::from("second"),
            next: Some(first.clone()),
        });
        first.write().next = Some(second.clone());

        let back: Shared<Record> = roundtrip_binary(&first, &registry);
        assert_eq!(back.read().label, "first");
        let second_back = back.read().next.as_ref().unwrap().clone();
        assert_eq!(second_back.read().label, "second");
        assert!(second_back.read().next.as_ref().unwrap().ptr_eq(&back));
    }

    #[derive(Reflect, Default)]
    struct Person {
        id: i32,
        name: String,
        tags: Vec<String>,
        this: Option<Shared<Person>>,
    }

    #[test]
    fn self_referencing_records_decode_to_one_instance() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Person>();

        let person = Shared::new(Person {
            id: 7,
            name: String::from("Ann"),
            tags: vec![String::from("a"), String::from("b")],
            this: None,
        });
        person.write().this = Some(person.clone());

        let back: Shared<Person> = roundtrip_binary(&person, &registry);
        let inner = back.read();
        assert_eq!(inner.id, 7);
        assert_eq!(inner.name, "Ann");
        assert_eq!(inner.tags, ["a", "b"]);
        assert!(inner.this.as_ref().unwrap().ptr_eq(&back));
    }

    #[test]
    fn skip_members_filters_on_both_sides() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        let sample = Sample {
            sequence: 11,
            label: String::from("kept"),
        };

        // Write side: the member never reaches the wire.
        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry.clone());
        writer.add_hook(Box::new(SkipMembers::new(["sequence"])));
        writer.write(&sample).unwrap();
        let bytes = writer.into_inner().into_inner();
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry.clone());
        let back: Sample = reader.read().unwrap();
        assert_eq!(back.sequence, 0);
        assert_eq!(back.label, "kept");

        // Read side: the member is consumed but discarded.
        let bytes = encode_binary(&sample, &registry, Settings::default());
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry.clone());
        reader.add_hook(Box::new(SkipMembers::new(["label"])));
        let back: Sample = reader.read().unwrap();
        assert_eq!(back.sequence, 11);
        assert_eq!(back.label, "");
    }

    #[test]
    fn default_members_stay_off_the_wire() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        let sample = Sample {
            sequence: 0,
            label: String::from("x"),
        };

        let full = encode_binary(&sample, &registry, Settings::default());
        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry.clone());
        writer.add_hook(Box::new(SkipDefaultMembers::new(registry.clone())));
        writer.write(&sample).unwrap();
        let filtered = writer.into_inner().into_inner();
        assert!(filtered.len() < full.len());

        let mut reader = GraphReader::new(BinaryDecoder::new(filtered.as_slice()), registry);
        assert_eq!(reader.read::<Sample>().unwrap(), sample);
    }

    #[test]
    fn member_select_replaces_the_member_list() {
        struct TailAndHead;

        impl MemberSelect for TailAndHead {
            fn members(&self, value: &dyn Struct) -> Vec<usize> {
                vec![value.field_len() - 1, 0]
            }
        }

        let registry = TypeRegistryArc::default();
        registry.write().register::<Telemetry>();
        let telemetry = Telemetry {
            name: String::from("selected"),
            samples: vec![Sample {
                sequence: 3,
                label: String::from("dropped"),
            }],
            tags: HashMap::new(),
            window: Some(2),
        };

        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry.clone());
        writer.set_member_select(Box::new(TailAndHead));
        writer.write(&telemetry).unwrap();
        let bytes = writer.into_inner().into_inner();

        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry);
        let back: Telemetry = reader.read().unwrap();
        assert_eq!(back.name, "selected");
        assert_eq!(back.window, Some(2));
        assert!(back.samples.is_empty());
    }

    #[derive(Reflect, Default, Debug, PartialEq, Serialize, Deserialize)]
    #[reflect(opaque, serialize, deserialize)]
    struct Calibration {
        offsets: Vec<i32>,
        comment: String,
    }

    #[test]
    fn serde_fallback_carries_opaque_values() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Calibration>();
        let calibration = Calibration {
            offsets: vec![-1, 0, 4],
            comment: String::from("bench 3"),
        };

        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry.clone());
        writer.set_fallback(Box::new(SerdeFallback::new()));
        writer.write(&calibration).unwrap();
        let bytes = writer.into_inner().into_inner();

        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry);
        reader.set_fallback(Box::new(SerdeFallback::new()));
        assert_eq!(reader.read::<Calibration>().unwrap(), calibration);
    }

    #[test]
    fn opaque_values_without_a_fallback_fail() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Calibration>();
        let mut writer = GraphWriter::new(BinaryEncoder::new(Vec::new()), registry);
        let err = writer.write(&Calibration::default()).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedValue(_)));
    }

    #[test]
    fn settings_freeze_on_first_read() {
        let registry = TypeRegistryArc::default();
        let bytes = encode_binary(&5_i64, &registry, Settings::default());
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry);
        assert_eq!(reader.read::<i64>().unwrap(), 5);
        assert!(matches!(
            reader.set_settings(Settings::default()),
            Err(WireError::SettingsFrozen)
        ));
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Solo {
        value: i64,
    }

    #[test]
    fn truncated_members_report_their_name() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Solo>();
        let mut bytes = encode_binary(&Solo { value: 77 }, &registry, Settings::default());
        bytes.truncate(bytes.len() - 5);

        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry);
        match reader.read::<Solo>().unwrap_err() {
            WireError::Member { name, .. } => assert_eq!(name, "value"),
            other => panic!("expected a member error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_member_names_are_format_errors() {
        let registry = TypeRegistryArc::default();
        registry.write().register::<Sample>();
        registry.write().register::<Solo>();
        let sample = Sample {
            sequence: 1,
            label: String::from("mismatch"),
        };
        let bytes = encode_binary(&sample, &registry, Settings::default());
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), registry);
        let err = reader.read::<Solo>().unwrap_err();
        assert!(matches!(err, WireError::Format(_)));
    }

    #[test]
    fn unregistered_tags_are_type_resolution_errors() {
        let writer_registry = TypeRegistryArc::default();
        writer_registry.write().register::<Sample>();
        let mut list = VarList::new();
        list.push(Sample::default());
        let bytes = encode_binary(&list, &writer_registry, Settings::default());

        let reader_registry = TypeRegistryArc::default();
        let mut reader = GraphReader::new(BinaryDecoder::new(bytes.as_slice()), reader_registry);
        let err = reader.read::<VarList>().unwrap_err();
        assert!(matches!(err, WireError::TypeResolution(_)));
    }
}
