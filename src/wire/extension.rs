//! Extension values: opaque leaves that are not primitives but still have a
//! first-class wire form.
//!
//! Extensions are resolved by [`TypeId`] after the primitive table and
//! before any structural classification, so an extension type never reaches
//! the fallback codec.

use core::any::TypeId;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use uuid::Uuid;

use crate::TypeHandle;
use crate::Reflect;
use crate::registry::TypeRegistry;
use crate::wire::codec::{Decode, Encode};
use crate::wire::{Settings, WireError, WireResult};

/// The closed set of extension-typed leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExtensionKind {
    Uuid,
    IpAddr,
    SocketAddr,
    TypeHandle,
}

impl ExtensionKind {
    /// Classifies a [`TypeId`], returning `None` for non-extension types.
    pub(crate) fn resolve(type_id: TypeId) -> Option<Self> {
        if type_id == TypeId::of::<Uuid>() {
            Some(Self::Uuid)
        } else if type_id == TypeId::of::<IpAddr>() {
            Some(Self::IpAddr)
        } else if type_id == TypeId::of::<SocketAddr>() {
            Some(Self::SocketAddr)
        } else if type_id == TypeId::of::<TypeHandle>() {
            Some(Self::TypeHandle)
        } else {
            None
        }
    }

    pub(crate) fn write<E: Encode + ?Sized>(
        self,
        encoder: &mut E,
        value: &dyn Reflect,
        settings: &Settings,
        registry: &TypeRegistry,
    ) -> WireResult<()> {
        match self {
            Self::Uuid => {
                let v = downcast::<Uuid>(value)?;
                encoder.write_uuid(*v)
            }
            Self::IpAddr => {
                let v = downcast::<IpAddr>(value)?;
                write_ip(encoder, *v, settings)
            }
            Self::SocketAddr => {
                let v = downcast::<SocketAddr>(value)?;
                write_ip(encoder, v.ip(), settings)?;
                encoder.write_i32(i32::from(v.port()))
            }
            Self::TypeHandle => {
                let v = downcast::<TypeHandle>(value)?;
                let meta = registry.get(v.id()).ok_or_else(|| {
                    WireError::TypeResolution(
                        "type handle points at an unregistered type".to_owned(),
                    )
                })?;
                let tag = if settings.use_type_full_name {
                    meta.type_path()
                } else {
                    meta.type_name()
                };
                encoder.write_str(tag, settings)
            }
        }
    }

    pub(crate) fn read<D: Decode + ?Sized>(
        self,
        decoder: &mut D,
        target: &mut dyn Reflect,
        settings: &Settings,
        registry: &TypeRegistry,
    ) -> WireResult<()> {
        let value: Box<dyn Reflect> = match self {
            Self::Uuid => Box::new(decoder.read_uuid()?),
            Self::IpAddr => Box::new(read_ip(decoder, settings)?),
            Self::SocketAddr => {
                let ip = read_ip(decoder, settings)?;
                let port = decoder.read_i32()?;
                let port = u16::try_from(port).map_err(|_| {
                    WireError::Format(format!("port {port} out of range"))
                })?;
                Box::new(SocketAddr::new(ip, port))
            }
            Self::TypeHandle => {
                let tag = decoder.read_str(settings)?;
                Box::new(TypeHandle::from_id(resolve_tag(registry, &tag, settings)?))
            }
        };
        target.set(value).map_err(|value| {
            WireError::Format(format!(
                "extension value of type `{}` does not fit a `{}` slot",
                value.reflect_type_path(),
                target.reflect_type_path(),
            ))
        })
    }
}

fn downcast<T: Reflect>(value: &dyn Reflect) -> WireResult<&T> {
    value.downcast_ref::<T>().ok_or_else(|| {
        WireError::Format(format!(
            "value of type `{}` reached the wrong extension path",
            value.reflect_type_path()
        ))
    })
}

// Addresses travel as their raw octets; the octet count picks the family
// back out on the read side.
fn write_ip<E: Encode + ?Sized>(
    encoder: &mut E,
    addr: IpAddr,
    settings: &Settings,
) -> WireResult<()> {
    match addr {
        IpAddr::V4(v4) => encoder.write_bytes(&v4.octets(), settings),
        IpAddr::V6(v6) => encoder.write_bytes(&v6.octets(), settings),
    }
}

fn read_ip<D: Decode + ?Sized>(decoder: &mut D, settings: &Settings) -> WireResult<IpAddr> {
    let bytes = decoder.read_bytes(settings)?;
    match bytes.len() {
        4 => {
            let mut octets = [0_u8; 4];
            octets.copy_from_slice(&bytes);
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let mut octets = [0_u8; 16];
            octets.copy_from_slice(&bytes);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        other => Err(WireError::Format(format!(
            "address of {other} octets is neither IPv4 nor IPv6"
        ))),
    }
}

/// Resolves a wire type tag against the registry.
pub(crate) fn resolve_tag(
    registry: &TypeRegistry,
    tag: &str,
    settings: &Settings,
) -> WireResult<TypeId> {
    let meta = if settings.use_type_full_name {
        registry.get_with_type_path(tag)
    } else {
        if registry.is_ambiguous(tag) {
            return Err(WireError::TypeResolution(format!(
                "short name `{tag}` matches more than one registered type"
            )));
        }
        registry.get_with_type_name(tag)
    };
    meta.map(|meta| meta.type_id())
        .ok_or_else(|| WireError::TypeResolution(format!("no registered type matches `{tag}`")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::wire::codec::{BinaryDecoder, BinaryEncoder};

    #[test]
    fn only_the_closed_set_resolves() {
        assert_eq!(
            ExtensionKind::resolve(TypeId::of::<Uuid>()),
            Some(ExtensionKind::Uuid)
        );
        assert_eq!(ExtensionKind::resolve(TypeId::of::<String>()), None);
    }

    #[test]
    fn socket_addrs_round_trip_both_families() {
        let settings = Settings::default();
        let registry = TypeRegistry::new();
        for addr in ["127.0.0.1:9000", "[2001:db8::1]:443"] {
            let value: SocketAddr = addr.parse().unwrap();
            let mut encoder = BinaryEncoder::new(Vec::new());
            ExtensionKind::SocketAddr
                .write(&mut encoder, value.as_reflect(), &settings, &registry)
                .unwrap();
            let mut decoder = BinaryDecoder::new(Cursor::new(encoder.into_inner()));
            let mut target: SocketAddr = "0.0.0.0:0".parse().unwrap();
            ExtensionKind::SocketAddr
                .read(&mut decoder, target.as_reflect_mut(), &settings, &registry)
                .unwrap();
            assert_eq!(target, value);
        }
    }

    #[test]
    fn unknown_type_tags_fail_resolution() {
        let registry = TypeRegistry::new();
        let settings = Settings::default();
        assert!(matches!(
            resolve_tag(&registry, "NoSuchType", &settings),
            Err(WireError::TypeResolution(_))
        ));
    }

    #[test]
    fn type_handles_travel_by_name() {
        let settings = Settings::default();
        let registry = TypeRegistry::new();
        let handle = TypeHandle::of::<String>();
        let mut encoder = BinaryEncoder::new(Vec::new());
        ExtensionKind::TypeHandle
            .write(&mut encoder, handle.as_reflect(), &settings, &registry)
            .unwrap();
        let mut decoder = BinaryDecoder::new(Cursor::new(encoder.into_inner()));
        let mut target = TypeHandle::default();
        ExtensionKind::TypeHandle
            .read(&mut decoder, target.as_reflect_mut(), &settings, &registry)
            .unwrap();
        assert_eq!(target, handle);
    }
}
