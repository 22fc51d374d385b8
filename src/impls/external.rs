//! Reflection support for foreign value types carried as opaque leaves.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::impls::impl_reflect_opaque;

impl_reflect_opaque!(
    DateTime<Utc>,
    path: "chrono::DateTime<chrono::Utc>",
    name: "DateTime<Utc>"
);

impl_reflect_opaque!(Uuid, path: "uuid::Uuid", name: "Uuid");

impl_reflect_opaque!(
    IpAddr,
    path: "core::net::IpAddr",
    name: "IpAddr",
    default: IpAddr::V4(Ipv4Addr::UNSPECIFIED)
);

impl_reflect_opaque!(
    SocketAddr,
    path: "core::net::SocketAddr",
    name: "SocketAddr",
    default: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;

    #[test]
    fn socket_addr_reflects_by_value() {
        let a: SocketAddr = "10.0.0.1:8080".parse().unwrap();
        let b: SocketAddr = "10.0.0.1:8080".parse().unwrap();
        assert_eq!(a.as_reflect().reflect_partial_eq(&b), Some(true));
    }

    #[test]
    fn datetime_type_name_is_short() {
        use crate::info::TypePath;
        assert_eq!(<DateTime<Utc>>::type_name(), "DateTime<Utc>");
    }
}
