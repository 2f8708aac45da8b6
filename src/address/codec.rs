//! Translation between [`Address`] and native socket addresses.
//!
//! All native traffic passes through these two functions; no other path
//! builds a native address from a neutral one or the reverse.

use std::net::{Ipv4Addr, SocketAddrV4, SocketAddrV6};

use socket2::SockAddr;

use super::{Address, AddressFamily, HostAddress};
use crate::core::{PlatformError, PlatformResult};

/// Decode a native address.
///
/// IPv4 hosts are mapped into the 128-bit space with a zero scope id. IPv6
/// hosts keep their scope id. Any other native family fails with
/// [`PlatformError::UnrecognizedFamily`].
pub fn decode(native: &SockAddr) -> PlatformResult<Address> {
    if let Some(v4) = native.as_socket_ipv4() {
        return Ok(Address {
            host: HostAddress::map_v4(*v4.ip()),
            scope_id: 0,
            port: v4.port(),
        });
    }

    if let Some(v6) = native.as_socket_ipv6() {
        return Ok(Address {
            host: HostAddress::from(*v6.ip()),
            scope_id: v6.scope_id(),
            port: v6.port(),
        });
    }

    Err(PlatformError::UnrecognizedFamily)
}

/// Encode an address for a socket of `family`.
///
/// IPv4 encoding accepts mapped hosts and the wildcard; an IPv6-only host
/// fails with [`PlatformError::FamilyMismatch`]. IPv6 encoding always
/// succeeds and carries the full host, scope id and port.
pub fn encode(address: &Address, family: AddressFamily) -> PlatformResult<SockAddr> {
    match family {
        AddressFamily::Ipv4 => {
            let ip = match address.host.to_v4() {
                Some(v4) => v4,
                None if address.host.is_any() => Ipv4Addr::UNSPECIFIED,
                None => return Err(PlatformError::FamilyMismatch { family }),
            };
            Ok(SockAddr::from(SocketAddrV4::new(ip, address.port)))
        }
        AddressFamily::Ipv6 => Ok(SockAddr::from(SocketAddrV6::new(
            address.host.to_ipv6(),
            address.port,
            0,
            address.scope_id,
        ))),
    }
}
