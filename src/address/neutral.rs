//! The neutral address record and its host value.

use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;

use socket2::Domain;

use crate::core::constants::{ADDRESS_WIRE_SIZE, HOST_ADDRESS_SIZE, IPV4_MAPPED_PREFIX, PORT_ANY};

/// Address family of a socket or host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Socket domain for this family.
    pub(crate) fn domain(self) -> Domain {
        match self {
            AddressFamily::Ipv4 => Domain::IPV4,
            AddressFamily::Ipv6 => Domain::IPV6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("IPv4"),
            AddressFamily::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// Canonical 128-bit host value, in network byte order.
///
/// IPv4 hosts live in the `::ffff:0:0/96` block. [`HostAddress::ANY`] is
/// family-polymorphic: it encodes as `0.0.0.0` for IPv4 sockets and `::` for
/// IPv6 sockets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HostAddress([u8; HOST_ADDRESS_SIZE]);

impl HostAddress {
    /// Wildcard host (`::`).
    pub const ANY: Self = Self([0; HOST_ADDRESS_SIZE]);

    /// IPv6 loopback (`::1`).
    pub const LOOPBACK_V6: Self = Self([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

    /// IPv4 loopback (`127.0.0.1`, mapped).
    pub const LOOPBACK_V4: Self = Self::map_v4(Ipv4Addr::LOCALHOST);

    /// IPv4 limited broadcast (`255.255.255.255`, mapped).
    pub const BROADCAST: Self = Self::map_v4(Ipv4Addr::BROADCAST);

    /// Create from raw octets.
    pub const fn from_octets(octets: [u8; HOST_ADDRESS_SIZE]) -> Self {
        Self(octets)
    }

    /// Raw octets in network byte order.
    pub const fn octets(&self) -> [u8; HOST_ADDRESS_SIZE] {
        self.0
    }

    /// Map an IPv4 address into the 128-bit space.
    pub const fn map_v4(addr: Ipv4Addr) -> Self {
        let [a, b, c, d] = addr.octets();
        Self([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d])
    }

    /// The IPv4 address, if this host is IPv4-mapped.
    pub fn to_v4(&self) -> Option<Ipv4Addr> {
        if self.0[..12] == IPV4_MAPPED_PREFIX {
            Some(Ipv4Addr::new(self.0[12], self.0[13], self.0[14], self.0[15]))
        } else {
            None
        }
    }

    /// The full 128-bit value as an IPv6 address.
    pub fn to_ipv6(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.0)
    }

    /// The host as a std address, IPv4 when mapped.
    pub fn to_ip(&self) -> IpAddr {
        match self.to_v4() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(self.to_ipv6()),
        }
    }

    /// Family implied by the host value.
    pub fn family(&self) -> AddressFamily {
        if self.to_v4().is_some() {
            AddressFamily::Ipv4
        } else {
            AddressFamily::Ipv6
        }
    }

    /// Check if this is the wildcard host.
    pub fn is_any(&self) -> bool {
        *self == Self::ANY
    }
}

impl From<Ipv4Addr> for HostAddress {
    fn from(addr: Ipv4Addr) -> Self {
        Self::map_v4(addr)
    }
}

impl From<Ipv6Addr> for HostAddress {
    fn from(addr: Ipv6Addr) -> Self {
        Self(addr.octets())
    }
}

impl From<IpAddr> for HostAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

/// Parses a numeric literal only; names go through [`resolve_host`](super::resolve_host).
impl FromStr for HostAddress {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>().map(Self::from)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_ip(), f)
    }
}

impl fmt::Debug for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostAddress({})", self)
    }
}

/// Neutral address record exchanged with the transport engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address {
    /// Canonical host value.
    pub host: HostAddress,
    /// IPv6 scope id (zero for IPv4 hosts).
    pub scope_id: u32,
    /// Port in host byte order.
    pub port: u16,
}

impl Address {
    /// Create an address with no scope id.
    pub fn new(host: impl Into<HostAddress>, port: u16) -> Self {
        Self {
            host: host.into(),
            scope_id: 0,
            port,
        }
    }

    /// Wildcard address on `port`.
    pub fn any(port: u16) -> Self {
        Self::new(HostAddress::ANY, port)
    }

    /// Set the IPv6 scope id.
    pub fn with_scope_id(mut self, scope_id: u32) -> Self {
        self.scope_id = scope_id;
        self
    }

    /// Family implied by the host value.
    pub fn family(&self) -> AddressFamily {
        self.host.family()
    }

    /// Check if the port lets the OS choose.
    pub fn has_any_port(&self) -> bool {
        self.port == PORT_ANY
    }

    /// Serialize to the fixed boundary layout.
    pub fn to_bytes(&self) -> [u8; ADDRESS_WIRE_SIZE] {
        let mut out = [0u8; ADDRESS_WIRE_SIZE];
        out[..16].copy_from_slice(&self.host.octets());
        out[16..20].copy_from_slice(&self.scope_id.to_be_bytes());
        out[20..22].copy_from_slice(&self.port.to_be_bytes());
        out
    }

    /// Deserialize from the fixed boundary layout.
    pub fn from_bytes(bytes: &[u8; ADDRESS_WIRE_SIZE]) -> Self {
        let mut host = [0u8; HOST_ADDRESS_SIZE];
        host.copy_from_slice(&bytes[..16]);
        Self {
            host: HostAddress::from_octets(host),
            scope_id: u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            port: u16::from_be_bytes([bytes[20], bytes[21]]),
        }
    }

    /// Convert to a std socket address, IPv4 when the host is mapped.
    pub fn to_socket_addr(&self) -> SocketAddr {
        match self.host.to_v4() {
            Some(v4) => SocketAddr::V4(SocketAddrV4::new(v4, self.port)),
            None => SocketAddr::V6(SocketAddrV6::new(
                self.host.to_ipv6(),
                self.port,
                0,
                self.scope_id,
            )),
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Self::new(*v4.ip(), v4.port()),
            SocketAddr::V6(v6) => Self::new(*v6.ip(), v6.port()).with_scope_id(v6.scope_id()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_socket_addr(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_v4() {
        let host = HostAddress::map_v4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(
            hex::encode(host.octets()),
            "00000000000000000000ffffc0a80114"
        );
        assert_eq!(host.to_v4(), Some(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(host.family(), AddressFamily::Ipv4);
    }

    #[test]
    fn test_v4_and_mapped_v6_are_equal() {
        let v4: HostAddress = Ipv4Addr::new(10, 0, 0, 1).into();
        let mapped: HostAddress = "::ffff:10.0.0.1".parse::<Ipv6Addr>().unwrap().into();
        assert_eq!(v4, mapped);
        assert_eq!(mapped.family(), AddressFamily::Ipv4);
    }

    #[test]
    fn test_constants() {
        assert!(HostAddress::ANY.is_any());
        assert_eq!(HostAddress::ANY.family(), AddressFamily::Ipv6);
        assert_eq!(HostAddress::LOOPBACK_V6.to_ipv6(), Ipv6Addr::LOCALHOST);
        assert_eq!(HostAddress::LOOPBACK_V4.to_v4(), Some(Ipv4Addr::LOCALHOST));
        assert_eq!(HostAddress::BROADCAST.to_v4(), Some(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_parse() {
        let v4: HostAddress = "127.0.0.1".parse().unwrap();
        assert_eq!(v4, HostAddress::LOOPBACK_V4);

        let v6: HostAddress = "::1".parse().unwrap();
        assert_eq!(v6, HostAddress::LOOPBACK_V6);

        assert!("localhost".parse::<HostAddress>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(HostAddress::LOOPBACK_V4.to_string(), "127.0.0.1");
        assert_eq!(HostAddress::LOOPBACK_V6.to_string(), "::1");

        let addr = Address::new(Ipv4Addr::new(10, 1, 2, 3), 4433);
        assert_eq!(addr.to_string(), "10.1.2.3:4433");

        let scoped = Address::new("fe80::1".parse::<Ipv6Addr>().unwrap(), 80).with_scope_id(2);
        assert_eq!(scoped.to_string(), "[fe80::1%2]:80");
    }

    #[test]
    fn test_wire_layout() {
        let addr = Address::new(Ipv4Addr::new(127, 0, 0, 1), 0x1f90).with_scope_id(0);
        assert_eq!(
            hex::encode(addr.to_bytes()),
            "00000000000000000000ffff7f000001000000001f90"
        );

        let scoped = Address::new(Ipv6Addr::LOCALHOST, 443).with_scope_id(0x0102_0304);
        let bytes = scoped.to_bytes();
        assert_eq!(hex::encode(&bytes[16..]), "0102030401bb");
        assert_eq!(Address::from_bytes(&bytes), scoped);
    }

    #[test]
    fn test_socket_addr_conversion() {
        let std_v4: SocketAddr = "192.0.2.7:9000".parse().unwrap();
        let addr = Address::from(std_v4);
        assert_eq!(addr.family(), AddressFamily::Ipv4);
        assert_eq!(addr.scope_id, 0);
        assert_eq!(addr.to_socket_addr(), std_v4);

        let std_v6 = SocketAddr::V6(SocketAddrV6::new(
            "fe80::abcd".parse().unwrap(),
            65535,
            0,
            7,
        ));
        let addr = Address::from(std_v6);
        assert_eq!(addr.scope_id, 7);
        assert_eq!(addr.port, 65535);
        assert_eq!(addr.to_socket_addr(), std_v6);
    }

    #[test]
    fn test_any() {
        let addr = Address::any(PORT_ANY);
        assert!(addr.host.is_any());
        assert!(addr.has_any_port());
        assert_eq!(addr, Address::default());
    }
}
