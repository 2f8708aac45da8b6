//! Fixed values of the platform layer.
//!
//! The address layout constants are part of the boundary contract: the
//! transport engine serializes [`Address`](crate::address::Address) values
//! with them and MUST agree with every peer.

// =============================================================================
// ADDRESSING
// =============================================================================

/// Size of the canonical host value (IPv6 width).
pub const HOST_ADDRESS_SIZE: usize = 16;

/// Serialized size of an address: host + scope id + port.
pub const ADDRESS_WIRE_SIZE: usize = HOST_ADDRESS_SIZE + 4 + 2;

/// Prefix that marks an IPv4 address mapped into the 128-bit space.
pub const IPV4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// Port value that lets the OS pick an ephemeral port.
pub const PORT_ANY: u16 = 0;

/// Buffer length for host names produced by reverse lookup (`NI_MAXHOST`).
pub const MAX_HOST_NAME_LEN: usize = 1025;

// =============================================================================
// SOCKETS
// =============================================================================

/// Backlog used when `listen` is called with a negative value.
pub const MAX_LISTEN_BACKLOG: i32 = libc::SOMAXCONN;

/// Raw option codes accepted by [`SocketOption::try_from`](crate::socket::SocketOption).
pub const OPTION_NON_BLOCKING: u32 = 1;
/// See [`OPTION_NON_BLOCKING`].
pub const OPTION_BROADCAST: u32 = 2;
/// See [`OPTION_NON_BLOCKING`].
pub const OPTION_REUSE_ADDRESS: u32 = 3;
/// See [`OPTION_NON_BLOCKING`].
pub const OPTION_RECEIVE_BUFFER: u32 = 4;
/// See [`OPTION_NON_BLOCKING`].
pub const OPTION_SEND_BUFFER: u32 = 5;
