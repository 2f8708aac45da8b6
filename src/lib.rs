//! # NOMAD Platform
//!
//! Platform socket layer underneath the NOMAD transport engine.
//!
//! It gives the engine one small, predictable contract for moving opaque
//! datagrams and streams over IPv4 and IPv6, with no OS-specific code above
//! it:
//!
//! - **Addressing**: one neutral 128-bit [`Address`] for both families
//! - **Sockets**: creation, binding, connection setup, the closed option set
//! - **Vectored I/O**: gather on send, scatter on receive
//! - **Readiness**: waiting on the IPv4/IPv6 socket pair or on many sockets
//! - **Time**: a rebaseable monotonic millisecond [`Clock`]
//!
//! The layer is synchronous and runs no threads of its own. Calls on
//! different sockets may run concurrently; calls on the same socket need
//! external synchronization.
//!
//! ## Feature Flags
//!
//! - `select-wait`: use `select` instead of `poll` for [`wait`](wait::wait)
//!
//! ## Modules
//!
//! - [`core`]: Constants and error types
//! - [`address`]: Neutral addresses, codec, name resolution
//! - [`socket`]: Socket lifecycle, options and vectored I/O
//! - [`wait`]: Readiness multiplexing
//! - [`time`]: Millisecond clock
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::io::{IoSlice, IoSliceMut};
//! use nomad_platform::prelude::*;
//!
//! # fn main() -> PlatformResult<()> {
//! let server = SocketBuilder::datagram(AddressFamily::Ipv4)
//!     .bind(Address::new(HostAddress::LOOPBACK_V4, 0))
//!     .build()?;
//! let server_addr = server.local_address()?;
//!
//! let client = Socket::create(SocketType::Datagram, AddressFamily::Ipv4)?;
//! client.send(Some(&server_addr), &[IoSlice::new(b"hello")])?;
//!
//! if wait(Some(&server), None, WaitInterest::RECEIVE, 1000)?.contains(WaitInterest::RECEIVE) {
//!     let mut buf = [0u8; 16];
//!     let received = server.receive(true, &mut [IoSliceMut::new(&mut buf)])?;
//!     assert_eq!(&buf[..received.len], b"hello");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(unix))]
compile_error!("nomad-platform supports unix targets only");

// Core module (always included)
pub mod core;

pub mod address;
pub mod socket;
pub mod time;
pub mod wait;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::address::{Address, AddressFamily, HostAddress, format_host, resolve_host};
    pub use crate::core::{PlatformError, PlatformResult};
    pub use crate::socket::{
        Accepted, ConnectStatus, Received, Socket, SocketBuilder, SocketOption, SocketType,
    };
    pub use crate::time::Clock;
    pub use crate::wait::{SocketSet, WaitInterest, WaitStrategy, wait, wait_many};
}

// Re-export commonly used items at crate root
pub use address::{Address, AddressFamily, HostAddress};
pub use crate::core::{PlatformError, PlatformResult};
pub use socket::{Socket, SocketBuilder, SocketOption, SocketType};
pub use time::Clock;
pub use wait::WaitInterest;
