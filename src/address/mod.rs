//! Family-neutral addressing.
//!
//! Every address crossing the platform boundary is an [`Address`]: a single
//! 128-bit host value (IPv4 hosts are stored in their IPv4-mapped IPv6 form),
//! an IPv6 scope id, and a port in host byte order. There is exactly one
//! representation per host, so `127.0.0.1` and `::ffff:127.0.0.1` are the
//! same value.
//!
//! - [`codec`]: translation between [`Address`] and the native socket
//!   address, in both directions
//! - [`resolve_host`] / [`format_host`]: forward and reverse name resolution
//!
//! # Wire Layout
//!
//! ```text
//! ┌──────────────────────────┬──────────────┬────────────┐
//! │ host (16, network order) │ scope id (4) │ port (2)   │
//! └──────────────────────────┴──────────────┴────────────┘
//!                             big-endian     big-endian
//! ```

pub mod codec;
mod neutral;
mod resolve;

pub use neutral::{Address, AddressFamily, HostAddress};
pub use resolve::{format_host, resolve_host};
