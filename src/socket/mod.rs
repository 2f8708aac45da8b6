//! NOMAD Platform - Sockets
//!
//! Socket lifecycle and vectored I/O over IPv4 and IPv6:
//!
//! - **Lifecycle**: [`Socket`] create/bind/listen/connect/accept/destroy
//! - **Options**: the closed [`SocketOption`] set
//! - **Configuration**: [`SocketBuilder`] applies a full socket setup in one go
//! - **Vectored I/O**: [`Socket::send`] gathers, [`Socket::receive`] scatters
//!
//! # Result Conventions
//!
//! | Outcome | Reported as |
//! |---------|-------------|
//! | Kernel would block on send | `Ok(0)` |
//! | Kernel would block on receive | `Ok(Received { len: 0, .. })` |
//! | Datagram larger than the buffers | `Err(PlatformError::Truncated)` |
//! | No pending connection on accept | `None` |
//!
//! A socket owned by the caller is closed exactly once, either through
//! [`Socket::destroy`] or when it is dropped.

mod builder;
mod io;
mod lifecycle;
mod options;

pub use builder::SocketBuilder;
pub use io::Received;
pub use lifecycle::{Accepted, ConnectStatus, Socket, SocketType};
pub use options::SocketOption;
