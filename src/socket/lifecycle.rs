//! Socket creation, binding, connection setup and teardown.

use std::io;
use std::net::Shutdown;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use socket2::Type;

use crate::address::{Address, AddressFamily, codec};
use crate::core::constants::{MAX_LISTEN_BACKLOG, PORT_ANY};
use crate::core::PlatformResult;

/// Transport semantics of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// Connectionless datagrams (UDP).
    Datagram,
    /// Connection-oriented byte stream (TCP).
    Stream,
}

impl SocketType {
    fn raw(self) -> Type {
        match self {
            SocketType::Datagram => Type::DGRAM,
            SocketType::Stream => Type::STREAM,
        }
    }
}

/// Outcome of [`Socket::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    /// The connection (or datagram peer association) is established.
    Connected,
    /// Non-blocking connect in progress; wait for send readiness, then
    /// check [`Socket::take_error`].
    InProgress,
}

/// A connection taken from a listening socket.
#[derive(Debug)]
pub struct Accepted {
    /// The connected socket.
    pub socket: Socket,
    /// Peer address, when requested and decodable.
    pub peer: Option<Address>,
}

/// An owned IPv4 or IPv6 socket.
///
/// The family is fixed at creation and used for every address translation
/// on this socket. IPv6 sockets are IPv6-only: IPv4 traffic needs its own
/// IPv4 socket.
#[derive(Debug)]
pub struct Socket {
    pub(super) inner: socket2::Socket,
    pub(super) socket_type: SocketType,
    pub(super) family: AddressFamily,
}

impl Socket {
    /// Open a kernel socket.
    pub fn create(socket_type: SocketType, family: AddressFamily) -> PlatformResult<Self> {
        let inner = socket2::Socket::new(family.domain(), socket_type.raw(), None)?;

        if family == AddressFamily::Ipv6 {
            inner.set_only_v6(true)?;
        }

        #[cfg(any(target_os = "macos", target_os = "ios"))]
        inner.set_nosigpipe(true)?;

        tracing::trace!(fd = inner.as_raw_fd(), ?socket_type, %family, "socket created");

        Ok(Self {
            inner,
            socket_type,
            family,
        })
    }

    /// Family fixed at creation.
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Type fixed at creation.
    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    /// Bind to `address`, or to the family wildcard on an OS-chosen port.
    pub fn bind(&self, address: Option<&Address>) -> PlatformResult<()> {
        let address = address.copied().unwrap_or_else(|| Address::any(PORT_ANY));
        let native = codec::encode(&address, self.family)?;
        self.inner.bind(&native)?;
        Ok(())
    }

    /// Start listening. A negative backlog selects the OS maximum.
    pub fn listen(&self, backlog: i32) -> PlatformResult<()> {
        let backlog = if backlog < 0 { MAX_LISTEN_BACKLOG } else { backlog };
        self.inner.listen(backlog)?;
        Ok(())
    }

    /// Connect to `address`.
    ///
    /// On a non-blocking socket the connect usually reports
    /// [`ConnectStatus::InProgress`].
    pub fn connect(&self, address: &Address) -> PlatformResult<ConnectStatus> {
        let native = codec::encode(address, self.family)?;
        match self.inner.connect(&native) {
            Ok(()) => Ok(ConnectStatus::Connected),
            Err(e)
                if e.raw_os_error() == Some(libc::EINPROGRESS)
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                Ok(ConnectStatus::InProgress)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Accept a pending connection.
    ///
    /// Returns `None` both when nothing is pending on a non-blocking socket
    /// and when the kernel reports an error; use the readiness multiplexer
    /// to tell the two apart.
    pub fn accept(&self, want_address: bool) -> Option<Accepted> {
        let (inner, native) = match self.inner.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::debug!(fd = self.as_raw_fd(), error = %e, "accept returned no connection");
                return None;
            }
        };

        let peer = if want_address {
            match codec::decode(&native) {
                Ok(peer) => Some(peer),
                Err(e) => {
                    tracing::debug!(error = %e, "accepted peer address not decodable");
                    None
                }
            }
        } else {
            None
        };

        tracing::trace!(fd = inner.as_raw_fd(), listener = self.as_raw_fd(), "connection accepted");

        Some(Accepted {
            socket: Socket {
                inner,
                socket_type: self.socket_type,
                family: self.family,
            },
            peer,
        })
    }

    /// Address the socket is bound to.
    pub fn local_address(&self) -> PlatformResult<Address> {
        codec::decode(&self.inner.local_addr()?)
    }

    /// Address of the connected peer.
    pub fn peer_address(&self) -> PlatformResult<Address> {
        codec::decode(&self.inner.peer_addr()?)
    }

    /// Take the pending socket error, if any.
    ///
    /// After a non-blocking connect becomes writable, `None` means the
    /// connection succeeded.
    pub fn take_error(&self) -> PlatformResult<Option<io::Error>> {
        Ok(self.inner.take_error()?)
    }

    /// Shut down one or both directions of a stream.
    pub fn shutdown(&self, how: Shutdown) -> PlatformResult<()> {
        self.inner.shutdown(how)?;
        Ok(())
    }

    /// Close the socket.
    pub fn destroy(self) {
        tracing::trace!(fd = self.as_raw_fd(), "socket destroyed");
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl AsFd for Socket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.as_fd()
    }
}
