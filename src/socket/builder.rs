//! Builder for creating sockets with a full configuration.

use super::{Socket, SocketOption, SocketType};
use crate::address::{Address, AddressFamily};
use crate::core::PlatformResult;

/// Builder for creating sockets with custom options.
///
/// `build` creates the socket, applies options, then binds and listens if
/// asked to. Address reuse is applied before bind so it takes effect.
#[derive(Debug, Clone)]
pub struct SocketBuilder {
    socket_type: SocketType,
    family: AddressFamily,
    non_blocking: bool,
    broadcast: bool,
    reuse_address: bool,
    recv_buffer_size: Option<i32>,
    send_buffer_size: Option<i32>,
    bind_address: Option<Address>,
    backlog: Option<i32>,
}

impl Default for SocketBuilder {
    fn default() -> Self {
        Self::new(SocketType::Datagram, AddressFamily::Ipv4)
    }
}

impl SocketBuilder {
    /// Create a new builder with default options.
    pub fn new(socket_type: SocketType, family: AddressFamily) -> Self {
        Self {
            socket_type,
            family,
            non_blocking: false,
            broadcast: false,
            reuse_address: false,
            recv_buffer_size: None,
            send_buffer_size: None,
            bind_address: None,
            backlog: None,
        }
    }

    /// Datagram socket builder.
    pub fn datagram(family: AddressFamily) -> Self {
        Self::new(SocketType::Datagram, family)
    }

    /// Stream socket builder.
    pub fn stream(family: AddressFamily) -> Self {
        Self::new(SocketType::Stream, family)
    }

    /// Set non-blocking mode.
    pub fn non_blocking(mut self, enabled: bool) -> Self {
        self.non_blocking = enabled;
        self
    }

    /// Allow sending to broadcast addresses.
    pub fn broadcast(mut self, enabled: bool) -> Self {
        self.broadcast = enabled;
        self
    }

    /// Allow address reuse on bind.
    pub fn reuse_address(mut self, enabled: bool) -> Self {
        self.reuse_address = enabled;
        self
    }

    /// Set the kernel receive buffer size.
    pub fn recv_buffer_size(mut self, size: i32) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Set the kernel send buffer size.
    pub fn send_buffer_size(mut self, size: i32) -> Self {
        self.send_buffer_size = Some(size);
        self
    }

    /// Bind to the given address.
    pub fn bind(mut self, address: Address) -> Self {
        self.bind_address = Some(address);
        self
    }

    /// Listen after binding. A negative backlog selects the OS maximum.
    pub fn listen(mut self, backlog: i32) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Create and configure the socket.
    pub fn build(self) -> PlatformResult<Socket> {
        let socket = Socket::create(self.socket_type, self.family)?;

        if self.reuse_address {
            socket.set_option(SocketOption::ReuseAddress, 1)?;
        }
        if self.broadcast {
            socket.set_option(SocketOption::Broadcast, 1)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_option(SocketOption::ReceiveBufferSize, size)?;
        }
        if let Some(size) = self.send_buffer_size {
            socket.set_option(SocketOption::SendBufferSize, size)?;
        }
        if self.non_blocking {
            socket.set_option(SocketOption::NonBlocking, 1)?;
        }

        if let Some(address) = &self.bind_address {
            socket.bind(Some(address))?;
        }
        if let Some(backlog) = self.backlog {
            socket.listen(backlog)?;
        }

        Ok(socket)
    }
}
