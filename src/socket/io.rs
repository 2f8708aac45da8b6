//! Scatter/gather transfers.
//!
//! `IoSlice` and `IoSliceMut` are ABI-compatible with `iovec` on unix, so the
//! caller's buffers are handed to the kernel as-is and never retained past
//! the call.

#![allow(unsafe_code)]

use std::io::{self, IoSlice, IoSliceMut};
use std::mem;
use std::os::fd::AsRawFd;

use socket2::SockAddr;

use super::{Socket, SocketType};
use crate::address::{Address, codec};
use crate::core::{PlatformError, PlatformResult};

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: libc::c_int = 0;

/// Result of [`Socket::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Bytes written into the buffers. Zero when the receive would block.
    pub len: usize,
    /// Sender address, when requested.
    pub source: Option<Address>,
}

impl Received {
    fn would_block() -> Self {
        Self {
            len: 0,
            source: None,
        }
    }

    /// Check if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Socket {
    /// Send the concatenation of `buffers` as one transmission.
    ///
    /// With a `destination` the send is connectionless; without one the
    /// connected peer is used. Returns `Ok(0)` if the kernel would block.
    pub fn send(&self, destination: Option<&Address>, buffers: &[IoSlice<'_>]) -> PlatformResult<usize> {
        let native = destination
            .map(|address| codec::encode(address, self.family))
            .transpose()?;

        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        if let Some(native) = &native {
            msg.msg_name = native.as_ptr() as *mut libc::c_void;
            msg.msg_namelen = native.len();
        }
        msg.msg_iov = buffers.as_ptr() as *mut libc::iovec;
        msg.msg_iovlen = buffers.len() as _;

        // SAFETY: `msg` points at `native` and `buffers`, both alive for the call.
        let sent = unsafe { libc::sendmsg(self.as_raw_fd(), &msg, SEND_FLAGS) };
        if sent < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(0);
            }
            return Err(err.into());
        }

        Ok(sent as usize)
    }

    /// Receive one message, scattering it across `buffers`.
    ///
    /// Returns a zero-length [`Received`] if the kernel would block. A
    /// datagram larger than the total buffer capacity fails with
    /// [`PlatformError::Truncated`]. A source in a family the codec does not
    /// know is reported as `None`.
    pub fn receive(&self, want_source: bool, buffers: &mut [IoSliceMut<'_>]) -> PlatformResult<Received> {
        let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        if want_source {
            msg.msg_name = &mut storage as *mut libc::sockaddr_storage as *mut libc::c_void;
            msg.msg_namelen = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        }
        msg.msg_iov = buffers.as_mut_ptr() as *mut libc::iovec;
        msg.msg_iovlen = buffers.len() as _;

        // SAFETY: `msg` points at `storage` and `buffers`, both alive for the call.
        let received = unsafe { libc::recvmsg(self.as_raw_fd(), &mut msg, 0) };
        if received < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock => Ok(Received::would_block()),
                // ICMP unreachable for an earlier datagram
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
                    if self.socket_type == SocketType::Datagram =>
                {
                    tracing::debug!(fd = self.as_raw_fd(), "datagram reset treated as would-block");
                    Ok(Received::would_block())
                }
                _ => Err(err.into()),
            };
        }

        if msg.msg_flags & libc::MSG_TRUNC != 0 {
            tracing::debug!(fd = self.as_raw_fd(), len = received, "datagram truncated");
            return Err(PlatformError::Truncated);
        }

        let source = if want_source && msg.msg_namelen > 0 {
            // SAFETY: the kernel initialized `msg_namelen` bytes of `storage`.
            let native = unsafe { SockAddr::new(storage, msg.msg_namelen) };
            match codec::decode(&native) {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::debug!(fd = self.as_raw_fd(), error = %e, "undecodable datagram source");
                    None
                }
            }
        } else {
            None
        };

        Ok(Received {
            len: received as usize,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AddressFamily, HostAddress};
    use crate::socket::SocketOption;

    fn bound_pair() -> (Socket, Socket, Address) {
        let sender = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        let receiver = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        receiver
            .bind(Some(&Address::new(HostAddress::LOOPBACK_V4, 0)))
            .unwrap();
        let address = receiver.local_address().unwrap();
        (sender, receiver, address)
    }

    #[test]
    fn test_gather_send_scatter_receive() {
        let (sender, receiver, address) = bound_pair();

        let sent = sender
            .send(
                Some(&address),
                &[IoSlice::new(b"head"), IoSlice::new(b"-"), IoSlice::new(b"tail")],
            )
            .unwrap();
        assert_eq!(sent, 9);

        let mut first = [0u8; 4];
        let mut second = [0u8; 8];
        let received = receiver
            .receive(
                true,
                &mut [IoSliceMut::new(&mut first), IoSliceMut::new(&mut second)],
            )
            .unwrap();

        assert_eq!(received.len, 9);
        assert_eq!(&first, b"head");
        assert_eq!(&second[..5], b"-tail");

        let source = received.source.unwrap();
        assert_eq!(source.host, HostAddress::LOOPBACK_V4);
        assert_eq!(source.port, sender.local_address().unwrap().port);
    }

    #[test]
    fn test_receive_would_block_is_empty() {
        let (_sender, receiver, _) = bound_pair();
        receiver.set_option(SocketOption::NonBlocking, 1).unwrap();

        let mut buf = [0u8; 16];
        let received = receiver
            .receive(true, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert!(received.is_empty());
        assert!(received.source.is_none());
    }

    #[test]
    fn test_truncation_fails() {
        let (sender, receiver, address) = bound_pair();
        sender
            .send(Some(&address), &[IoSlice::new(b"12345")])
            .unwrap();

        let mut buf = [0u8; 4];
        let result = receiver.receive(false, &mut [IoSliceMut::new(&mut buf)]);
        assert!(matches!(result, Err(PlatformError::Truncated)));
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let (sender, receiver, address) = bound_pair();
        sender
            .send(Some(&address), &[IoSlice::new(b"1234")])
            .unwrap();

        let mut buf = [0u8; 4];
        let received = receiver
            .receive(false, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert_eq!(received.len, 4);
        assert_eq!(&buf, b"1234");
    }

    #[test]
    fn test_connected_send() {
        let (sender, receiver, address) = bound_pair();
        sender.connect(&address).unwrap();

        assert_eq!(sender.send(None, &[IoSlice::new(b"ping")]).unwrap(), 4);

        let mut buf = [0u8; 8];
        let received = receiver
            .receive(false, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert_eq!(&buf[..received.len], b"ping");
    }

    #[test]
    fn test_send_v6_host_on_v4_socket_fails() {
        let (sender, _receiver, _) = bound_pair();
        let result = sender.send(
            Some(&Address::new(HostAddress::LOOPBACK_V6, 9)),
            &[IoSlice::new(b"x")],
        );
        assert!(matches!(result, Err(PlatformError::FamilyMismatch { .. })));
    }

    fn closed_port() -> Address {
        let scratch = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        scratch
            .bind(Some(&Address::new(HostAddress::LOOPBACK_V4, 0)))
            .unwrap();
        let address = scratch.local_address().unwrap();
        scratch.destroy();
        address
    }

    #[test]
    fn test_refused_datagram_reads_as_would_block() {
        let socket = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        socket.connect(&closed_port()).unwrap();
        socket.set_option(SocketOption::NonBlocking, 1).unwrap();
        socket.send(None, &[IoSlice::new(b"x")]).unwrap();

        // Let the ICMP port unreachable come back
        std::thread::sleep(std::time::Duration::from_millis(50));

        let mut buf = [0u8; 8];
        let received = socket
            .receive(true, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert!(received.is_empty());
        assert!(received.source.is_none());

        // The socket stays usable
        let received = socket
            .receive(false, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert!(received.is_empty());
    }

    #[test]
    fn test_undecodable_source_keeps_payload() {
        use socket2::{Domain, Type};

        let dir = std::env::temp_dir();
        let pid = std::process::id();
        let receiver_path = dir.join(format!("nomad-platform-rx-{pid}.sock"));
        let sender_path = dir.join(format!("nomad-platform-tx-{pid}.sock"));
        let _ = std::fs::remove_file(&receiver_path);
        let _ = std::fs::remove_file(&sender_path);

        let inner = socket2::Socket::new(Domain::UNIX, Type::DGRAM, None).unwrap();
        inner.bind(&SockAddr::unix(&receiver_path).unwrap()).unwrap();
        let receiver = Socket {
            inner,
            socket_type: SocketType::Datagram,
            family: AddressFamily::Ipv4,
        };

        let sender = socket2::Socket::new(Domain::UNIX, Type::DGRAM, None).unwrap();
        sender.bind(&SockAddr::unix(&sender_path).unwrap()).unwrap();
        sender
            .send_to(b"local", &SockAddr::unix(&receiver_path).unwrap())
            .unwrap();

        let mut buf = [0u8; 8];
        let received = receiver
            .receive(true, &mut [IoSliceMut::new(&mut buf)])
            .unwrap();
        assert_eq!(&buf[..received.len], b"local");
        assert!(received.source.is_none());

        let _ = std::fs::remove_file(&receiver_path);
        let _ = std::fs::remove_file(&sender_path);
    }
}
