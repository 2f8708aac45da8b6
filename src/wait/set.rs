//! Descriptor sets and the many-socket wait.

#![allow(unsafe_code)]

use std::fmt;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, RawFd};
use std::ptr;

use crate::core::{PlatformError, PlatformResult};

/// A set of socket descriptors for [`wait_many`].
///
/// After a wait the set holds only the descriptors that became ready.
#[derive(Clone)]
pub struct SocketSet {
    raw: libc::fd_set,
    max: Option<RawFd>,
}

impl Default for SocketSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SocketSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketSet")
            .field("max_descriptor", &self.max)
            .finish_non_exhaustive()
    }
}

fn check_range(fd: RawFd) -> PlatformResult<()> {
    if fd < 0 || fd as usize >= libc::FD_SETSIZE as usize {
        return Err(PlatformError::DescriptorOutOfRange(fd));
    }
    Ok(())
}

impl SocketSet {
    /// Create an empty set.
    pub fn new() -> Self {
        let mut raw: libc::fd_set = unsafe { mem::zeroed() };
        unsafe { libc::FD_ZERO(&mut raw) };
        Self { raw, max: None }
    }

    /// Add a socket. Fails if its descriptor does not fit in a set.
    pub fn add(&mut self, socket: &impl AsRawFd) -> PlatformResult<()> {
        let fd = socket.as_raw_fd();
        check_range(fd)?;
        unsafe { libc::FD_SET(fd, &mut self.raw) };
        self.max = self.max.max(Some(fd));
        Ok(())
    }

    /// Remove a socket. Unknown sockets are ignored.
    pub fn remove(&mut self, socket: &impl AsRawFd) {
        let fd = socket.as_raw_fd();
        if check_range(fd).is_ok() {
            unsafe { libc::FD_CLR(fd, &mut self.raw) };
        }
    }

    /// Check if a socket is in the set.
    pub fn contains(&self, socket: &impl AsRawFd) -> bool {
        let fd = socket.as_raw_fd();
        check_range(fd).is_ok() && unsafe { libc::FD_ISSET(fd, &self.raw) }
    }

    /// Remove every socket.
    pub fn clear(&mut self) {
        unsafe { libc::FD_ZERO(&mut self.raw) };
        self.max = None;
    }

    /// Highest descriptor ever added since the last clear.
    pub fn max_descriptor(&self) -> Option<RawFd> {
        self.max
    }
}

/// Run `select` over the two sets, leaving only ready descriptors in them.
pub(super) fn select_sets(
    max_descriptor: Option<RawFd>,
    read_set: &mut SocketSet,
    write_set: &mut SocketSet,
    timeout_ms: u32,
) -> PlatformResult<usize> {
    let nfds = max_descriptor.map_or(0, |fd| fd + 1);
    let mut timeout = libc::timeval {
        tv_sec: (timeout_ms / 1000) as libc::time_t,
        tv_usec: ((timeout_ms % 1000) * 1000) as libc::suseconds_t,
    };

    let rc = unsafe {
        libc::select(
            nfds,
            &mut read_set.raw,
            &mut write_set.raw,
            ptr::null_mut(),
            &mut timeout,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(rc as usize)
}

/// Wait until any descriptor in the sets is ready.
///
/// Returns the number of ready descriptors, zero on timeout. The highest
/// descriptor is taken from the sets themselves.
pub fn wait_many(
    read_set: &mut SocketSet,
    write_set: &mut SocketSet,
    timeout_ms: u32,
) -> PlatformResult<usize> {
    let max_descriptor = read_set.max.max(write_set.max);
    let ready = select_sets(max_descriptor, read_set, write_set, timeout_ms)?;
    tracing::trace!(ready, ?max_descriptor, timeout_ms, "wait_many finished");
    Ok(ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, AddressFamily, HostAddress};
    use crate::socket::{Socket, SocketType};
    use std::io::IoSlice;

    fn bound() -> (Socket, Address) {
        let socket = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        socket
            .bind(Some(&Address::new(HostAddress::LOOPBACK_V4, 0)))
            .unwrap();
        let address = socket.local_address().unwrap();
        (socket, address)
    }

    #[test]
    fn test_set_membership() {
        let (a, _) = bound();
        let (b, _) = bound();
        let mut set = SocketSet::new();
        assert!(set.max_descriptor().is_none());

        set.add(&a).unwrap();
        set.add(&b).unwrap();
        assert!(set.contains(&a));
        assert!(set.contains(&b));
        assert_eq!(
            set.max_descriptor(),
            Some(a.as_raw_fd().max(b.as_raw_fd()))
        );

        set.remove(&a);
        assert!(!set.contains(&a));
        assert!(set.contains(&b));

        set.clear();
        assert!(!set.contains(&b));
        assert!(set.max_descriptor().is_none());
    }

    #[test]
    fn test_descriptor_out_of_range() {
        assert!(matches!(
            check_range(-1),
            Err(PlatformError::DescriptorOutOfRange(-1))
        ));
        assert!(check_range(libc::FD_SETSIZE as RawFd).is_err());
        assert!(check_range(0).is_ok());
    }

    #[test]
    fn test_wait_many_timeout() {
        let (a, _) = bound();
        let mut read_set = SocketSet::new();
        let mut write_set = SocketSet::new();
        read_set.add(&a).unwrap();

        assert_eq!(wait_many(&mut read_set, &mut write_set, 10).unwrap(), 0);
        assert!(!read_set.contains(&a));
    }

    #[test]
    fn test_wait_many_reports_ready() {
        let (a, address_a) = bound();
        let (b, _) = bound();
        let (sender, _) = bound();
        sender
            .send(Some(&address_a), &[IoSlice::new(b"wake")])
            .unwrap();

        let mut read_set = SocketSet::new();
        let mut write_set = SocketSet::new();
        read_set.add(&a).unwrap();
        read_set.add(&b).unwrap();
        write_set.add(&sender).unwrap();

        let ready = wait_many(&mut read_set, &mut write_set, 1000).unwrap();
        assert_eq!(ready, 2);
        assert!(read_set.contains(&a));
        assert!(!read_set.contains(&b));
        assert!(write_set.contains(&sender));
    }
}
