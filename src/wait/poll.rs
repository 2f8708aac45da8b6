//! Event-driven strategy built on `poll`.

#![allow(unsafe_code)]

use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use super::{WaitInterest, WaitStrategy};
use crate::core::PlatformResult;
use crate::socket::Socket;

/// Waits with `poll(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollWait;

fn poll_timeout(timeout_ms: u32) -> libc::c_int {
    timeout_ms.min(libc::c_int::MAX as u32) as libc::c_int
}

impl WaitStrategy for PollWait {
    const NAME: &'static str = "poll";

    fn wait(
        &self,
        first: Option<&Socket>,
        second: Option<&Socket>,
        interest: WaitInterest,
        timeout_ms: u32,
    ) -> PlatformResult<WaitInterest> {
        let mut events: libc::c_short = 0;
        if interest.contains(WaitInterest::SEND) {
            events |= libc::POLLOUT;
        }
        if interest.contains(WaitInterest::RECEIVE) {
            events |= libc::POLLIN;
        }

        // Without requested events poll still reports errors and hang-ups,
        // which select never does for a descriptor outside its sets
        let mut fds = [libc::pollfd {
            fd: -1,
            events: 0,
            revents: 0,
        }; 2];
        let mut count = 0;
        for socket in [first, second].into_iter().flatten() {
            fds[count] = libc::pollfd {
                fd: if events == 0 { -1 } else { socket.as_raw_fd() },
                events,
                revents: 0,
            };
            count += 1;
        }

        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        let mut remaining = timeout_ms;
        loop {
            // SAFETY: the first `count` entries of `fds` are initialized.
            let rc = unsafe { libc::poll(fds.as_mut_ptr(), count as libc::nfds_t, poll_timeout(remaining)) };
            if rc < 0 {
                return Err(io::Error::last_os_error().into());
            }
            if rc == 0 {
                return Ok(WaitInterest::NONE);
            }

            let mut ready = WaitInterest::NONE;
            for fd in &mut fds[..count] {
                // select reports a closed descriptor as EBADF
                if fd.revents & libc::POLLNVAL != 0 {
                    return Err(io::Error::from_raw_os_error(libc::EBADF).into());
                }
                let fired = readiness(fd.revents);
                if fd.revents != 0 && (fired & interest).is_empty() {
                    // Only unrequested conditions, which stay raised
                    fd.fd = -1;
                }
                ready |= fired;
                fd.revents = 0;
            }

            let ready = ready & interest;
            if !ready.is_empty() {
                return Ok(ready);
            }

            remaining = remaining_ms(deadline);
            if remaining == 0 {
                return Ok(WaitInterest::NONE);
            }
            tracing::trace!(remaining_ms = remaining, "poll woke on unrequested condition");
        }
    }
}

/// Map `revents` the way select reports the same conditions.
fn readiness(revents: libc::c_short) -> WaitInterest {
    let mut ready = WaitInterest::NONE;
    if revents & (libc::POLLOUT | libc::POLLERR) != 0 {
        ready |= WaitInterest::SEND;
    }
    if revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0 {
        ready |= WaitInterest::RECEIVE;
    }
    ready
}

/// Whole milliseconds until `deadline`, rounded up.
fn remaining_ms(deadline: Instant) -> u32 {
    let left = deadline.saturating_duration_since(Instant::now());
    let ms = left.as_micros().div_ceil(1000);
    ms.min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressFamily;
    use crate::socket::SocketType;

    #[test]
    fn test_poll_timeout_clamped() {
        assert_eq!(poll_timeout(0), 0);
        assert_eq!(poll_timeout(1500), 1500);
        assert_eq!(poll_timeout(u32::MAX), libc::c_int::MAX);
    }

    #[test]
    fn test_readiness_mapping() {
        assert_eq!(readiness(0), WaitInterest::NONE);
        assert_eq!(readiness(libc::POLLOUT), WaitInterest::SEND);
        assert_eq!(readiness(libc::POLLIN), WaitInterest::RECEIVE);
        assert_eq!(readiness(libc::POLLHUP), WaitInterest::RECEIVE);
        assert_eq!(readiness(libc::POLLERR), WaitInterest::SEND | WaitInterest::RECEIVE);
    }

    #[test]
    fn test_remaining_ms() {
        assert_eq!(remaining_ms(Instant::now()), 0);
        let later = Instant::now() + Duration::from_millis(500);
        assert!((490..=500).contains(&remaining_ms(later)));
    }

    #[test]
    fn test_unbound_datagram_is_writable() {
        let socket = Socket::create(SocketType::Datagram, AddressFamily::Ipv4).unwrap();
        let ready = PollWait
            .wait(Some(&socket), None, WaitInterest::SEND | WaitInterest::RECEIVE, 0)
            .unwrap();
        assert_eq!(ready, WaitInterest::SEND);
    }
}
