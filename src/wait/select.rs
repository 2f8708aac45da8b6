//! Descriptor-set strategy built on `select`.

use std::os::fd::AsRawFd;

use super::set::{SocketSet, select_sets};
use super::{WaitInterest, WaitStrategy};
use crate::core::PlatformResult;
use crate::socket::Socket;

/// Waits with `select(2)`.
///
/// Descriptors at or above `FD_SETSIZE` cannot be waited on and fail with
/// [`PlatformError::DescriptorOutOfRange`](crate::core::PlatformError).
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectWait;

impl WaitStrategy for SelectWait {
    const NAME: &'static str = "select";

    fn wait(
        &self,
        first: Option<&Socket>,
        second: Option<&Socket>,
        interest: WaitInterest,
        timeout_ms: u32,
    ) -> PlatformResult<WaitInterest> {
        let mut read_set = SocketSet::new();
        let mut write_set = SocketSet::new();
        let mut max_descriptor = None;

        for socket in [first, second].into_iter().flatten() {
            if interest.contains(WaitInterest::SEND) {
                write_set.add(socket)?;
            }
            if interest.contains(WaitInterest::RECEIVE) {
                read_set.add(socket)?;
            }
            max_descriptor = max_descriptor.max(Some(socket.as_raw_fd()));
        }

        let count = select_sets(max_descriptor, &mut read_set, &mut write_set, timeout_ms)?;

        let mut ready = WaitInterest::NONE;
        if count == 0 {
            return Ok(ready);
        }

        for socket in [first, second].into_iter().flatten() {
            if write_set.contains(socket) {
                ready |= WaitInterest::SEND;
            }
            if read_set.contains(socket) {
                ready |= WaitInterest::RECEIVE;
            }
        }

        Ok(ready)
    }
}
