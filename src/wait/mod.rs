//! NOMAD Platform - Readiness Waiting
//!
//! Blocks the calling thread until sockets become readable or writable:
//!
//! - [`wait`]: up to two sockets (typically the IPv4 and IPv6 listeners of one
//!   host), merged readiness
//! - [`wait_many`]: any number of descriptors through [`SocketSet`]s
//!
//! Two strategies implement [`WaitStrategy`]: [`PollWait`] (event-driven,
//! `poll`) and [`SelectWait`] (descriptor sets, `select`). They produce the
//! same results for the same inputs. [`DefaultWait`] is fixed at build time
//! by the `select-wait` feature and is what [`wait`] uses.
//!
//! | Input | Result |
//! |-------|--------|
//! | timeout elapses | `Ok(WaitInterest::NONE)` |
//! | `timeout_ms == 0` | immediate check |
//! | both sockets `None` | sleeps for the timeout, then `NONE` |
//! | pending socket error | every requested interest |
//! | hang-up | `RECEIVE` if requested |
//! | error or hang-up, not requested | ignored until the timeout |
//! | descriptor `>= FD_SETSIZE` | [`SelectWait`] fails with `DescriptorOutOfRange`; [`PollWait`] waits |
//!
//! The descriptor limit is the one case where the strategies differ.

mod poll;
mod select;
mod set;

pub use poll::PollWait;
pub use select::SelectWait;
pub use set::{SocketSet, wait_many};

use crate::core::PlatformResult;
use crate::socket::Socket;

bitflags::bitflags! {
    /// Readiness conditions, used both as request and as result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WaitInterest: u32 {
        /// Socket can send without blocking.
        const SEND = 1 << 0;
        /// Socket has data (or a connection) to receive.
        const RECEIVE = 1 << 1;
    }
}

impl WaitInterest {
    /// No condition.
    pub const NONE: Self = Self::empty();
}

/// A readiness waiting mechanism.
pub trait WaitStrategy {
    /// Strategy name, for logs.
    const NAME: &'static str;

    /// Wait on up to two sockets.
    ///
    /// Returns the union of the requested conditions that became ready on
    /// either socket; the caller checks both to find out which one fired.
    fn wait(
        &self,
        first: Option<&Socket>,
        second: Option<&Socket>,
        interest: WaitInterest,
        timeout_ms: u32,
    ) -> PlatformResult<WaitInterest>;
}

/// Strategy selected at build time.
#[cfg(not(feature = "select-wait"))]
pub type DefaultWait = PollWait;

/// Strategy selected at build time.
#[cfg(feature = "select-wait")]
pub type DefaultWait = SelectWait;

/// Wait on up to two sockets with the build-time strategy.
pub fn wait(
    first: Option<&Socket>,
    second: Option<&Socket>,
    interest: WaitInterest,
    timeout_ms: u32,
) -> PlatformResult<WaitInterest> {
    let ready = DefaultWait::default().wait(first, second, interest, timeout_ms)?;
    tracing::trace!(strategy = DefaultWait::NAME, ?interest, ?ready, timeout_ms, "wait finished");
    Ok(ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_bits() {
        assert!(WaitInterest::NONE.is_empty());
        assert_eq!(WaitInterest::default(), WaitInterest::NONE);

        let both = WaitInterest::SEND | WaitInterest::RECEIVE;
        assert!(both.contains(WaitInterest::SEND));
        assert!(both.contains(WaitInterest::RECEIVE));
        assert_eq!(both.bits(), 0b11);
    }
}
