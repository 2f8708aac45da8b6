//! The closed set of socket options.

use super::Socket;
use crate::core::constants::{
    OPTION_BROADCAST, OPTION_NON_BLOCKING, OPTION_RECEIVE_BUFFER, OPTION_REUSE_ADDRESS,
    OPTION_SEND_BUFFER,
};
use crate::core::{PlatformError, PlatformResult};

/// Options that may be set on a socket. No other option is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOption {
    /// Non-blocking mode (value != 0 enables).
    NonBlocking,
    /// Permission to send to broadcast addresses (value != 0 enables).
    Broadcast,
    /// Address reuse on bind (value != 0 enables).
    ReuseAddress,
    /// Kernel receive buffer size in bytes.
    ReceiveBufferSize,
    /// Kernel send buffer size in bytes.
    SendBufferSize,
}

impl SocketOption {
    /// Raw option code.
    pub fn code(self) -> u32 {
        match self {
            SocketOption::NonBlocking => OPTION_NON_BLOCKING,
            SocketOption::Broadcast => OPTION_BROADCAST,
            SocketOption::ReuseAddress => OPTION_REUSE_ADDRESS,
            SocketOption::ReceiveBufferSize => OPTION_RECEIVE_BUFFER,
            SocketOption::SendBufferSize => OPTION_SEND_BUFFER,
        }
    }
}

impl TryFrom<u32> for SocketOption {
    type Error = PlatformError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            OPTION_NON_BLOCKING => Ok(SocketOption::NonBlocking),
            OPTION_BROADCAST => Ok(SocketOption::Broadcast),
            OPTION_REUSE_ADDRESS => Ok(SocketOption::ReuseAddress),
            OPTION_RECEIVE_BUFFER => Ok(SocketOption::ReceiveBufferSize),
            OPTION_SEND_BUFFER => Ok(SocketOption::SendBufferSize),
            other => Err(PlatformError::UnknownOption(other)),
        }
    }
}

fn buffer_size(option: SocketOption, value: i32) -> PlatformResult<usize> {
    usize::try_from(value).map_err(|_| PlatformError::InvalidOptionValue { option, value })
}

impl Socket {
    /// Set one option.
    pub fn set_option(&self, option: SocketOption, value: i32) -> PlatformResult<()> {
        match option {
            SocketOption::NonBlocking => self.inner.set_nonblocking(value != 0)?,
            SocketOption::Broadcast => self.inner.set_broadcast(value != 0)?,
            SocketOption::ReuseAddress => self.inner.set_reuse_address(value != 0)?,
            SocketOption::ReceiveBufferSize => self
                .inner
                .set_recv_buffer_size(buffer_size(option, value)?)?,
            SocketOption::SendBufferSize => self
                .inner
                .set_send_buffer_size(buffer_size(option, value)?)?,
        }
        Ok(())
    }

    /// Set an option by raw code. Codes outside the closed set fail.
    pub fn set_raw_option(&self, code: u32, value: i32) -> PlatformResult<()> {
        self.set_option(SocketOption::try_from(code)?, value)
    }
}
