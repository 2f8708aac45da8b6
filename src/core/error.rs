//! Error types for the platform layer.
//!
//! Callers that only care about the binary outcome treat any `Err` as
//! failure. Would-block transfers and wait timeouts are not errors: they are
//! reported through the `Ok` value of the operation.

use std::io;

use thiserror::Error;

use crate::address::AddressFamily;
use crate::socket::SocketOption;

/// Platform layer errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Native address carries a family other than IPv4 or IPv6.
    #[error("unrecognized address family")]
    UnrecognizedFamily,

    /// Address cannot be expressed in the requested family.
    #[error("address cannot be encoded as {family}")]
    FamilyMismatch {
        /// Family the caller asked for.
        family: AddressFamily,
    },

    /// The resolver call itself failed.
    #[error("name resolution failed: {0}")]
    Resolution(String),

    /// The resolver answered but no candidate had a usable family.
    #[error("no resolved candidate has a usable address family")]
    NoUsableCandidate,

    /// Host formatting (numeric or reverse lookup) failed.
    #[error("host formatting failed: {0}")]
    Format(String),

    /// Host name contains an interior NUL byte.
    #[error("host name contains a NUL byte")]
    InvalidName,

    /// Incoming datagram was larger than the supplied buffers.
    #[error("datagram truncated")]
    Truncated,

    /// Raw option code outside the closed option set.
    #[error("unknown socket option: {0}")]
    UnknownOption(u32),

    /// Value not valid for the option.
    #[error("invalid value {value} for option {option:?}")]
    InvalidOptionValue {
        /// Option being set.
        option: SocketOption,
        /// Rejected value.
        value: i32,
    },

    /// Descriptor cannot be placed in a descriptor set.
    #[error("descriptor {0} exceeds FD_SETSIZE")]
    DescriptorOutOfRange(i32),

    /// I/O error reported by the kernel.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl PlatformError {
    /// Check if this error came from address translation or resolution.
    pub fn is_address_error(&self) -> bool {
        matches!(
            self,
            PlatformError::UnrecognizedFamily
                | PlatformError::FamilyMismatch { .. }
                | PlatformError::Resolution(_)
                | PlatformError::NoUsableCandidate
                | PlatformError::Format(_)
                | PlatformError::InvalidName
        )
    }

    /// Check if this error is a raw kernel error.
    pub fn is_io(&self) -> bool {
        matches!(self, PlatformError::Io(_))
    }

    /// Raw OS error code, when the kernel reported one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            PlatformError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
