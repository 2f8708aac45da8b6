//! Forward and reverse name resolution.

#![allow(unsafe_code)]

use std::ffi::{CStr, CString};
use std::{iter, mem, ptr};

use socket2::SockAddr;

use super::{Address, AddressFamily, codec};
use crate::core::constants::MAX_HOST_NAME_LEN;
use crate::core::{PlatformError, PlatformResult};

/// Result list owned by `getaddrinfo`, freed on drop.
struct AddrInfoList(*mut libc::addrinfo);

impl AddrInfoList {
    /// Candidates in resolver order.
    fn iter(&self) -> impl Iterator<Item = &libc::addrinfo> {
        // SAFETY: the list is valid until `freeaddrinfo` runs in `drop`.
        iter::successors(unsafe { self.0.as_ref() }, |ai| unsafe { ai.ai_next.as_ref() })
    }
}

impl Drop for AddrInfoList {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { libc::freeaddrinfo(self.0) };
        }
    }
}

fn gai_message(code: libc::c_int) -> String {
    // SAFETY: gai_strerror returns a static NUL-terminated string.
    unsafe { CStr::from_ptr(libc::gai_strerror(code)) }
        .to_string_lossy()
        .into_owned()
}

fn decode_candidate(ai: &libc::addrinfo) -> PlatformResult<Address> {
    if ai.ai_addr.is_null() {
        return Err(PlatformError::UnrecognizedFamily);
    }

    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let len = (ai.ai_addrlen as usize).min(mem::size_of::<libc::sockaddr_storage>());
    // SAFETY: `ai_addr` points to `ai_addrlen` readable bytes; `len` is
    // clamped to the storage size.
    let native = unsafe {
        ptr::copy_nonoverlapping(
            ai.ai_addr as *const u8,
            &mut storage as *mut libc::sockaddr_storage as *mut u8,
            len,
        );
        SockAddr::new(storage, len as libc::socklen_t)
    };
    codec::decode(&native)
}

/// Resolve `name` to an address carrying `port`.
///
/// Candidates are taken in resolver order; the first one whose native
/// address decodes to IPv4 or IPv6 wins. Numeric literals are accepted.
/// Fails if the resolver call fails or no candidate decodes.
pub fn resolve_host(name: &str, port: u16) -> PlatformResult<Address> {
    let c_name = CString::new(name).map_err(|_| PlatformError::InvalidName)?;

    let mut hints: libc::addrinfo = unsafe { mem::zeroed() };
    hints.ai_flags = libc::AI_ADDRCONFIG;
    hints.ai_family = libc::AF_UNSPEC;

    let mut result: *mut libc::addrinfo = ptr::null_mut();
    let rc = unsafe { libc::getaddrinfo(c_name.as_ptr(), ptr::null(), &hints, &mut result) };
    if rc != 0 {
        let message = gai_message(rc);
        tracing::debug!(name, error = %message, "name resolution failed");
        return Err(PlatformError::Resolution(message));
    }
    let candidates = AddrInfoList(result);

    for ai in candidates.iter() {
        match decode_candidate(ai) {
            Ok(resolved) => {
                return Ok(Address {
                    port,
                    ..resolved
                });
            }
            Err(e) => {
                tracing::debug!(name, family = ai.ai_family, error = %e, "skipping resolver candidate");
            }
        }
    }

    Err(PlatformError::NoUsableCandidate)
}

impl Address {
    /// Resolve `name` into this address, keeping the current port.
    ///
    /// On failure the address is left untouched.
    pub fn set_host(&mut self, name: &str) -> PlatformResult<()> {
        *self = resolve_host(name, self.port)?;
        Ok(())
    }
}

/// Render the host of `address` as text.
///
/// With `numeric_only` the literal form is produced and no lookup happens.
/// Otherwise a reverse lookup is performed and its failure is an error; the
/// numeric form is never substituted silently.
pub fn format_host(address: &Address, numeric_only: bool) -> PlatformResult<String> {
    // IPv4 hosts format through their mapped IPv6 form.
    let native = codec::encode(address, AddressFamily::Ipv6)?;

    let flags = if numeric_only {
        libc::NI_NUMERICHOST
    } else {
        libc::NI_NAMEREQD
    };

    let mut host = [0 as libc::c_char; MAX_HOST_NAME_LEN];
    let rc = unsafe {
        libc::getnameinfo(
            native.as_ptr(),
            native.len(),
            host.as_mut_ptr(),
            host.len() as _,
            ptr::null_mut(),
            0,
            flags,
        )
    };
    if rc != 0 {
        return Err(PlatformError::Format(gai_message(rc)));
    }

    // SAFETY: getnameinfo NUL-terminates on success.
    let name = unsafe { CStr::from_ptr(host.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}
