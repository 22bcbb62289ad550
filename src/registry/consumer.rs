//! Consumer handle types
//!
//! A handle owns one attached consumer socket together with its
//! delivery state. The registry is the only owner of handles; dropping
//! a handle closes the socket.

use std::io::{self, Write};
use std::os::unix::net::UnixStream;

/// Delivery direction for a consumer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Consumer only receives broadcast data and sends nothing back
    Outbound,
}

/// A single attached consumer connection
///
/// The socket is exclusively owned by the handle and is non-blocking
/// for the handle's whole lifetime (the registry configures it before
/// constructing the handle).
#[derive(Debug)]
pub struct ConsumerHandle {
    stream: UnixStream,
    mode: DeliveryMode,
    /// Reserved for future per-consumer options
    flags: u32,
}

impl ConsumerHandle {
    pub(super) fn new(stream: UnixStream, mode: DeliveryMode, flags: u32) -> Self {
        Self {
            stream,
            mode,
            flags,
        }
    }

    /// Delivery mode this consumer was registered with
    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Raw per-consumer option flags
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Attempt one non-blocking write of `buf` to the consumer.
    ///
    /// Returns the number of bytes the socket accepted, which may be
    /// less than `buf.len()`. The remainder is never retried.
    pub(super) fn try_send(&self, buf: &[u8]) -> io::Result<usize> {
        (&self.stream).write(buf)
    }
}
