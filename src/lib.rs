//! sockcast: Unix-domain socket broadcast relay
//!
//! Reads a continuous byte stream from one producer, tees it to the
//! primary output, and fans every chunk out, unmodified, to any number
//! of consumers attached over a Unix-domain stream socket. Consumers
//! join and leave at will; a slow or dead consumer never stalls or
//! crashes delivery to others.
//!
//! # Architecture
//!
//! ```text
//!  producer (stdin) ──► pump ──► primary output (stdout)
//!                        │
//!                        ▼
//!                  Relay::broadcast ◄── acceptor task ◄── connect()
//!                        │
//!               ConsumerRegistry (mutex-guarded slot table)
//!               │            │            │
//!               ▼            ▼            ▼
//!          [consumer]   [consumer]   [consumer]
//! ```
//!
//! # Backpressure
//!
//! Delivery is best-effort and lossy by design: each broadcast makes
//! exactly one non-blocking write attempt per consumer. A consumer that
//! cannot keep up misses data rather than slowing the producer; a
//! consumer whose connection failed is dropped on the spot.

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub mod client;
pub mod error;
pub mod pump;
pub mod registry;
pub mod server;

pub use client::ConsumerClient;
pub use error::{Error, Result};
pub use registry::{ConsumerRegistry, DeliveryMode, RegistryConfig, RegistryError};
pub use server::{Relay, RelayConfig};

/// `sockaddr_un` path capacity on Linux; paths at or beyond this length
/// cannot be bound or connected
pub const MAX_SOCKET_PATH_LEN: usize = 108;

pub(crate) fn validate_socket_path(path: &Path) -> Result<()> {
    if path.as_os_str().as_bytes().len() >= MAX_SOCKET_PATH_LEN {
        return Err(Error::PathTooLong {
            path: path.to_path_buf(),
            limit: MAX_SOCKET_PATH_LEN,
        });
    }

    Ok(())
}
