//! Registry error types
//!
//! Error types for consumer registry operations.

use std::io;

/// Error type for registry operations
#[derive(Debug)]
pub enum RegistryError {
    /// The consumer socket could not be switched to non-blocking mode
    ///
    /// The socket is rejected rather than kept blocking, since a single
    /// blocking consumer would stall the whole fan-out.
    TransportConfig(io::Error),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::TransportConfig(e) => {
                write!(f, "Failed to configure consumer transport: {}", e)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::TransportConfig(e) => Some(e),
        }
    }
}
