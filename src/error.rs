//! Crate-level error types

use std::io;
use std::path::PathBuf;

use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
///
/// Only setup-level failures ever surface here. Per-consumer delivery
/// failures are absorbed inside the registry and never become an
/// `Error`.
#[derive(Debug)]
pub enum Error {
    /// Transport or filesystem I/O failure
    Io(io::Error),
    /// Socket path exceeds the `sockaddr_un` limit
    PathTooLong { path: PathBuf, limit: usize },
    /// Consumer registration failure
    Registry(RegistryError),
}

/// `ENAMETOOLONG`, what binding an overlong path would have returned
const NAME_TOO_LONG: i32 = 36;

impl Error {
    /// OS error code for a process exit status, when one exists
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::Io(e) => e.raw_os_error(),
            Error::PathTooLong { .. } => Some(NAME_TOO_LONG),
            Error::Registry(RegistryError::TransportConfig(e)) => e.raw_os_error(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::PathTooLong { path, limit } => write!(
                f,
                "Socket path too long (limit {} bytes): {}",
                limit,
                path.display()
            ),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::PathTooLong { .. } => None,
            Error::Registry(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path_too_long() {
        let err = Error::PathTooLong {
            path: PathBuf::from("/very/long/path"),
            limit: 108,
        };

        let msg = err.to_string();
        assert!(msg.contains("108"));
        assert!(msg.contains("/very/long/path"));
    }

    #[test]
    fn test_os_code_from_io() {
        let err = Error::from(io::Error::from_raw_os_error(32));
        assert_eq!(err.os_code(), Some(32));
    }

    #[test]
    fn test_os_code_path_too_long() {
        let err = Error::PathTooLong {
            path: PathBuf::from("/p"),
            limit: 108,
        };
        assert_eq!(err.os_code(), Some(36));
    }
}
