//! Relay configuration

use std::path::{Path, PathBuf};

/// Relay configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Filesystem path of the listening socket
    pub socket_path: PathBuf,

    /// Remove a stale socket file at the path before binding
    pub force_reuse: bool,

    /// Pending-connection backlog for the listener
    pub backlog: i32,

    /// SO_SNDBUF hint applied to each accepted consumer socket,
    /// best-effort (0 = leave the OS default)
    pub send_buffer_size: usize,
}

impl RelayConfig {
    /// Create a config for the given socket path
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            force_reuse: false,
            backlog: 32,
            send_buffer_size: 1024 * 1024,
        }
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.socket_path
    }

    /// Remove a stale socket file before binding
    pub fn force_reuse(mut self, force: bool) -> Self {
        self.force_reuse = force;
        self
    }

    /// Set the pending-connection backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Set the per-consumer send buffer hint (0 = OS default)
    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.send_buffer_size = size;
        self
    }
}
