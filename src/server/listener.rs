//! Relay listener
//!
//! Binds the Unix-domain listening socket and runs the accept loop that
//! feeds the consumer registry.

use std::io;
use std::path::Path;
use std::sync::Arc;

use socket2::{Domain, SockAddr, Socket, Type};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::registry::{ConsumerRegistry, DeliveryMode, RegistryConfig};
use crate::server::config::RelayConfig;
use crate::validate_socket_path;

/// Broadcast relay bound to one Unix-domain listening socket
///
/// Construction binds the socket and starts a background acceptor task
/// that registers every incoming connection with the consumer registry.
/// Shutting down (or dropping) the relay cancels the acceptor and
/// closes every consumer.
pub struct Relay {
    config: RelayConfig,
    registry: Arc<ConsumerRegistry>,
    acceptor: Option<JoinHandle<()>>,
}

impl Relay {
    /// Bind the listening socket and start accepting consumers
    ///
    /// Must be called from within a tokio runtime. Any setup failure
    /// (invalid path length, bind, listen) surfaces as an error; there
    /// is no degraded mode for a relay that cannot bind.
    pub fn bind(config: RelayConfig) -> Result<Self> {
        Self::with_registry_config(config, RegistryConfig::default())
    }

    /// Bind with custom registry configuration
    pub fn with_registry_config(
        config: RelayConfig,
        registry_config: RegistryConfig,
    ) -> Result<Self> {
        validate_socket_path(&config.socket_path)?;

        if config.force_reuse {
            remove_stale_socket(&config.socket_path)?;
        }

        let listener = bind_listener(&config.socket_path, config.backlog)?;
        tracing::info!(path = %config.socket_path.display(), "Relay listening");

        let registry = Arc::new(ConsumerRegistry::with_config(registry_config));
        let acceptor = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&registry),
            config.send_buffer_size,
        ));

        Ok(Self {
            config,
            registry,
            acceptor: Some(acceptor),
        })
    }

    /// Get a reference to the consumer registry
    pub fn registry(&self) -> &Arc<ConsumerRegistry> {
        &self.registry
    }

    /// Path the relay is bound to
    pub fn local_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Broadcast `buf` to every attached consumer
    ///
    /// Individual delivery failures are handled inside the registry and
    /// never surface here.
    pub async fn broadcast(&self, buf: &[u8]) {
        self.registry.broadcast(buf).await;
    }

    /// Stop accepting, drop every consumer, release the socket
    ///
    /// Idempotent: calling it on an already-shut-down relay is a no-op.
    /// The socket file is left on disk, exactly like an unclean exit
    /// would leave it; the next bind with `force_reuse` replaces it.
    pub async fn shutdown(&mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            // The acceptor owns the listener; aborting the task drops
            // it and closes the listening socket, which also unblocks a
            // pending accept.
            acceptor.abort();
            self.registry.clear().await;
            tracing::info!(path = %self.config.socket_path.display(), "Relay shut down");
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            acceptor.abort();
        }
    }
}

/// Accept consumers until the listener dies or the task is aborted
async fn accept_loop(
    listener: UnixListener,
    registry: Arc<ConsumerRegistry>,
    send_buffer_size: usize,
) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _addr)) => stream,
            Err(e) if is_transient_accept(&e) => {
                tracing::warn!(error = %e, "Transient accept failure");
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept failed, stopping acceptor");
                break;
            }
        };

        // Best-effort tuning hint; a consumer with a default-sized
        // buffer still works, it just hits would-block sooner.
        if send_buffer_size > 0 {
            if let Err(e) = socket2::SockRef::from(&stream).set_send_buffer_size(send_buffer_size)
            {
                tracing::warn!(error = %e, "Failed to set consumer send buffer size");
            }
        }

        let stream = match stream.into_std() {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to detach accepted socket");
                continue;
            }
        };

        if let Err(e) = registry.register(stream, DeliveryMode::Outbound, 0).await {
            tracing::warn!(error = %e, "Rejected consumer");
        } else {
            let consumers = registry.consumer_count().await;
            tracing::debug!(consumers, "Consumer accepted");
        }
    }
}

fn is_transient_accept(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

/// Create, bind and listen the Unix socket with an explicit backlog
fn bind_listener(path: &Path, backlog: i32) -> Result<UnixListener> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.bind(&SockAddr::unix(path)?)?;
    socket.listen(backlog)?;
    socket.set_nonblocking(true)?;

    Ok(UnixListener::from_std(socket.into())?)
}

/// Remove a leftover socket file, ignoring "does not exist"
fn remove_stale_socket(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed stale socket file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
