//! Consumer-mode client
//!
//! Connects to a running relay's socket and streams everything it
//! receives to a local writer, until the relay closes or errors.

use std::path::Path;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::error::Result;
use crate::validate_socket_path;

/// Receive-side read chunk size
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Socket buffer tuning hint, matching the relay side
const SOCKET_BUFFER_HINT: usize = 1024 * 1024;

/// A consumer connection to a running relay
pub struct ConsumerClient {
    stream: UnixStream,
}

impl ConsumerClient {
    /// Connect to the relay socket at `path`
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_socket_path(path)?;

        let stream = UnixStream::connect(path).await?;

        if let Err(e) = socket2::SockRef::from(&stream).set_send_buffer_size(SOCKET_BUFFER_HINT) {
            tracing::warn!(error = %e, "Failed to set socket buffer size");
        }

        tracing::debug!(path = %path.display(), "Connected to relay");

        Ok(Self { stream })
    }

    /// Stream received bytes into `out` until the relay closes
    ///
    /// Returns the number of bytes copied.
    pub async fn copy_to<W>(&mut self, mut out: W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
        let mut total = 0u64;

        loop {
            buf.clear();
            let read = self.stream.read_buf(&mut buf).await?;
            if read == 0 {
                break;
            }

            out.write_all(&buf).await?;
            total += read as u64;
        }

        let _ = out.flush().await;
        tracing::debug!(bytes = total, "Relay closed the stream");

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tokio::net::UnixListener;

    use crate::error::Error;

    use super::*;

    fn temp_socket_path(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("sockcast-{}-{}.sock", std::process::id(), name));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn test_copies_until_end_of_stream() {
        let path = temp_socket_path("client-copy");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();
            peer.write_all(b"relayed bytes").await.unwrap();
            // Dropping the peer ends the stream.
        });

        let mut client = ConsumerClient::connect(&path).await.unwrap();
        let mut out = Vec::new();
        let copied = client.copy_to(&mut out).await.unwrap();

        assert_eq!(copied, 13);
        assert_eq!(out, b"relayed bytes");

        server.await.unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_connect_rejects_overlong_path() {
        let long = std::env::temp_dir().join("x".repeat(200));

        let result = ConsumerClient::connect(&long).await;
        assert!(matches!(result, Err(Error::PathTooLong { .. })));
    }

    #[tokio::test]
    async fn test_connect_to_missing_socket_fails() {
        let path = temp_socket_path("client-missing");

        let result = ConsumerClient::connect(&path).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
