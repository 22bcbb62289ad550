//! Producer-side pump
//!
//! Reads the producer byte stream, tees it to the primary output, and
//! hands every chunk to the relay for fan-out.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::server::Relay;

/// Default producer read chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Pump the producer stream until end-of-input
///
/// Each chunk read from `input` is written in full to `output`, then
/// broadcast once to the relay's consumers. A broken pipe on `output`
/// ends the run, but the chunk that hit it is still broadcast first so
/// consumers and the primary output never diverge by more than one
/// chunk. Any other `output` failure is returned.
///
/// Returns the number of bytes pumped.
pub async fn run<R, W>(mut input: R, mut output: W, relay: &Relay, chunk_size: usize) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(chunk_size);
    let mut total = 0u64;
    let mut output_open = true;

    loop {
        buf.clear();
        let read = input.read_buf(&mut buf).await?;
        if read == 0 {
            break;
        }

        if output_open {
            match output.write_all(&buf).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Primary output closed, stopping after this chunk");
                    output_open = false;
                }
                Err(e) => return Err(e.into()),
            }
        }

        relay.broadcast(&buf).await;
        total += read as u64;

        if !output_open {
            break;
        }
    }

    let _ = output.flush().await;
    tracing::debug!(bytes = total, "Producer stream ended");

    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use tokio::net::UnixStream;

    use crate::server::RelayConfig;

    use super::*;

    fn temp_socket_path(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("sockcast-{}-{}.sock", std::process::id(), name));
        let _ = std::fs::remove_file(&path);
        path
    }

    async fn wait_for_consumers(relay: &Relay, count: usize) {
        for _ in 0..200 {
            if relay.registry().consumer_count().await >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("never saw {} consumers", count);
    }

    #[tokio::test]
    async fn test_tees_and_broadcasts_every_chunk() {
        let path = temp_socket_path("pump-tee");
        let mut relay = Relay::bind(RelayConfig::new(&path)).unwrap();

        let mut consumer = UnixStream::connect(&path).await.unwrap();
        wait_for_consumers(&relay, 1).await;

        let input: &[u8] = b"stream of producer bytes";
        let mut primary = Vec::new();
        let pumped = run(input, &mut primary, &relay, 8).await.unwrap();

        assert_eq!(pumped, input.len() as u64);
        assert_eq!(primary, input);

        let mut received = vec![0u8; input.len()];
        consumer.read_exact(&mut received).await.unwrap();
        assert_eq!(received, input);

        relay.shutdown().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_empty_input_is_clean_eof() {
        let path = temp_socket_path("pump-empty");
        let mut relay = Relay::bind(RelayConfig::new(&path)).unwrap();

        let input: &[u8] = b"";
        let mut primary = Vec::new();
        let pumped = run(input, &mut primary, &relay, DEFAULT_CHUNK_SIZE)
            .await
            .unwrap();

        assert_eq!(pumped, 0);
        assert!(primary.is_empty());

        relay.shutdown().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_broken_pipe_still_broadcasts_final_chunk() {
        let path = temp_socket_path("pump-epipe");
        let mut relay = Relay::bind(RelayConfig::new(&path)).unwrap();

        let mut consumer = UnixStream::connect(&path).await.unwrap();
        wait_for_consumers(&relay, 1).await;

        // Primary output whose pipe is already gone.
        let broken = tokio_test::io::Builder::new()
            .write_error(io::Error::from(io::ErrorKind::BrokenPipe))
            .build();

        let input: &[u8] = b"last chunk";
        let pumped = run(input, broken, &relay, DEFAULT_CHUNK_SIZE).await.unwrap();

        // The run ends early but the chunk that hit the broken pipe was
        // still fanned out.
        assert_eq!(pumped, input.len() as u64);

        let mut received = vec![0u8; input.len()];
        consumer.read_exact(&mut received).await.unwrap();
        assert_eq!(received, input);

        relay.shutdown().await;
        let _ = std::fs::remove_file(&path);
    }
}
