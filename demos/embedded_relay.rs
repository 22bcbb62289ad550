//! Embedding the relay in an application
//!
//! Run with: cargo run --example embedded_relay [SOCKET_PATH]
//!
//! Binds a relay, then broadcasts a numbered line once a second.
//! Attach any number of consumers with:
//!
//!   sockcast -c /tmp/embedded-relay.sock
//!
//! or plain netcat:
//!
//!   nc -U /tmp/embedded-relay.sock
//!
//! Kill a consumer mid-stream and watch the relay carry on; the other
//! consumers keep receiving without a hiccup.

use std::time::Duration;

use sockcast::{Relay, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sockcast=debug".parse()?),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/embedded-relay.sock".into());

    let mut relay = Relay::bind(RelayConfig::new(&path).force_reuse(true))?;
    println!("Relay listening on {}", path);
    println!("Attach with: nc -U {}", path);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                seq += 1;
                let line = format!("tick {}\n", seq);
                relay.broadcast(line.as_bytes()).await;

                let consumers = relay.registry().consumer_count().await;
                if consumers > 0 {
                    println!("tick {} -> {} consumer(s)", seq, consumers);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    relay.shutdown().await;
    Ok(())
}
